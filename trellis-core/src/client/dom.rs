//! In-memory DOM
//!
//! A small arena-backed document model, just rich enough for the client
//! runtime: elements with attributes, inline style and event listeners, text
//! nodes, and raw markup blocks (the `innerHTML` of an `Html` widget).
//!
//! Removing a subtree returns its slots to a free list for later nodes. Ids
//! carry the generation of their slot, so an id that pointed into a removed
//! subtree reports [`DomError::UnknownNode`] even after its slot is reused.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

/// Handle to a node of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

/// An event listener. Receives the event value, if the event carries one.
pub type Listener = Arc<dyn Fn(Option<Value>) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("appending {child} to {parent} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
}

struct Element {
    tag: String,
    attrs: IndexMap<String, String>,
    style: IndexMap<String, String>,
    listeners: Vec<(String, Listener)>,
}

enum Content {
    Element(Element),
    Text(String),
    Raw(String),
}

struct Node {
    content: Content,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Structural copy of a subtree, comparable with `==`.
///
/// Listeners are represented by their event names only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomSnapshot {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        style: Vec<(String, String)>,
        listeners: Vec<String>,
        children: Vec<DomSnapshot>,
    },
    Text(String),
    Raw(String),
}

#[derive(Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Elements written without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// An arena of nodes rooted at a `body` element.
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.node_count())
            .field("body", &self.body)
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut document = Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            body: NodeId { index: 0, generation: 0 },
        };
        document.body = document.create_element("body");
        document
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn insert(&mut self, content: Content) -> NodeId {
        let node = Node {
            content,
            parent: None,
            children: Vec::new(),
        };
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.insert(Content::Element(Element {
            tag: tag.into(),
            attrs: IndexMap::new(),
            style: IndexMap::new(),
            listeners: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.insert(Content::Text(text.into()))
    }

    /// Markup inserted verbatim, like `innerHTML`.
    pub fn create_raw(&mut self, markup: impl Into<String>) -> NodeId {
        self.insert(Content::Raw(markup.into()))
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(DomError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&Element, DomError> {
        match &self.node(id)?.content {
            Content::Element(element) => Ok(element),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match &mut self.node_mut(id)?.content {
            Content::Element(element) => Ok(element),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Number of live nodes, `body` included.
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Number of allocated slots, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], DomError> {
        Ok(&self.node(id)?.children)
    }

    pub fn tag(&self, id: NodeId) -> Result<&str, DomError> {
        Ok(&self.element(id)?.tag)
    }

    /// Whether the node is reachable from `body`.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.body {
                return self.contains(node);
            }
            current = match self.node(node) {
                Ok(n) => n.parent,
                Err(_) => return false,
            };
        }
        false
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        if self.node(child)?.parent.is_some() || child == self.body {
            return Err(DomError::AlreadyAttached(child));
        }

        let mut ancestor = Some(parent);
        while let Some(node) = ancestor {
            if node == child {
                return Err(DomError::WouldCycle { parent, child });
            }
            ancestor = self.node(node)?.parent;
        }

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach `id` from its parent and free its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
        }
        self.free(id);
        Ok(())
    }

    /// Free every child subtree of `id`.
    pub fn clear_children(&mut self, id: NodeId) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.free(child);
        }
        Ok(())
    }

    fn free(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.slots.get_mut(current.index) else {
                continue;
            };
            if slot.generation != current.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.live -= 1;
                stack.extend(node.children);
            }
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) -> Result<(), DomError> {
        self.element_mut(id)?.attrs.insert(name.into(), value.into());
        Ok(())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Result<Option<&str>, DomError> {
        Ok(self.element(id)?.attrs.get(name).map(String::as_str))
    }

    /// Set one inline style property (CSS name, e.g. `flex-direction`).
    pub fn set_style(&mut self, id: NodeId, property: impl Into<String>, value: impl Into<String>) -> Result<(), DomError> {
        self.element_mut(id)?.style.insert(property.into(), value.into());
        Ok(())
    }

    pub fn style(&self, id: NodeId, property: &str) -> Result<Option<&str>, DomError> {
        Ok(self.element(id)?.style.get(property).map(String::as_str))
    }

    /// The inline style as it would appear in a `style` attribute.
    pub fn style_text(&self, id: NodeId) -> Result<String, DomError> {
        let element = self.element(id)?;
        Ok(element
            .style
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Replace the children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        self.clear_children(id)?;
        let leaf = self.create_text(text);
        self.append(id, leaf)
    }

    pub fn add_listener(&mut self, id: NodeId, event: impl Into<String>, listener: Listener) -> Result<(), DomError> {
        self.element_mut(id)?.listeners.push((event.into(), listener));
        Ok(())
    }

    /// Event names with at least one listener on `id`, in binding order.
    pub fn listeners(&self, id: NodeId) -> Result<Vec<&str>, DomError> {
        Ok(self
            .element(id)?
            .listeners
            .iter()
            .map(|(event, _)| event.as_str())
            .collect())
    }

    /// Fire `event` on `id`. Returns how many listeners ran.
    ///
    /// Listeners are cloned out first so they may outlive a later mutation
    /// of the document.
    pub fn dispatch_event(&self, id: NodeId, event: &str, value: Option<Value>) -> Result<usize, DomError> {
        let matching: Vec<Listener> = self
            .element(id)?
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in &matching {
            listener(value.clone());
        }
        Ok(matching.len())
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> Result<String, DomError> {
        let mut out = String::new();
        self.collect_text(id, &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, id: NodeId, out: &mut String) -> Result<(), DomError> {
        let node = self.node(id)?;
        if let Content::Text(text) = &node.content {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out)?;
        }
        Ok(())
    }

    /// Elements under `id` (inclusive) with the given tag, in document order.
    pub fn find_by_tag(&self, id: NodeId, tag: &str) -> Result<Vec<NodeId>, DomError> {
        let mut found = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            if matches!(&node.content, Content::Element(e) if e.tag == tag) {
                found.push(current);
            }
            stack.extend(node.children.iter().rev());
        }
        Ok(found)
    }

    pub fn snapshot(&self, id: NodeId) -> Result<DomSnapshot, DomError> {
        let node = self.node(id)?;
        Ok(match &node.content {
            Content::Text(text) => DomSnapshot::Text(text.clone()),
            Content::Raw(markup) => DomSnapshot::Raw(markup.clone()),
            Content::Element(element) => DomSnapshot::Element {
                tag: element.tag.clone(),
                attrs: element.attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                style: element.style.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                listeners: element.listeners.iter().map(|(event, _)| event.clone()).collect(),
                children: node
                    .children
                    .iter()
                    .map(|child| self.snapshot(*child))
                    .collect::<Result<_, _>>()?,
            },
        })
    }

    /// Serialize the subtree at `id` as HTML markup.
    pub fn to_html(&self, id: NodeId) -> Result<String, DomError> {
        let mut out = String::new();
        self.write_html(id, &mut out)?;
        Ok(out)
    }

    fn write_html(&self, id: NodeId, out: &mut String) -> Result<(), DomError> {
        let node = self.node(id)?;
        match &node.content {
            Content::Text(text) => out.push_str(&escape_text(text)),
            Content::Raw(markup) => out.push_str(markup),
            Content::Element(element) => {
                let _ = write!(out, "<{}", element.tag);
                for (name, value) in &element.attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
                }
                if !element.style.is_empty() {
                    let _ = write!(out, " style=\"{}\"", escape_attr(&self.style_text(id)?));
                }
                out.push('>');
                if VOID_TAGS.contains(&element.tag.as_str()) {
                    return Ok(());
                }
                for child in &node.children {
                    self.write_html(*child, out)?;
                }
                let _ = write!(out, "</{}>", element.tag);
            }
        }
        Ok(())
    }
}

/// Escape text content for HTML.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for a double-quoted HTML attribute.
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn build_and_serialize() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attr(div, "id", "app").unwrap();
        doc.set_style(div, "display", "flex").unwrap();
        let text = doc.create_text("a < b");
        doc.append(div, text).unwrap();
        let input = doc.create_element("input");
        doc.set_attr(input, "value", "\"hi\"").unwrap();
        doc.append(div, input).unwrap();
        doc.append(doc.body(), div).unwrap();

        assert_eq!(
            doc.to_html(div).unwrap(),
            r#"<div id="app" style="display: flex;">a &lt; b<input value="&quot;hi&quot;"></div>"#
        );
        assert!(doc.is_attached(input));
    }

    #[test]
    fn remove_frees_the_subtree() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append(outer, inner).unwrap();
        doc.append(doc.body(), outer).unwrap();
        assert_eq!(doc.node_count(), 3);

        doc.remove(outer).unwrap();
        assert_eq!(doc.node_count(), 1);
        assert_eq!(doc.tag(inner), Err(DomError::UnknownNode(inner)));
        assert!(doc.children(doc.body()).unwrap().is_empty());
    }

    #[test]
    fn freed_slots_are_reused_without_reviving_old_ids() {
        let mut doc = Document::new();
        let old = doc.create_element("div");
        doc.append(doc.body(), old).unwrap();
        doc.remove(old).unwrap();

        let new = doc.create_element("p");
        assert_eq!(doc.capacity(), 2);
        assert_ne!(old, new);
        assert_eq!(doc.tag(new).unwrap(), "p");
        assert_eq!(doc.tag(old), Err(DomError::UnknownNode(old)));
        assert_eq!(doc.remove(old), Err(DomError::UnknownNode(old)));
        assert!(doc.contains(new));
    }

    #[test]
    fn repeated_rebuilds_keep_the_arena_bounded() {
        let mut doc = Document::new();
        let mount = doc.create_element("div");
        doc.append(doc.body(), mount).unwrap();

        let rebuild = |doc: &mut Document, round: usize| {
            doc.clear_children(mount).unwrap();
            for i in 0..10 {
                let item = doc.create_element("li");
                doc.set_text(item, format!("{round}.{i}")).unwrap();
                doc.append(mount, item).unwrap();
            }
        };
        rebuild(&mut doc, 0);
        let capacity = doc.capacity();
        for round in 1..100 {
            rebuild(&mut doc, round);
        }

        assert_eq!(doc.capacity(), capacity);
        assert_eq!(doc.node_count(), 2 + 20);
        assert_eq!(doc.children(mount).unwrap().len(), 10);
    }

    #[test]
    fn append_rejects_cycles_and_double_parents() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append(a, b).unwrap();

        assert_eq!(doc.append(b, a), Err(DomError::WouldCycle { parent: b, child: a }));
        assert_eq!(doc.append(doc.body(), b), Err(DomError::AlreadyAttached(b)));

        let text = doc.create_text("x");
        let other = doc.create_text("y");
        assert_eq!(doc.append(text, other), Err(DomError::NotAnElement(text)));
    }

    #[test]
    fn dispatch_runs_matching_listeners() {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        doc.add_listener(button, "click", Arc::new(move |_: Option<Value>| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

        assert_eq!(doc.dispatch_event(button, "click", None).unwrap(), 1);
        assert_eq!(doc.dispatch_event(button, "change", None).unwrap(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(doc.listeners(button).unwrap(), vec!["click"]);
    }

    #[test]
    fn snapshots_compare_structure() {
        let build = |doc: &mut Document| {
            let div = doc.create_element("div");
            doc.set_style(div, "gap", "4px").unwrap();
            let text = doc.create_text("x");
            doc.append(div, text).unwrap();
            div
        };
        let mut left = Document::new();
        let mut right = Document::new();
        let _padding = right.create_text("shifts ids");
        let a = build(&mut left);
        let b = build(&mut right);

        assert_eq!(left.snapshot(a).unwrap(), right.snapshot(b).unwrap());
        assert_eq!(left.text_content(a).unwrap(), "x");
    }

    #[test]
    fn set_text_replaces_children() {
        let mut doc = Document::new();
        let span = doc.create_element("span");
        doc.set_text(span, "one").unwrap();
        doc.set_text(span, "two").unwrap();
        assert_eq!(doc.children(span).unwrap().len(), 1);
        assert_eq!(doc.text_content(span).unwrap(), "two");
    }
}
