//! Descriptor Tree
//!
//! The descriptor tree is the serialization contract between host logic and
//! any renderer. It is plain data:
//!
//! ```text
//! Node     := { type, props, children: [Node | TextNode], events? }
//! TextNode := { type: "TextNode", text }
//! ```
//!
//! `props` hold JSON values only. Event bindings live in `events`, which maps
//! a short event name (`"click"`) to a render-scoped handler id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::widget::EVENT_PREFIX;

/// Wire tag of text leaves.
pub const TEXT_NODE: &str = "TextNode";

/// Errors found while validating or decoding a descriptor tree.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("descriptor at {path} has an empty type tag")]
    EmptyType { path: String },

    #[error("descriptor at {path} binds event `{event}` to an empty handler id")]
    EmptyHandlerId { path: String, event: String },

    #[error("descriptor at {path} keeps event property `{name}` in props")]
    EventInProps { path: String, name: String },

    #[error("descriptor JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Marker serialized as the `"TextNode"` type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextTag {
    #[default]
    TextNode,
}

/// A text leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDescriptor {
    #[serde(rename = "type")]
    tag: TextTag,
    pub text: String,
}

impl TextDescriptor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            tag: TextTag::TextNode,
            text: text.into(),
        }
    }
}

/// A typed node with props, children and event bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: IndexMap<String, Value>,
    #[serde(default)]
    pub children: Vec<Descriptor>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub events: IndexMap<String, String>,
}

impl ElementDescriptor {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            props: IndexMap::new(),
            children: Vec::new(),
            events: IndexMap::new(),
        }
    }

    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Descriptor>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_event(mut self, event: impl Into<String>, handler: impl Into<String>) -> Self {
        self.events.insert(event.into(), handler.into());
        self
    }
}

/// A node of the descriptor tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Descriptor {
    Text(TextDescriptor),
    Element(ElementDescriptor),
}

impl From<TextDescriptor> for Descriptor {
    fn from(value: TextDescriptor) -> Self {
        Descriptor::Text(value)
    }
}

impl From<ElementDescriptor> for Descriptor {
    fn from(value: ElementDescriptor) -> Self {
        Descriptor::Element(value)
    }
}

impl Descriptor {
    pub fn text(text: impl Into<String>) -> Self {
        Descriptor::Text(TextDescriptor::new(text))
    }

    /// The wire `type` of this node.
    pub fn type_tag(&self) -> &str {
        match self {
            Descriptor::Text(_) => TEXT_NODE,
            Descriptor::Element(element) => &element.kind,
        }
    }

    pub fn as_element(&self) -> Option<&ElementDescriptor> {
        match self {
            Descriptor::Element(element) => Some(element),
            Descriptor::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[Descriptor] {
        match self {
            Descriptor::Element(element) => &element.children,
            Descriptor::Text(_) => &[],
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DescriptorError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DescriptorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the structural invariants of the tree.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        self.validate_at(&mut String::from("$"))
    }

    fn validate_at(&self, path: &mut String) -> Result<(), DescriptorError> {
        let Descriptor::Element(element) = self else {
            return Ok(());
        };

        if element.kind.is_empty() {
            return Err(DescriptorError::EmptyType { path: path.clone() });
        }
        if let Some((event, _)) = element.events.iter().find(|(_, id)| id.is_empty()) {
            return Err(DescriptorError::EmptyHandlerId {
                path: path.clone(),
                event: event.clone(),
            });
        }
        if let Some(name) = element
            .props
            .keys()
            .find(|name| {
                name.strip_prefix(EVENT_PREFIX)
                    .is_some_and(|event| element.events.contains_key(event))
            })
        {
            return Err(DescriptorError::EventInProps {
                path: path.clone(),
                name: name.clone(),
            });
        }

        for (index, child) in element.children.iter().enumerate() {
            let len = path.len();
            path.push_str(&format!("/{index}"));
            child.validate_at(path)?;
            path.truncate(len);
        }
        Ok(())
    }

    /// Pre-order walk over every node.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Descriptor)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Every element with the given type, in document order.
    pub fn find_by_type(&self, kind: &str) -> Vec<&ElementDescriptor> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if let Descriptor::Element(element) = node {
                if element.kind == kind {
                    found.push(element);
                }
            }
        });
        found
    }

    /// All handler ids bound anywhere in the tree, in document order.
    pub fn handler_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.walk(&mut |node| {
            if let Descriptor::Element(element) = node {
                ids.extend(element.events.values().map(String::as_str));
            }
        });
        ids
    }

    /// Concatenated visible text: text leaves plus `text` props.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |node| match node {
            Descriptor::Text(leaf) => out.push_str(&leaf.text),
            Descriptor::Element(element) => {
                if let Some(Value::String(text)) = element.props.get("text") {
                    out.push_str(text);
                }
            }
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Descriptor {
        ElementDescriptor::new("Column")
            .with_prop("spacing", 10)
            .with_child(ElementDescriptor::new("Text").with_prop("text", "Count: 0"))
            .with_child(
                ElementDescriptor::new("Button")
                    .with_prop("text", "+")
                    .with_event("click", "on_click_1_0"),
            )
            .with_child(Descriptor::text("tail"))
            .into()
    }

    #[test]
    fn serializes_to_wire_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "Column",
                "props": {"spacing": 10},
                "children": [
                    {"type": "Text", "props": {"text": "Count: 0"}, "children": []},
                    {"type": "Button", "props": {"text": "+"}, "children": [], "events": {"click": "on_click_1_0"}},
                    {"type": "TextNode", "text": "tail"}
                ]
            })
        );
    }

    #[test]
    fn parses_text_nodes_and_elements() {
        let tree = Descriptor::from_json(
            r#"{"type": "Row", "props": {}, "children": [{"type": "TextNode", "text": "hi"}, {"type": "Spacer"}]}"#,
        )
        .unwrap();

        assert_eq!(tree.type_tag(), "Row");
        assert!(matches!(&tree.children()[0], Descriptor::Text(t) if t.text == "hi"));
        assert_eq!(tree.children()[1].type_tag(), "Spacer");
        assert!(tree.children()[1].children().is_empty());
    }

    #[test]
    fn json_round_trip_preserves_prop_order() {
        let tree = sample();
        let json = tree.to_json().unwrap();
        assert!(json.find("\"type\":\"Column\"").unwrap() < json.find("\"spacing\"").unwrap());
        assert_eq!(Descriptor::from_json(&json).unwrap(), tree);
    }

    #[test]
    fn helpers_walk_the_tree() {
        let tree = sample();
        assert_eq!(tree.handler_ids(), vec!["on_click_1_0"]);
        assert_eq!(tree.find_by_type("Text").len(), 1);
        assert_eq!(tree.text_content(), "Count: 0+tail");
    }

    #[test]
    fn validation_rejects_empty_handler_ids() {
        let tree: Descriptor = ElementDescriptor::new("Row")
            .with_child(ElementDescriptor::new("Button").with_event("click", ""))
            .into();
        let err = tree.validate().unwrap_err();
        assert!(matches!(err, DescriptorError::EmptyHandlerId { ref path, .. } if path == "$/0"));
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validation_rejects_leftover_event_props() {
        let tree: Descriptor = ElementDescriptor::new("Button")
            .with_prop("on_click", "oops")
            .with_event("click", "on_click_1_0")
            .into();
        assert!(matches!(tree.validate(), Err(DescriptorError::EventInProps { .. })));
    }
}
