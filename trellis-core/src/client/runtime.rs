//! Client Runtime
//!
//! Materializes a descriptor tree into a [`Document`] below a mount point.
//!
//! # States
//!
//! ```text
//! Empty --render--> Mounted --render/reload--> Mounted ...
//!   ^                  |
//!   +---- detached ----+
//! ```
//!
//! Every render discards the previous subtree and rebuilds from scratch, so
//! the DOM after an update is exactly what a fresh render of the new tree
//! produces. Once the mount point leaves the document the runtime falls back
//! to `Empty` and refuses to render.
//!
//! Each entry of a node's `events` becomes one listener that forwards
//! `{handler, value}` to the [`EventSink`]. Without a sink (static mode)
//! nothing is bound and interactive widgets stay inert.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::dom::{DomError, Document, Listener, NodeId};
use super::style;
use crate::descriptor::{Descriptor, ElementDescriptor};
use crate::transport::{ClientMessage, ServerMessage};

/// Receives the events fired by rendered widgets.
pub trait EventSink: Send + Sync {
    fn send(&self, message: ClientMessage);
}

impl<F> EventSink for F
where
    F: Fn(ClientMessage) + Send + Sync,
{
    fn send(&self, message: ClientMessage) {
        self(message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("mount point {0} is no longer part of the document")]
    Detached(NodeId),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("invalid server message: {0}")]
    Message(#[from] serde_json::Error),
}

/// Lifecycle of a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Empty,
    Mounted { root: NodeId },
}

/// Kinds that never render their `children` list.
const CHILDLESS: &[&str] = &[
    "Button",
    "TextField",
    "Checkbox",
    "Radio",
    "Select",
    "Slider",
    "Image",
    "Video",
    "Css",
    "ApiRequest",
    "FetchData",
];

/// Renders descriptor trees into one mount point of a document.
pub struct ClientRuntime {
    mount: NodeId,
    sink: Option<Arc<dyn EventSink>>,
    state: RuntimeState,
    renders: u64,
}

impl ClientRuntime {
    /// A runtime with no event sink: widgets render inert.
    pub fn inert(mount: NodeId) -> Self {
        Self {
            mount,
            sink: None,
            state: RuntimeState::Empty,
            renders: 0,
        }
    }

    /// A runtime forwarding widget events to `sink`.
    pub fn new(mount: NodeId, sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink: Some(sink),
            ..Self::inert(mount)
        }
    }

    pub fn mount_point(&self) -> NodeId {
        self.mount
    }

    pub fn state(&self) -> RuntimeState {
        self.state
    }

    /// Root element of the current render.
    pub fn root(&self) -> Option<NodeId> {
        match self.state {
            RuntimeState::Mounted { root } => Some(root),
            RuntimeState::Empty => None,
        }
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// Replace whatever is under the mount point with `tree`.
    pub fn render(&mut self, doc: &mut Document, tree: &Descriptor) -> Result<NodeId, RuntimeError> {
        if !doc.is_attached(self.mount) {
            self.state = RuntimeState::Empty;
            return Err(RuntimeError::Detached(self.mount));
        }

        doc.clear_children(self.mount)?;
        let root = self.create(doc, tree)?;
        doc.append(self.mount, root)?;

        self.state = RuntimeState::Mounted { root };
        self.renders += 1;
        debug!(renders = self.renders, nodes = doc.node_count(), "rendered descriptor tree");
        Ok(root)
    }

    /// Apply one host message.
    pub fn apply(&mut self, doc: &mut Document, message: &ServerMessage) -> Result<(), RuntimeError> {
        match message {
            ServerMessage::Reload { tree } => self.render(doc, tree).map(|_| ()),
        }
    }

    /// Decode and apply one text frame from the host.
    pub fn apply_json(&mut self, doc: &mut Document, text: &str) -> Result<(), RuntimeError> {
        let message = ServerMessage::parse(text)?;
        self.apply(doc, &message)
    }

    fn create(&self, doc: &mut Document, node: &Descriptor) -> Result<NodeId, DomError> {
        let element = match node {
            Descriptor::Text(leaf) => return Ok(doc.create_text(leaf.text.clone())),
            Descriptor::Element(element) => element,
        };

        let id = match element.kind.as_str() {
            "Container" => container(doc, element)?,
            "Row" => flex(doc, element, "row")?,
            "Column" => flex(doc, element, "column")?,
            "Center" => {
                let id = doc.create_element("div");
                for (name, value) in [
                    ("display", "flex"),
                    ("align-items", "center"),
                    ("justify-content", "center"),
                    ("width", "100%"),
                    ("height", "100%"),
                ] {
                    doc.set_style(id, name, value)?;
                }
                id
            }
            "Stack" => {
                let id = doc.create_element("div");
                doc.set_style(id, "position", "relative")?;
                doc.set_style(id, "width", "100%")?;
                doc.set_style(id, "height", "100%")?;
                id
            }
            "Spacer" => {
                let id = doc.create_element("div");
                let basis = match element.prop("size") {
                    Some(size) if style::truthy(size) => format!("0 0 {}px", style::plain(size)),
                    _ => "1".to_string(),
                };
                doc.set_style(id, "flex", basis)?;
                id
            }
            "Text" => text(doc, element, "span")?,
            "Heading" => {
                let level = element
                    .prop("level")
                    .and_then(Value::as_u64)
                    .filter(|level| (1..=6).contains(level))
                    .unwrap_or(1);
                text(doc, element, &format!("h{level}"))?
            }
            "Button" => button(doc, element)?,
            "TextField" => text_field(doc, element)?,
            "Checkbox" => labelled_input(doc, element, "checkbox")?,
            "Radio" => labelled_input(doc, element, "radio")?,
            "Select" => select(doc, element)?,
            "Slider" => slider(doc, element)?,
            "Image" => image(doc, element)?,
            "Video" => video(doc, element)?,
            "Icon" => icon(doc, element)?,
            "Link" => link(doc, element)?,
            "Html" => {
                let id = doc.create_element("div");
                let markup = doc.create_raw(prop_text(element, "html"));
                doc.append(id, markup)?;
                id
            }
            "Css" => {
                let id = doc.create_element("style");
                doc.set_text(id, prop_text(element, "css"))?;
                id
            }
            "Toast" => toast(doc, element)?,
            "ApiRequest" | "FetchData" => data_request(doc, element)?,
            other => {
                warn!(kind = other, "unknown widget type, rendering a plain container");
                doc.create_element("div")
            }
        };

        if !CHILDLESS.contains(&element.kind.as_str()) {
            for child in &element.children {
                let child = self.create(doc, child)?;
                doc.append(id, child)?;
            }
        }

        if let Some(Value::String(css)) = element.prop("style") {
            for (name, value) in style::parse_inline(css) {
                doc.set_style(id, name, value)?;
            }
        }

        if let Some(sink) = &self.sink {
            for (event, handler) in &element.events {
                doc.add_listener(id, event.clone(), forward(sink, event, handler))?;
            }
        }

        Ok(id)
    }
}

fn forward(sink: &Arc<dyn EventSink>, event: &str, handler: &str) -> Listener {
    let sink = Arc::clone(sink);
    let event = event.to_string();
    let handler = handler.to_string();
    Arc::new(move |value: Option<Value>| {
        sink.send(ClientMessage::Event {
            handler: handler.clone(),
            value,
            event: Some(event.clone()),
        });
    })
}

fn prop_text(element: &ElementDescriptor, name: &str) -> String {
    element.prop(name).map(style::plain).unwrap_or_default()
}

fn prop_truthy(element: &ElementDescriptor, name: &str) -> bool {
    element.prop(name).is_some_and(style::truthy)
}

/// The prop if it is truthy.
fn present<'a>(element: &'a ElementDescriptor, name: &str) -> Option<&'a Value> {
    element.prop(name).filter(|value| style::truthy(value))
}

fn container(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("div");
    let direction = present(element, "direction").map_or_else(|| "column".to_string(), style::plain);
    doc.set_style(id, "display", "flex")?;
    doc.set_style(id, "flex-direction", direction)?;
    doc.set_style(id, "align-items", style::align(element.prop("align")))?;
    doc.set_style(id, "justify-content", style::justify(element.prop("justify")))?;

    if let Some(width) = present(element, "width") {
        doc.set_style(id, "width", style::size(width))?;
    }
    if let Some(height) = present(element, "height") {
        doc.set_style(id, "height", style::size(height))?;
    }
    if let Some(padding) = present(element, "padding") {
        doc.set_style(id, "padding", style::spacing(padding))?;
    }
    if let Some(margin) = present(element, "margin") {
        doc.set_style(id, "margin", style::spacing(margin))?;
    }
    if let Some(background) = present(element, "background") {
        doc.set_style(id, "background", style::color_value(background))?;
    }
    if let Some(border) = present(element, "border").and_then(style::border) {
        doc.set_style(id, "border", border)?;
    }
    if let Some(rounded) = present(element, "rounded") {
        doc.set_style(id, "border-radius", style::rounded(rounded))?;
    }
    if let Some(shadow) = present(element, "shadow") {
        doc.set_style(id, "box-shadow", style::shadow(shadow))?;
    }
    Ok(id)
}

fn flex(doc: &mut Document, element: &ElementDescriptor, direction: &str) -> Result<NodeId, DomError> {
    let id = doc.create_element("div");
    let gap = present(element, "spacing").map_or_else(|| "0".to_string(), style::plain);
    doc.set_style(id, "display", "flex")?;
    doc.set_style(id, "flex-direction", direction)?;
    doc.set_style(id, "align-items", style::align(element.prop("align")))?;
    doc.set_style(id, "justify-content", style::justify(element.prop("justify")))?;
    doc.set_style(id, "gap", format!("{gap}px"))?;
    if direction == "row" {
        let wrap = if prop_truthy(element, "wrap") { "wrap" } else { "nowrap" };
        doc.set_style(id, "flex-wrap", wrap)?;
    }
    Ok(id)
}

fn text(doc: &mut Document, element: &ElementDescriptor, tag: &str) -> Result<NodeId, DomError> {
    let id = doc.create_element(tag);
    if let Some(size) = present(element, "size") {
        doc.set_style(id, "font-size", style::font_size(size))?;
    }
    if let Some(weight) = present(element, "weight") {
        doc.set_style(id, "font-weight", style::font_weight(weight))?;
    }
    if let Some(color) = present(element, "color") {
        doc.set_style(id, "color", style::color_value(color))?;
    }
    if let Some(align) = present(element, "align") {
        doc.set_style(id, "text-align", style::plain(align))?;
    }
    if prop_truthy(element, "italic") {
        doc.set_style(id, "font-style", "italic")?;
    }
    if prop_truthy(element, "underline") {
        doc.set_style(id, "text-decoration", "underline")?;
    }
    if let Some(font) = present(element, "font") {
        doc.set_style(id, "font-family", style::plain(font))?;
    }
    doc.set_text(id, prop_text(element, "text"))?;
    Ok(id)
}

fn button(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("button");
    let disabled = prop_truthy(element, "disabled");
    let size = element.prop("size");

    doc.set_text(id, prop_text(element, "text"))?;
    if disabled {
        doc.set_attr(id, "disabled", "")?;
    }
    doc.set_style(id, "padding", style::button_padding(size))?;
    doc.set_style(id, "font-size", style::button_font_size(size))?;
    let radius = if prop_truthy(element, "rounded") { "0.375rem" } else { "0" };
    doc.set_style(id, "border-radius", radius)?;
    doc.set_style(id, "border", "none")?;
    doc.set_style(id, "cursor", if disabled { "not-allowed" } else { "pointer" })?;
    doc.set_style(id, "opacity", if disabled { "0.5" } else { "1" })?;
    doc.set_style(id, "font-weight", "500")?;
    doc.set_style(id, "transition", "all 0.2s")?;
    for (name, value) in style::button_colors(element.prop("color"), element.prop("variant")) {
        doc.set_style(id, name, value)?;
    }
    Ok(id)
}

fn text_field(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("input");
    let kind = present(element, "type").map_or_else(|| "text".to_string(), style::plain);
    doc.set_attr(id, "type", kind)?;
    doc.set_attr(id, "placeholder", prop_text(element, "placeholder"))?;
    doc.set_attr(id, "value", prop_text(element, "value"))?;
    if prop_truthy(element, "disabled") {
        doc.set_attr(id, "disabled", "")?;
    }
    for (name, value) in [
        ("padding", "0.5rem 0.75rem"),
        ("font-size", "1rem"),
        ("border", "1px solid #d1d5db"),
        ("border-radius", "0.375rem"),
        ("outline", "none"),
        ("transition", "all 0.2s"),
    ] {
        doc.set_style(id, name, value)?;
    }
    Ok(id)
}

/// `<label><input type=..><span>label</span></label>`, for checkboxes and radios.
fn labelled_input(doc: &mut Document, element: &ElementDescriptor, kind: &str) -> Result<NodeId, DomError> {
    let label = doc.create_element("label");
    for (name, value) in [
        ("display", "flex"),
        ("align-items", "center"),
        ("gap", "0.5rem"),
        ("cursor", "pointer"),
    ] {
        doc.set_style(label, name, value)?;
    }

    let input = doc.create_element("input");
    doc.set_attr(input, "type", kind)?;
    if let Some(name) = present(element, "name") {
        doc.set_attr(input, "name", style::plain(name))?;
    }
    if let Some(value) = present(element, "value") {
        doc.set_attr(input, "value", style::plain(value))?;
    }
    if prop_truthy(element, "checked") {
        doc.set_attr(input, "checked", "")?;
    }
    if prop_truthy(element, "disabled") {
        doc.set_attr(input, "disabled", "")?;
    }

    let span = doc.create_element("span");
    doc.set_text(span, prop_text(element, "label"))?;

    doc.append(label, input)?;
    doc.append(label, span)?;
    Ok(label)
}

fn select(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("select");
    let current = prop_text(element, "value");

    if let Some(placeholder) = present(element, "placeholder") {
        let option = doc.create_element("option");
        doc.set_attr(option, "value", "")?;
        doc.set_attr(option, "disabled", "")?;
        if current.is_empty() {
            doc.set_attr(option, "selected", "")?;
        }
        doc.set_text(option, style::plain(placeholder))?;
        doc.append(id, option)?;
    }

    let options = element.prop("options").and_then(Value::as_array);
    for entry in options.into_iter().flatten() {
        let value = entry.get("value").map(style::plain).unwrap_or_default();
        let label = entry.get("label").map_or_else(|| value.clone(), style::plain);
        let option = doc.create_element("option");
        if !current.is_empty() && value == current {
            doc.set_attr(option, "selected", "")?;
        }
        doc.set_attr(option, "value", value)?;
        doc.set_text(option, label)?;
        doc.append(id, option)?;
    }

    doc.set_style(id, "padding", "0.5rem 0.75rem")?;
    doc.set_style(id, "border", "1px solid #d1d5db")?;
    doc.set_style(id, "border-radius", "0.375rem")?;
    Ok(id)
}

fn slider(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("input");
    doc.set_attr(id, "type", "range")?;
    for name in ["min", "max", "step", "value"] {
        if let Some(value) = element.prop(name).filter(|v| !v.is_null()) {
            doc.set_attr(id, name, style::plain(value))?;
        }
    }
    Ok(id)
}

fn image(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("img");
    doc.set_attr(id, "src", prop_text(element, "src"))?;
    doc.set_attr(id, "alt", prop_text(element, "alt"))?;
    if let Some(width) = present(element, "width") {
        doc.set_style(id, "width", style::size(width))?;
    }
    if let Some(height) = present(element, "height") {
        doc.set_style(id, "height", style::size(height))?;
    }
    if let Some(fit) = present(element, "fit") {
        doc.set_style(id, "object-fit", style::plain(fit))?;
    }
    if let Some(rounded) = present(element, "rounded") {
        doc.set_style(id, "border-radius", style::rounded(rounded))?;
    }
    Ok(id)
}

fn video(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("video");
    doc.set_attr(id, "src", prop_text(element, "src"))?;
    for flag in ["controls", "autoplay", "loop", "muted"] {
        if prop_truthy(element, flag) {
            doc.set_attr(id, flag, "")?;
        }
    }
    doc.set_style(id, "max-width", "100%")?;
    Ok(id)
}

fn icon(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("i");
    doc.set_attr(id, "class", format!("icon icon-{}", prop_text(element, "name")))?;
    doc.set_attr(id, "aria-hidden", "true")?;
    if let Some(size) = present(element, "size") {
        doc.set_style(id, "font-size", style::font_size(size))?;
    }
    if let Some(color) = present(element, "color") {
        doc.set_style(id, "color", style::color_value(color))?;
    }
    Ok(id)
}

fn link(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("a");
    doc.set_attr(id, "href", prop_text(element, "to"))?;
    doc.set_text(id, prop_text(element, "text"))?;
    let color = element.prop("color").map(style::color_value).unwrap_or_default();
    doc.set_style(id, "color", color)?;
    let decoration = if prop_truthy(element, "underline") { "underline" } else { "none" };
    doc.set_style(id, "text-decoration", decoration)?;
    Ok(id)
}

fn toast(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("div");
    doc.set_attr(id, "role", "status")?;
    doc.set_attr(id, "data-duration", prop_text(element, "duration"))?;
    let position = present(element, "position").map_or_else(|| "top-right".to_string(), style::plain);
    let (vertical, horizontal) = position.split_once('-').unwrap_or(("top", "right"));

    doc.set_style(id, "position", "fixed")?;
    doc.set_style(id, vertical, "20px")?;
    doc.set_style(id, horizontal, "20px")?;
    for (name, value) in [
        ("z-index", "10000"),
        ("background", "#323232"),
        ("color", "white"),
        ("padding", "12px 24px"),
        ("border-radius", "4px"),
        ("box-shadow", "0 4px 12px rgba(0, 0, 0, 0.15)"),
        ("font-size", "14px"),
    ] {
        doc.set_style(id, name, value)?;
    }
    doc.set_text(id, prop_text(element, "message"))?;
    Ok(id)
}

/// Hidden marker for a browser-side request. The request itself is issued by
/// the browser runtime; its outcome arrives as `success`, `error` and
/// `loading` events on this node.
fn data_request(doc: &mut Document, element: &ElementDescriptor) -> Result<NodeId, DomError> {
    let id = doc.create_element("div");
    doc.set_attr(id, "data-widget-type", element.kind.as_str())?;
    doc.set_attr(id, "data-url", prop_text(element, "url"))?;
    let method = present(element, "method").map_or_else(|| "GET".to_string(), style::plain);
    doc.set_attr(id, "data-method", method.to_ascii_uppercase())?;
    doc.set_style(id, "display", "none")?;
    Ok(id)
}
