//! Widget Tree
//!
//! Application code describes its interface as a tree of [`Widget`] nodes.
//! A node is a kind tag, an ordered bag of properties and an ordered list of
//! children. The tree is rebuilt from scratch on every render and handed to
//! the serializer, which turns it into the wire-level descriptor tree.
//!
//! # Properties
//!
//! Each kind gives meaning to a fixed set of property names (see the
//! constructors in this module). Anything else passes through untouched,
//! which is how raw `style` strings reach the client.
//!
//! Properties named `on_<event>` that hold a [`Handler`] are event bindings.
//! The serializer strips them from the props and lists them under `events`.

mod catalog;
mod kind;
mod prop;

use indexmap::IndexMap;
use serde_json::{Number, Value};

pub use kind::{UnknownKind, WidgetKind};
pub use prop::{Handler, Prop};

/// Prefix that marks an event-binding property.
pub const EVENT_PREFIX: &str = "on_";

/// A child entry of a widget.
#[derive(Debug, Clone)]
pub enum Child {
    Widget(Widget),
    Text(String),
    Number(Number),
    /// An untyped value, e.g. from JSON-driven content. Anything other than
    /// a string or a number is rejected at serialization time.
    Raw(Value),
}

impl From<Widget> for Child {
    fn from(value: Widget) -> Self {
        Child::Widget(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Number(Number::from(value))
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Number(Number::from(value))
    }
}

impl From<u64> for Child {
    fn from(value: u64) -> Self {
        Child::Number(Number::from(value))
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Child::Raw(Value::Null), Child::Number)
    }
}

impl From<Value> for Child {
    fn from(value: Value) -> Self {
        Child::Raw(value)
    }
}

/// A node of the widget tree.
#[derive(Debug, Clone)]
pub struct Widget {
    kind: WidgetKind,
    props: IndexMap<String, Prop>,
    children: Vec<Child>,
}

impl Widget {
    /// An empty node of the given kind, without any default props.
    pub fn bare(kind: WidgetKind) -> Self {
        Self {
            kind,
            props: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn with_defaults<'a>(
        kind: WidgetKind,
        defaults: impl IntoIterator<Item = (&'a str, Prop)>,
    ) -> Self {
        let mut widget = Self::bare(kind);
        for (name, value) in defaults {
            widget.props.insert(name.to_string(), value);
        }
        widget
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn props(&self) -> &IndexMap<String, Prop> {
        &self.props
    }

    pub fn prop_value(&self, name: &str) -> Option<&Prop> {
        self.props.get(name)
    }

    pub fn child_nodes(&self) -> &[Child] {
        &self.children
    }

    /// Set a property, replacing any previous value in place.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Prop>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Append one child.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children.
    pub fn children<C>(mut self, children: impl IntoIterator<Item = C>) -> Self
    where
        C: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Identity hint for list items. Carried to the client as a plain prop.
    pub fn key(self, key: impl Into<Prop>) -> Self {
        self.prop("key", key)
    }

    /// Raw inline CSS appended after the generated styles.
    pub fn style(self, css: impl Into<String>) -> Self {
        self.prop("style", css.into())
    }

    /// Bind a handler to a DOM event, stored as `on_<event>`.
    pub fn on(self, event: &str, handler: impl Into<Handler>) -> Self {
        self.prop(format!("{EVENT_PREFIX}{event}"), Prop::Handler(handler.into()))
    }

    pub fn on_click(self, handler: impl Into<Handler>) -> Self {
        self.on("click", handler)
    }

    pub fn on_change(self, handler: impl Into<Handler>) -> Self {
        self.on("change", handler)
    }

    pub fn width(self, width: impl Into<Prop>) -> Self {
        self.prop("width", width)
    }

    pub fn height(self, height: impl Into<Prop>) -> Self {
        self.prop("height", height)
    }

    pub fn padding(self, padding: impl Into<Prop>) -> Self {
        self.prop("padding", padding)
    }

    pub fn background(self, background: impl Into<Prop>) -> Self {
        self.prop("background", background)
    }

    pub fn color(self, color: impl Into<Prop>) -> Self {
        self.prop("color", color)
    }

    pub fn size(self, size: impl Into<Prop>) -> Self {
        self.prop("size", size)
    }

    pub fn spacing(self, spacing: impl Into<Prop>) -> Self {
        self.prop("spacing", spacing)
    }

    pub fn align(self, align: impl Into<Prop>) -> Self {
        self.prop("align", align)
    }

    pub fn justify(self, justify: impl Into<Prop>) -> Self {
        self.prop("justify", justify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prop_replaces_in_place() {
        let widget = Widget::text("hi").prop("size", "xl").prop("extra", 1);
        let names: Vec<_> = widget.props().keys().cloned().collect();
        assert_eq!(names[0], "text");
        assert_eq!(names[1], "size");
        assert_eq!(names.last().map(String::as_str), Some("extra"));
        assert_eq!(widget.prop_value("size").and_then(Prop::as_str), Some("xl"));
    }

    #[test]
    fn on_stores_prefixed_handler() {
        let widget = Widget::button("Go").on_click(|| {});
        assert!(widget
            .prop_value("on_click")
            .and_then(Prop::as_handler)
            .is_some());
    }

    #[test]
    fn children_accept_mixed_values() {
        let widget = Widget::column()
            .child(Widget::text("a"))
            .child("plain")
            .child(3)
            .children(vec![Widget::spacer(), Widget::spacer()]);
        assert_eq!(widget.child_nodes().len(), 5);
        assert!(matches!(widget.child_nodes()[1], Child::Text(_)));
        assert!(matches!(widget.child_nodes()[2], Child::Number(_)));
    }
}
