//! Serializer
//!
//! Turns a live widget tree into a descriptor tree plus the handler table
//! for that render. The pair is returned to the caller; nothing shared is
//! mutated along the way, so two passes can never interleave their handler
//! registrations.
//!
//! # Algorithm
//!
//! Depth-first, children in order:
//!
//! 1. Copy the node's props. An `on_<event>` prop holding a [`Handler`] is
//!    given an id, registered in the table and moved to `events[<event>]`.
//! 2. Widget-valued props (slots) are serialized as extra children, after
//!    the explicit ones.
//! 3. String and number children become `TextNode` leaves. Anything else is
//!    an error.
//!
//! # Handler ids
//!
//! Ids look like `on_click_<generation>_<n>`. They are unique within a
//! render and never reused across generations. Binding the same handler
//! (same `Arc`) to the same event twice in one render yields one id.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::descriptor::{Descriptor, ElementDescriptor};
use crate::handlers::HandlerTable;
use crate::widget::{Child, Handler, Prop, Widget, WidgetKind, EVENT_PREFIX};

/// Errors raised while serializing a widget tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializeError {
    #[error("child at {path} is not a widget, string or number (found {found})")]
    InvalidChild { path: String, found: &'static str },

    #[error("{kind} at {path} does not take children")]
    ChildrenNotSupported { path: String, kind: WidgetKind },

    #[error("property `{name}` at {path} cannot be sent to the client: {reason}")]
    UnsupportedProp {
        path: String,
        name: String,
        reason: &'static str,
    },
}

/// Output of one serialization pass.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub tree: Descriptor,
    pub handlers: HandlerTable,
}

/// Serialize `root` for render `generation`.
pub fn serialize(root: &Widget, generation: u64) -> Result<Rendered, SerializeError> {
    let mut serializer = Serializer::new(generation);
    let tree = serializer.widget(root)?;
    Ok(Rendered {
        tree,
        handlers: serializer.handlers,
    })
}

struct Serializer {
    generation: u64,
    handlers: HandlerTable,
    assigned: HashMap<(usize, String), String>,
    path: SmallVec<[usize; 16]>,
}

impl Serializer {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            handlers: HandlerTable::new(generation),
            assigned: HashMap::new(),
            path: SmallVec::new(),
        }
    }

    fn path(&self) -> String {
        let mut out = String::from("$");
        for index in &self.path {
            let _ = write!(out, "/{index}");
        }
        out
    }

    fn widget(&mut self, widget: &Widget) -> Result<Descriptor, SerializeError> {
        let kind = widget.kind();
        let mut element = ElementDescriptor::new(kind.tag());
        let mut slots: Vec<&Widget> = Vec::new();

        for (name, value) in widget.props() {
            if let Some(event) = name.strip_prefix(EVENT_PREFIX) {
                match value {
                    Prop::Handler(handler) => {
                        let id = self.register(event, handler);
                        element.events.insert(event.to_string(), id);
                        continue;
                    }
                    // An unbound event slot carries no information.
                    Prop::Null => continue,
                    Prop::Bool(_) | Prop::Number(_) | Prop::String(_) => {}
                    _ => {
                        return Err(self.unsupported(name, "event properties hold a handler or a primitive"));
                    }
                }
            }

            match value {
                Prop::Widget(slot) => slots.push(slot),
                Prop::Widgets(list) => slots.extend(list.iter()),
                Prop::Handler(_) => {
                    return Err(self.unsupported(name, "handlers must be bound through an `on_<event>` property"));
                }
                other => {
                    let value = self.value(name, other)?;
                    element.props.insert(name.clone(), value);
                }
            }
        }

        if kind.hosts_children() {
            for (index, child) in widget.child_nodes().iter().enumerate() {
                self.path.push(index);
                let descriptor = self.child(child)?;
                self.path.pop();
                element.children.push(descriptor);
            }
            for slot in slots {
                self.path.push(element.children.len());
                let descriptor = self.widget(slot)?;
                self.path.pop();
                element.children.push(descriptor);
            }
        } else if !widget.child_nodes().is_empty() || !slots.is_empty() {
            return Err(SerializeError::ChildrenNotSupported {
                path: self.path(),
                kind,
            });
        }

        Ok(Descriptor::Element(element))
    }

    fn child(&mut self, child: &Child) -> Result<Descriptor, SerializeError> {
        match child {
            Child::Widget(widget) => self.widget(widget),
            Child::Text(text) => Ok(Descriptor::text(text.clone())),
            Child::Number(number) => Ok(Descriptor::text(number.to_string())),
            Child::Raw(Value::String(text)) => Ok(Descriptor::text(text.clone())),
            Child::Raw(Value::Number(number)) => Ok(Descriptor::text(number.to_string())),
            Child::Raw(other) => Err(SerializeError::InvalidChild {
                path: self.path(),
                found: json_kind(other),
            }),
        }
    }

    fn value(&self, name: &str, prop: &Prop) -> Result<Value, SerializeError> {
        Ok(match prop {
            Prop::Null => Value::Null,
            Prop::Bool(b) => Value::Bool(*b),
            Prop::Number(n) => Value::Number(n.clone()),
            Prop::String(s) => Value::String(s.clone()),
            Prop::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.value(name, item))
                    .collect::<Result<_, _>>()?,
            ),
            Prop::Map(entries) => {
                let mut map = Map::new();
                for (key, item) in entries {
                    map.insert(key.clone(), self.value(name, item)?);
                }
                Value::Object(map)
            }
            Prop::Widget(_) | Prop::Widgets(_) | Prop::Handler(_) => {
                return Err(self.unsupported(name, "widgets and handlers cannot be nested inside list or map values"));
            }
        })
    }

    fn register(&mut self, event: &str, handler: &Handler) -> String {
        let key = (handler.identity(), event.to_string());
        if let Some(id) = self.assigned.get(&key) {
            return id.clone();
        }

        let id = format!("on_{event}_{}_{}", self.generation, self.handlers.len());
        self.handlers.insert(id.clone(), handler.clone());
        self.assigned.insert(key, id.clone());
        id
    }

    fn unsupported(&self, name: &str, reason: &'static str) -> SerializeError {
        SerializeError::UnsupportedProp {
            path: self.path(),
            name: name.to_string(),
            reason,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
