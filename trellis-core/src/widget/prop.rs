//! Widget property values and event handlers.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Number, Value};

use super::Widget;

/// Callback signature shared by every handler.
type Callback = dyn Fn(Option<Value>) + Send + Sync;

/// An event handler attached to a widget through an `on_<event>` property.
///
/// Handlers know whether they take the event's value. The host passes the
/// value only to handlers built with [`Handler::with_value`].
#[derive(Clone)]
pub struct Handler {
    callback: Arc<Callback>,
    takes_value: bool,
}

impl Handler {
    /// A handler that ignores the event value.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(move |_| f()),
            takes_value: false,
        }
    }

    /// A handler that receives the event value (`Value::Null` when the client
    /// sent none).
    pub fn with_value<F>(f: F) -> Self
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(move |value: Option<Value>| f(value.unwrap_or(Value::Null))),
            takes_value: true,
        }
    }

    /// Whether the handler expects the event value.
    pub fn takes_value(&self) -> bool {
        self.takes_value
    }

    /// Run the handler. The value is dropped for handlers that take none.
    pub fn invoke(&self, value: Option<Value>) {
        if self.takes_value {
            (self.callback)(value);
        } else {
            (self.callback)(None);
        }
    }

    /// Address of the shared callback. Stable for the lifetime of the handler
    /// and its clones.
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.callback) as *const () as usize
    }

    /// Whether two handlers share the same callback.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("identity", &format_args!("{:#x}", self.identity()))
            .field("takes_value", &self.takes_value)
            .finish()
    }
}

impl<F> From<F> for Handler
where
    F: Fn() + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Handler::new(f)
    }
}

/// A property value on a widget node.
///
/// Only the primitive and container variants survive serialization. Widget
/// slots are lifted into `children` and handlers into `events`.
#[derive(Debug, Clone)]
pub enum Prop {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Prop>),
    Map(IndexMap<String, Prop>),
    /// A single nested widget (e.g. a `child` slot).
    Widget(Box<Widget>),
    /// A list of nested widgets.
    Widgets(Vec<Widget>),
    Handler(Handler),
}

impl Prop {
    /// Build a map property from key/value pairs, e.g. a padding object.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Prop>,
    {
        Prop::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Prop::Null)
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Prop::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Prop::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Prop {
    fn from(value: bool) -> Self {
        Prop::Bool(value)
    }
}

macro_rules! prop_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Prop {
                fn from(value: $ty) -> Self {
                    Prop::Number(Number::from(value))
                }
            }
        )*
    };
}

prop_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<f64> for Prop {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Prop::Null, Prop::Number)
    }
}

impl From<f32> for Prop {
    fn from(value: f32) -> Self {
        Prop::from(f64::from(value))
    }
}

impl From<&str> for Prop {
    fn from(value: &str) -> Self {
        Prop::String(value.to_string())
    }
}

impl From<String> for Prop {
    fn from(value: String) -> Self {
        Prop::String(value)
    }
}

impl From<&String> for Prop {
    fn from(value: &String) -> Self {
        Prop::String(value.clone())
    }
}

impl From<Handler> for Prop {
    fn from(value: Handler) -> Self {
        Prop::Handler(value)
    }
}

impl From<Widget> for Prop {
    fn from(value: Widget) -> Self {
        Prop::Widget(Box::new(value))
    }
}

impl From<Vec<Widget>> for Prop {
    fn from(value: Vec<Widget>) -> Self {
        Prop::Widgets(value)
    }
}

impl<T: Into<Prop>> From<Option<T>> for Prop {
    fn from(value: Option<T>) -> Self {
        value.map_or(Prop::Null, Into::into)
    }
}

impl From<Value> for Prop {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Prop::Null,
            Value::Bool(b) => Prop::Bool(b),
            Value::Number(n) => Prop::Number(n),
            Value::String(s) => Prop::String(s),
            Value::Array(items) => Prop::List(items.into_iter().map(Prop::from).collect()),
            Value::Object(entries) => Prop::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Prop::from(value)))
                    .collect(),
            ),
        }
    }
}
