//! Trellis Core
//!
//! This crate provides the rendering core of the Trellis declarative web UI
//! framework. It implements:
//!
//! - State cells with change notification
//! - A widget model and the serializer that turns it into descriptor trees
//! - The application host that routes events to handlers
//! - A reference client runtime over an in-memory document
//! - WebSocket transport and the live development server
//! - Static export to a two-file bundle
//!
//! # Architecture
//!
//! - `reactive`: the [`State`] cell
//! - `widget`: widgets, properties and handlers
//! - `descriptor`: the JSON tree shipped to clients
//! - `serializer`: widget tree to descriptor tree plus handler table
//! - `app`: the [`App`] trait and [`AppHost`]
//! - `client`: the client runtime and its document model
//! - `transport`: wire protocol, broadcast and live server
//! - `document` / `export`: the HTML page and the static build
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_core::{App, Observable, State, Widget};
//!
//! struct Counter {
//!     count: State<i64>,
//! }
//!
//! impl App for Counter {
//!     fn build(&self) -> Widget {
//!         let count = self.count.clone();
//!         Widget::column()
//!             .child(Widget::text(format!("Count: {}", self.count.get())))
//!             .child(Widget::button("+").on_click(move || {
//!                 count.update(|n| n + 1);
//!             }))
//!     }
//!
//!     fn states(&self) -> Vec<&dyn Observable> {
//!         vec![&self.count]
//!     }
//! }
//!
//! fn main() -> trellis_core::Result<()> {
//!     trellis_core::run(Counter { count: State::new(0) })
//! }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod export;
pub mod handlers;
pub mod launch;
pub mod reactive;
pub mod serializer;
pub mod transport;
pub mod widget;

pub use app::{App, AppHost, AppMeta, Dispatch};
pub use config::{Config, Mode};
pub use descriptor::Descriptor;
pub use error::{Error, Result};
pub use launch::{init_tracing, run, run_with};
pub use reactive::{Observable, State};
pub use widget::{Handler, Prop, Widget};
