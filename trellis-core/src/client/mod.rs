//! Reference Client Runtime
//!
//! The browser runs `assets/runtime.js`. This module is the same runtime
//! written against an in-memory document, which the crate uses in two ways:
//!
//! - Pre-rendering: the static exporter renders the tree once and places the
//!   markup in `index.html`, so the page has content before the script runs.
//! - Testing: rendering, re-rendering and event forwarding can be checked
//!   without a browser.
//!
//! # Layout
//!
//! - [`dom`]: arena-backed document with elements, text and raw markup.
//! - [`style`]: descriptor props to inline CSS.
//! - [`ClientRuntime`]: the mount/reload state machine.

pub mod dom;
mod runtime;
pub mod style;

pub use dom::{Document, DomError, DomSnapshot, Listener, NodeId};
pub use runtime::{ClientRuntime, EventSink, RuntimeError, RuntimeState};
