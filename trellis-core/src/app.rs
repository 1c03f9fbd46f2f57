//! Application Host
//!
//! An application is any type implementing [`App`]: it builds a widget tree
//! from its state cells and lists those cells so the host can observe them.
//!
//! [`AppHost`] owns the application together with the handler table of the
//! latest render. It is the only place where events turn into state changes
//! and state changes turn into new trees:
//!
//! 1. `render()` builds the tree, serializes it and swaps in the new table.
//! 2. `dispatch(id, value)` looks the id up in the current table, runs the
//!    handler and re-renders when any observed cell changed.
//!
//! Change detection goes through the cells' own notifications: every
//! observed cell raises a shared flag when it changes, and the host reads
//! that flag after the handler returns.
//!
//! The host is synchronous. Connections share it as a [`SharedHost`], whose
//! mutex makes each dispatch-and-render step atomic with respect to events
//! from other clients.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::descriptor::Descriptor;
use crate::handlers::HandlerTable;
use crate::reactive::Observable;
use crate::serializer::{serialize, Rendered, SerializeError};
use crate::widget::Widget;

/// A host handle shared by every connection of a live session.
pub type SharedHost<A> = Arc<tokio::sync::Mutex<AppHost<A>>>;

/// Document-level metadata of an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMeta {
    pub title: String,
    pub description: String,
    /// Extra markup placed verbatim in the document head.
    pub head_tags: Vec<String>,
}

impl Default for AppMeta {
    fn default() -> Self {
        Self {
            title: "Trellis App".to_string(),
            description: "Built with Trellis".to_string(),
            head_tags: Vec::new(),
        }
    }
}

impl AppMeta {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn head_tag(mut self, tag: impl Into<String>) -> Self {
        self.head_tags.push(tag.into());
        self
    }
}

/// A user interface described as a function of its state cells.
pub trait App: Send + 'static {
    /// Build the widget tree for the current state.
    fn build(&self) -> Widget;

    /// The cells whose changes should trigger a re-render.
    fn states(&self) -> Vec<&dyn Observable> {
        Vec::new()
    }

    fn meta(&self) -> AppMeta {
        AppMeta::default()
    }
}

/// Errors raised by the application host.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to serialize the widget tree: {0}")]
    Serialize(#[from] SerializeError),

    #[error("handler `{handler}` panicked: {message}")]
    HandlerPanicked { handler: String, message: String },
}

/// Outcome of dispatching one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The id is not part of the current render. Nothing ran.
    Stale,
    /// The handler ran without changing any observed cell.
    Unchanged,
    /// Observed state changed; this is the freshly rendered tree.
    Changed(Descriptor),
}

/// Counters kept by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppStats {
    pub renders: u64,
    pub events: u64,
    pub stale_events: u64,
}

/// Owns an application and the handler table of its latest render.
pub struct AppHost<A: App> {
    app: A,
    handlers: HandlerTable,
    generation: u64,
    tree: Option<Descriptor>,
    dirty: Arc<AtomicBool>,
    stats: AppStats,
}

impl<A: App> AppHost<A> {
    /// Take ownership of `app` and subscribe to its state cells.
    pub fn new(app: A) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let states = app.states();
        for state in &states {
            let flag = Arc::clone(&dirty);
            state.observe(Box::new(move || flag.store(true, Ordering::Release)));
        }
        debug!(states = states.len(), "observing application state");
        drop(states);

        Self {
            app,
            handlers: HandlerTable::default(),
            generation: 0,
            tree: None,
            dirty,
            stats: AppStats::default(),
        }
    }

    /// Wrap the host for sharing across connections.
    pub fn shared(self) -> SharedHost<A> {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn meta(&self) -> AppMeta {
        self.app.meta()
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    /// Generation of the latest render, 0 before the first one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The tree of the latest render.
    pub fn tree(&self) -> Option<&Descriptor> {
        self.tree.as_ref()
    }

    pub fn stats(&self) -> AppStats {
        self.stats
    }

    /// Whether an observed cell changed since the last render.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Build and serialize the application, replacing the handler table.
    ///
    /// On error the previous render stays current.
    pub fn render(&mut self) -> Result<Descriptor, AppError> {
        let generation = self.generation + 1;
        let root = self.app.build();
        let Rendered { tree, handlers } = serialize(&root, generation)?;

        self.generation = generation;
        self.handlers = handlers;
        self.tree = Some(tree.clone());
        self.dirty.store(false, Ordering::Release);
        self.stats.renders += 1;

        debug!(generation, handlers = self.handlers.len(), "rendered widget tree");
        Ok(tree)
    }

    /// Re-render if an observed cell changed since the last render.
    pub fn render_if_dirty(&mut self) -> Result<Option<Descriptor>, AppError> {
        if self.dirty.swap(false, Ordering::AcqRel) {
            self.render().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Run the handler bound to `id` and re-render if state changed.
    ///
    /// A panicking handler is reported as [`AppError::HandlerPanicked`]. Any
    /// state it changed before panicking is picked up by the next
    /// [`render_if_dirty`](Self::render_if_dirty).
    pub fn dispatch(&mut self, id: &str, value: Option<Value>) -> Result<Dispatch, AppError> {
        self.stats.events += 1;

        let Some(handler) = self.handlers.get(id).cloned() else {
            self.stats.stale_events += 1;
            warn!(
                handler = id,
                generation = self.generation,
                stale_events = self.stats.stale_events,
                "ignoring event for a handler id outside the current render"
            );
            return Ok(Dispatch::Stale);
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(value)));
        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            warn!(handler = id, %message, "event handler panicked");
            return Err(AppError::HandlerPanicked {
                handler: id.to_string(),
                message,
            });
        }

        match self.render_if_dirty()? {
            Some(tree) => Ok(Dispatch::Changed(tree)),
            None => Ok(Dispatch::Unchanged),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
