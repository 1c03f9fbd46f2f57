//! Reactive Primitives
//!
//! This module implements the state cell, the one reactive primitive the
//! rendering core needs.
//!
//! # Concepts
//!
//! ## State
//!
//! A [`State`] holds a value of any `Clone + PartialEq` type. Writes that
//! change the value notify every subscriber synchronously, in the order they
//! subscribed. Writes of an equal value are ignored.
//!
//! ## Observation
//!
//! The application host does not track which cells a build reads. Instead it
//! subscribes to every cell the app exposes through [`Observable`] and treats
//! any notification during an event handler as "this handler changed state".
//! Coarse, but it matches the whole-tree re-render model.

mod state;
mod subscriber;

pub use state::{Observable, State, StateId};
pub use subscriber::{Subscriber, SubscriberId};
