//! Transport
//!
//! The duplex channel between the host and its browsers:
//!
//! - `protocol`: the two JSON message shapes
//! - `broadcast`: per-client queues and fan-out
//! - `live`: the HTTP and WebSocket listeners of a live session

mod broadcast;
mod live;
mod protocol;

pub use broadcast::{BroadcastReport, Broadcaster, ClientId};
pub use live::{LiveHandle, LiveServer, TransportError};
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
