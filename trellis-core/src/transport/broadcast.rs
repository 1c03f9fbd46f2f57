//! Fan-out of host messages to connected clients.
//!
//! Each client owns a bounded queue drained by its connection's writer task.
//! A broadcast enqueues the frame once per client and returns without
//! waiting on any socket, so a slow client never holds up the others. Frames
//! reach a given client in the order they were enqueued.
//!
//! A client whose queue is full has stopped reading. It is unregistered like
//! a closed one; its writer flushes what is queued and closes the socket, and
//! the browser reconnects to receive the current tree.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tracing::{debug, warn};

use super::protocol::ServerMessage;

/// Identifies one connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients registered when the broadcast started.
    pub attempted: usize,
    pub delivered: usize,
    /// Clients whose queue was closed or full. They are unregistered.
    pub dropped: usize,
}

/// Frames a client may have queued before it counts as lagging.
pub const CLIENT_QUEUE_CAPACITY: usize = 32;

/// Registry of connected clients.
#[derive(Debug)]
pub struct Broadcaster {
    clients: DashMap<ClientId, Sender<Arc<str>>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::with_capacity(CLIENT_QUEUE_CAPACITY)
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose per-client queues hold at most `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            clients: DashMap::new(),
            next_id: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Add a client and return the receiving end of its queue.
    pub fn register(&self) -> (ClientId, Receiver<Arc<str>>) {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.capacity);
        self.clients.insert(id, tx);
        debug!(%id, clients = self.clients.len(), "client registered");
        (id, rx)
    }

    /// Remove a client. Returns whether it was registered.
    pub fn unregister(&self, id: ClientId) -> bool {
        let removed = self.clients.remove(&id).is_some();
        if removed {
            debug!(%id, clients = self.clients.len(), "client unregistered");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Enqueue a frame for one client. A closed or lagging client is
    /// unregistered and `false` returned.
    pub fn send_to(&self, id: ClientId, frame: Arc<str>) -> bool {
        let Some(result) = self.clients.get(&id).map(|client| client.try_send(frame)) else {
            return false;
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                self.drop_client(id, &err);
                false
            }
        }
    }

    /// Enqueue `frame` for every client, pruning the ones that are gone.
    pub fn broadcast(&self, frame: impl Into<Arc<str>>) -> BroadcastReport {
        let frame = frame.into();
        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();

        for client in self.clients.iter() {
            report.attempted += 1;
            match client.value().try_send(Arc::clone(&frame)) {
                Ok(()) => report.delivered += 1,
                Err(err) => failed.push((*client.key(), err)),
            }
        }

        report.dropped = failed.len();
        for (id, err) in failed {
            self.drop_client(id, &err);
        }
        report
    }

    fn drop_client<T>(&self, id: ClientId, err: &TrySendError<T>) {
        if matches!(err, TrySendError::Full(_)) {
            warn!(%id, capacity = self.capacity, "client stopped reading; dropping it");
        }
        self.unregister(id);
    }

    /// Encode `message` once and broadcast it.
    pub fn broadcast_message(&self, message: &ServerMessage) -> Result<BroadcastReport, serde_json::Error> {
        Ok(self.broadcast(message.to_json()?))
    }
}
