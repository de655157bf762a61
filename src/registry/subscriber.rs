//! Subscriber handles
//!
//! A subscriber is one connection's identity plus the sending half of its
//! outbound queue. The session owning the connection holds the receiving half
//! and writes queued messages to the socket; once the session ends the
//! receiver is dropped and every later send fails.

use tokio::sync::mpsc;

use super::error::RegistryError;

/// Unique identity of one accepted connection
///
/// Allocated once per accept and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle used by a registry to reach one connection
#[derive(Debug)]
pub struct Subscriber<M> {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<M>,
}

impl<M> Clone for Subscriber<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            tx: self.tx.clone(),
        }
    }
}

impl<M> Subscriber<M> {
    /// Create a handle and the queue it feeds
    pub fn channel(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<M>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a message for the connection
    ///
    /// Never blocks. Fails once the owning session has gone away.
    pub fn send(&self, message: M) -> Result<(), RegistryError> {
        self.tx
            .send(message)
            .map_err(|_| RegistryError::SubscriberClosed(self.id))
    }
}
