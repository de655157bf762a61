//! Control registry implementation
//!
//! The set of connections subscribed to one broadcast channel.

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::subscriber::{ConnectionId, Subscriber};

/// Outcome of one broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Members at the moment the broadcast started
    pub recipients: usize,
    /// Members the message was queued for
    pub delivered: usize,
    /// Members whose send failed and were dropped from the registry
    pub removed: Vec<ConnectionId>,
}

/// Registry of live subscribers for one channel
///
/// A single mutex guards membership. `add`, `remove`, and `broadcast` are
/// mutually exclusive, so a broadcast always sees a complete membership set
/// and two broadcasts reach every member in the same order. Sends only queue
/// onto unbounded per-connection channels, so nothing awaits while the lock
/// is held.
pub struct ControlRegistry<M> {
    /// Channel label used in logs
    channel: &'static str,

    /// Map of connection ID to subscriber handle
    subscribers: Mutex<HashMap<ConnectionId, Subscriber<M>>>,
}

impl<M: Clone> ControlRegistry<M> {
    /// Create an empty registry
    pub fn new(channel: &'static str) -> Self {
        Self {
            channel,
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Register a subscriber
    ///
    /// Returns `false` and leaves the existing entry alone if the connection is
    /// already registered.
    pub async fn add(&self, subscriber: Subscriber<M>) -> bool {
        let mut subscribers = self.subscribers.lock().await;
        let id = subscriber.id();

        if subscribers.contains_key(&id) {
            return false;
        }

        subscribers.insert(id, subscriber);

        tracing::info!(
            channel = self.channel,
            connection_id = %id,
            subscribers = subscribers.len(),
            "Subscriber added"
        );

        true
    }

    /// Unregister a connection
    ///
    /// Returns `false` if it was not registered.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        let mut subscribers = self.subscribers.lock().await;

        if subscribers.remove(&id).is_none() {
            return false;
        }

        tracing::info!(
            channel = self.channel,
            connection_id = %id,
            subscribers = subscribers.len(),
            "Subscriber removed"
        );

        true
    }

    /// Send `message` to every registered connection
    ///
    /// Each send is independent. A connection whose send fails is removed and
    /// the broadcast carries on with the rest.
    pub async fn broadcast(&self, message: M) -> BroadcastReport {
        let mut subscribers = self.subscribers.lock().await;

        let mut report = BroadcastReport {
            recipients: subscribers.len(),
            ..BroadcastReport::default()
        };

        for (id, subscriber) in subscribers.iter() {
            match subscriber.send(message.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::debug!(channel = self.channel, error = %e, "Broadcast send failed");
                    report.removed.push(*id);
                }
            }
        }

        for id in &report.removed {
            subscribers.remove(id);
            tracing::info!(
                channel = self.channel,
                connection_id = %id,
                "Dead subscriber removed during broadcast"
            );
        }

        tracing::debug!(
            channel = self.channel,
            recipients = report.recipients,
            delivered = report.delivered,
            removed = report.removed.len(),
            "Broadcast complete"
        );

        report
    }

    /// Whether a connection is registered
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.subscribers.lock().await.contains_key(&id)
    }

    /// Number of registered connections
    pub async fn len(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscribers.lock().await.is_empty()
    }
}
