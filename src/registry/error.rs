//! Registry error types

use super::subscriber::ConnectionId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The connection's session is gone; its queue no longer accepts messages
    #[error("subscriber {0} is closed")]
    SubscriberClosed(ConnectionId),
}
