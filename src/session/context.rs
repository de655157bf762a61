//! Session context
//!
//! Identity information handed to every session when its connection is
//! accepted.

use std::net::SocketAddr;

use crate::registry::ConnectionId;

/// Which endpoint a connection came in on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// `/ws`, frame streaming
    Stream,
    /// `/ws/control`, pose broadcasts
    Control,
    /// `/ws/test`, echo and stdin lines
    Test,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stream => "stream",
            Channel::Control => "control",
            Channel::Test => "test",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-connection identity
#[derive(Debug, Clone, Copy)]
pub struct SessionContext {
    /// Unique connection ID
    pub connection_id: ConnectionId,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Endpoint the connection was accepted on
    pub channel: Channel,
}

impl SessionContext {
    /// Create a new context
    pub fn new(connection_id: ConnectionId, peer_addr: SocketAddr, channel: Channel) -> Self {
        Self {
            connection_id,
            peer_addr,
            channel,
        }
    }
}
