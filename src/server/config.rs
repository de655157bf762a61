//! Server configuration

use std::net::SocketAddr;

use crate::pose::DetectorConfig;

/// Default HTTP/WebSocket port
pub const DEFAULT_PORT: u16 = 8000;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent WebSocket connections (0 = unlimited)
    pub max_connections: usize,

    /// Largest accepted WebSocket message, i.e. one compressed frame
    pub max_frame_size: usize,

    /// Largest accepted `POST /pose` body
    pub max_upload_size: usize,

    /// Broadcast stdin lines to `/ws/test` clients
    pub stdin_broadcast: bool,

    /// Pose model selection
    pub detector: DetectorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_connections: 0, // Unlimited
            max_frame_size: 16 * 1024 * 1024, // 16MB
            max_upload_size: 16 * 1024 * 1024,
            stdin_broadcast: false,
            detector: DetectorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set maximum frame size
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Set maximum upload size
    pub fn max_upload_size(mut self, size: usize) -> Self {
        self.max_upload_size = size;
        self
    }

    /// Enable the stdin broadcaster
    pub fn stdin_broadcast(mut self, enabled: bool) -> Self {
        self.stdin_broadcast = enabled;
        self
    }

    /// Set the detector configuration
    pub fn detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }
}
