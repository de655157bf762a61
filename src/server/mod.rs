//! HTTP and WebSocket server

pub mod config;
pub mod listener;
pub mod routes;
pub mod stdin;

pub use config::ServerConfig;
pub use listener::PoseServer;
pub use routes::{ApiError, ServerState};
pub use stdin::{broadcast_lines, spawn_stdin_broadcaster};
