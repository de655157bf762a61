//! Subscriber registry for broadcast channels
//!
//! The registry tracks which connections are subscribed to a channel and fans
//! messages out to them. It is an explicitly owned object injected into each
//! session; nothing about membership is global.
//!
//! # Architecture
//!
//! ```text
//!                  Arc<ControlRegistry<M>>
//!             ┌──────────────────────────────┐
//!             │ Mutex<HashMap<ConnectionId,  │
//!             │   Subscriber { tx }>>        │
//!             └──────────────┬───────────────┘
//!                            │ broadcast()
//!          ┌─────────────────┼─────────────────┐
//!          ▼                 ▼                 ▼
//!     [session 1]       [session 2]       [session 3]
//!      rx.recv()         rx.recv()         (dropped)
//!          │                 │                 │
//!          ▼                 ▼                 └─► send fails, removed
//!       socket            socket
//! ```
//!
//! Dead subscribers heal themselves out of the set: a failed send during a
//! broadcast removes the connection, and sessions remove themselves on close.

pub mod error;
pub mod store;
pub mod subscriber;

pub use error::RegistryError;
pub use store::{BroadcastReport, ControlRegistry};
pub use subscriber::{ConnectionId, Subscriber};
