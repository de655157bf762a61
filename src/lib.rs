//! Pose-estimation relay over WebSocket
//!
//! Clients stream compressed video frames over `/ws` and receive landmark
//! results for each frame. A separate control channel (`/ws/control`) lets any
//! connected client ask the server to pick a pose from a fixed catalog, which is
//! then broadcast to every control subscriber.
//!
//! # Architecture
//!
//! ```text
//!            PoseServer (axum router)
//!     ┌──────────┬──────────────┬───────────┐
//!     │          │              │           │
//!   /ws     /ws/control     /ws/test     POST /pose
//!     │          │              │           │
//! Streaming   Control         Echo          │
//!  Session    Session        Session        │
//!     │          │              │           │
//!     │    ControlRegistry  ControlRegistry │
//!     │     <ControlReply>   <EchoEvent>    │
//!     │                         ▲           │
//!     │                  stdin broadcaster  │
//!     └──────────► FramePipeline ◄──────────┘
//!                  decode + detect
//! ```

pub mod error;
pub mod media;
pub mod pose;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use error::{Error, Result};
pub use pose::{FramePipeline, PoseDetector, PoseModel, PoseResult};
pub use registry::ControlRegistry;
pub use server::{PoseServer, ServerConfig};
