//! Per-connection sessions
//!
//! One session runs per accepted WebSocket, on its own task. Sessions take the
//! socket as a split stream/sink pair so they can be driven by any transport
//! that speaks [`Message`].
//!
//! - [`StreamingSession`]: frames in, landmarks out
//! - [`ControlSession`]: pose requests and broadcasts
//! - [`EchoSession`]: test channel

pub mod context;
pub mod control;
pub mod echo;
pub mod error;
pub mod state;
pub mod streaming;
pub mod subscribed;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt};
use serde::Serialize;

pub use context::{Channel, SessionContext};
pub use control::{ControlHandler, ControlSession};
pub use echo::{EchoHandler, EchoSession};
pub use error::SessionError;
pub use state::{SessionPhase, SessionState};
pub use streaming::StreamingSession;
pub use subscribed::{ChannelHandler, Dispatch, SubscribedSession};

/// Serialize `value` and write it as one text message
pub(crate) async fn send_json<Si, T>(sink: &mut Si, value: &T) -> Result<(), SessionError>
where
    Si: Sink<Message> + Unpin,
    Si::Error: std::fmt::Display,
    T: Serialize + ?Sized,
{
    let text = serde_json::to_string(value)?;
    sink.send(Message::Text(text.into()))
        .await
        .map_err(SessionError::transport)
}
