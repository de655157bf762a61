//! Session error types
//!
//! Only errors that end a session live here. Per-message problems (bad frames,
//! text on the binary channel, malformed commands) are answered inline and the
//! session keeps going.

use crate::pose::InferenceError;

/// Error type that closes one session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Receiving from or sending to the socket failed
    #[error("transport error: {0}")]
    Transport(String),

    /// The pose model failed on a frame
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),

    /// A reply could not be serialized
    #[error("failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SessionError {
    pub(crate) fn transport(err: impl std::fmt::Display) -> Self {
        SessionError::Transport(err.to_string())
    }
}
