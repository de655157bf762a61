//! Crate-level error types
//!
//! Per-frame and per-message failures have their own narrower types
//! ([`DecodeError`](crate::media::DecodeError),
//! [`InferenceError`](crate::pose::InferenceError)); this type covers the
//! failures that stop the server itself.

use std::path::PathBuf;

/// Error type for server startup and shutdown
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Socket bind/accept or other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pose model could not be loaded
    #[error("failed to load pose model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// Pose model support was requested but not compiled in
    #[error("pose model support not compiled in (enable the `{0}` feature)")]
    FeatureDisabled(&'static str),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
