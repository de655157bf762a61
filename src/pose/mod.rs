//! Pose inference
//!
//! - [`PoseModel`]: the pluggable landmark model
//! - [`PoseDetector`]: shared adapter producing pixel-space [`PoseResult`]s
//! - [`FramePipeline`]: decode + detect for one frame off the async runtime

pub mod detector;
pub mod landmark;
pub mod model;
#[cfg(feature = "onnx")]
pub mod movenet;
pub mod pipeline;

pub use detector::{DetectorConfig, PoseDetector};
pub use landmark::{Landmark, PoseResult};
pub use model::{DisabledModel, InferenceError, NormalizedLandmark, PoseModel};
#[cfg(feature = "onnx")]
pub use movenet::MoveNet;
pub use pipeline::{FrameError, FramePipeline};
