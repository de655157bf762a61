//! Pose model seam
//!
//! A [`PoseModel`] is the raw landmark detector: it sees a decoded frame and
//! reports keypoints in normalized [0, 1] image coordinates. Everything about
//! result shape and pixel scaling is handled by
//! [`PoseDetector`](super::PoseDetector) so models stay interchangeable.

use crate::media::PixelBuffer;

/// Error type for a failed inference call
///
/// Unlike "no pose found", this means the model itself broke.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    /// The model rejected the input or failed while running
    #[error("model failure: {0}")]
    Model(String),
    /// The inference task panicked or was cancelled
    #[error("inference task aborted: {0}")]
    Aborted(String),
}

/// Keypoint as reported by a model, before scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedLandmark {
    /// Horizontal position, fraction of image width
    pub x: f32,
    /// Vertical position, fraction of image height
    pub y: f32,
    /// Depth on the same scale as `x`, if the model has one
    pub z: Option<f32>,
    pub visibility: f32,
}

impl NormalizedLandmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility,
        }
    }

    pub fn with_depth(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }
}

/// Landmark detection model
///
/// Models are expensive to build and keep internal state, so `infer` takes
/// `&mut self`. Implementations do not need to be `Sync`.
pub trait PoseModel: Send + 'static {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Detect one pose in `frame`
    ///
    /// Returns `Ok(None)` when no pose is present. A returned list is always
    /// the model's full, fixed keypoint set in model order.
    fn infer(&mut self, frame: &PixelBuffer) -> Result<Option<Vec<NormalizedLandmark>>, InferenceError>;

    /// Name of the keypoint at `index`
    fn landmark_name(&self, index: usize) -> String {
        index.to_string()
    }
}

/// Model used when no detector is configured
///
/// Never finds a pose. Lets the protocol layer run end to end without model
/// weights.
#[derive(Debug, Default)]
pub struct DisabledModel;

impl PoseModel for DisabledModel {
    fn name(&self) -> &str {
        "disabled"
    }

    fn infer(&mut self, _frame: &PixelBuffer) -> Result<Option<Vec<NormalizedLandmark>>, InferenceError> {
        Ok(None)
    }
}
