//! Pose inference adapter
//!
//! Wraps a [`PoseModel`] and turns its raw output into a [`PoseResult`]:
//! indices are assigned in model order, coordinates are scaled into pixels of
//! the original frame, and visibility is clamped into [0, 1].
//!
//! One model instance is shared by every session. Models are not assumed to be
//! safe for concurrent use, so calls are serialized on a mutex; the single
//! model is the throughput ceiling.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::Result;
use crate::media::PixelBuffer;

use super::landmark::{Landmark, PoseResult};
use super::model::{DisabledModel, InferenceError, PoseModel};

/// Detector configuration
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Path to an ONNX MoveNet model (None = detection disabled)
    pub model_path: Option<PathBuf>,

    /// Minimum mean keypoint score for a pose to count as present
    pub score_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            score_threshold: 0.2,
        }
    }
}

impl DetectorConfig {
    /// Set the model path
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Set the pose presence threshold
    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

/// Shared, serialized pose detector
pub struct PoseDetector {
    model: Mutex<Box<dyn PoseModel>>,
    model_name: String,
}

impl PoseDetector {
    /// Create a detector around an already-built model
    pub fn new(model: impl PoseModel) -> Self {
        let model_name = model.name().to_string();
        Self {
            model: Mutex::new(Box::new(model)),
            model_name,
        }
    }

    /// Detector that never reports a pose
    pub fn disabled() -> Self {
        Self::new(DisabledModel)
    }

    /// Build the detector described by `config`
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        match config.model_path {
            None => Ok(Self::disabled()),
            #[cfg(feature = "onnx")]
            Some(ref path) => {
                let model = super::movenet::MoveNet::load(path, config.score_threshold)?;
                Ok(Self::new(model))
            }
            #[cfg(not(feature = "onnx"))]
            Some(_) => Err(crate::error::Error::FeatureDisabled("onnx")),
        }
    }

    /// Name of the wrapped model
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Run the model on one frame
    ///
    /// Blocks while another caller holds the model.
    pub fn detect(&self, frame: &PixelBuffer) -> std::result::Result<PoseResult, InferenceError> {
        // A panic inside a previous call poisons the lock; the model is still
        // the only one we have, so keep serving with it.
        let mut model = self.model.lock().unwrap_or_else(PoisonError::into_inner);

        let raw = match model.infer(frame)? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(PoseResult::empty()),
        };

        let width = frame.width() as f32;
        let height = frame.height() as f32;

        let landmarks = raw
            .iter()
            .enumerate()
            .map(|(index, lm)| Landmark {
                index,
                name: model.landmark_name(index),
                x: lm.x * width,
                y: lm.y * height,
                z: lm.z.map(|z| z * width),
                visibility: clamp_unit(lm.visibility),
            })
            .collect();

        Ok(PoseResult {
            landmarks,
            has_pose: true,
        })
    }
}

impl std::fmt::Debug for PoseDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseDetector")
            .field("model", &self.model_name)
            .finish()
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
