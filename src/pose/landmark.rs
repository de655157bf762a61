//! Landmark and pose result types
//!
//! These are the shapes that leave the inference adapter and go out on the
//! wire. Coordinates are in pixels of the original frame.

use serde::{Deserialize, Serialize};

/// One detected keypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Position in the model's keypoint list; doubles as identity
    pub index: usize,
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// Depth, only for models that estimate it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    /// Confidence in [0, 1]
    pub visibility: f32,
}

/// Detection outcome for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseResult {
    pub landmarks: Vec<Landmark>,
    pub has_pose: bool,
}

impl PoseResult {
    /// Result for a frame where no pose was found
    pub fn empty() -> Self {
        Self {
            landmarks: Vec::new(),
            has_pose: false,
        }
    }

    /// Number of landmarks
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}
