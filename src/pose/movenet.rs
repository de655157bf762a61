//! MoveNet single-pose model on ONNX Runtime
//!
//! Input: `[1, 192, 192, 3]` f32 RGB (0.0-255.0), frame stretched to the
//! input size. Output: `[1, 1, 17, 3]` as (y, x, score), normalized.

use std::path::Path;

use image::imageops::{self, FilterType};
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{Error, Result};
use crate::media::PixelBuffer;

use super::model::{InferenceError, NormalizedLandmark, PoseModel};

/// Model input edge length
pub const INPUT_SIZE: u32 = 192;

/// COCO keypoint names in MoveNet output order
pub const KEYPOINT_NAMES: [&str; 17] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// MoveNet pose model
pub struct MoveNet {
    session: Session,
    input_name: String,
    output_name: String,
    score_threshold: f32,
}

impl MoveNet {
    /// Load the ONNX model at `path`
    pub fn load(path: &Path, score_threshold: f32) -> Result<Self> {
        let load_err = |e: ort::Error| Error::ModelLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_file(path))
            .map_err(load_err)?;

        let (input_name, output_name) = match (session.inputs.first(), session.outputs.first()) {
            (Some(input), Some(output)) => (input.name.clone(), output.name.clone()),
            _ => {
                return Err(Error::ModelLoad {
                    path: path.to_path_buf(),
                    reason: "model has no inputs or outputs".into(),
                })
            }
        };

        tracing::info!(
            path = %path.display(),
            input = %input_name,
            output = %output_name,
            "MoveNet model loaded"
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            score_threshold,
        })
    }

    fn preprocess(frame: &PixelBuffer) -> Array4<f32> {
        let resized = imageops::resize(frame.as_rgb(), INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
        let side = INPUT_SIZE as usize;

        let mut tensor = Array4::<f32>::zeros((1, side, side, 3));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                tensor[[0, y as usize, x as usize, c]] = pixel[c] as f32;
            }
        }
        tensor
    }
}

impl PoseModel for MoveNet {
    fn name(&self) -> &str {
        "movenet"
    }

    fn infer(&mut self, frame: &PixelBuffer) -> std::result::Result<Option<Vec<NormalizedLandmark>>, InferenceError> {
        let model_err = |e: ort::Error| InferenceError::Model(e.to_string());

        let input = Tensor::from_array(Self::preprocess(frame)).map_err(model_err)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(model_err)?;

        let output: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
            .try_extract_array()
            .map_err(model_err)?;

        if output.shape() != [1, 1, KEYPOINT_NAMES.len(), 3] {
            return Err(InferenceError::Model(format!(
                "unexpected output shape {:?}",
                output.shape()
            )));
        }

        let keypoints: Vec<NormalizedLandmark> = (0..KEYPOINT_NAMES.len())
            .map(|i| {
                let y = output[[0, 0, i, 0]];
                let x = output[[0, 0, i, 1]];
                let score = output[[0, 0, i, 2]];
                NormalizedLandmark::new(x, y, score)
            })
            .collect();

        let mean_score =
            keypoints.iter().map(|k| k.visibility).sum::<f32>() / keypoints.len() as f32;
        if mean_score < self.score_threshold {
            return Ok(None);
        }

        Ok(Some(keypoints))
    }

    fn landmark_name(&self, index: usize) -> String {
        KEYPOINT_NAMES
            .get(index)
            .map(|name| name.to_string())
            .unwrap_or_else(|| index.to_string())
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    #[test]
    fn test_preprocess_shape_and_values() {
        let frame = PixelBuffer::from_rgb(RgbImage::from_pixel(640, 480, Rgb([10, 20, 30])));
        let tensor = MoveNet::preprocess(&frame);

        assert_eq!(tensor.shape(), &[1, 192, 192, 3]);
        assert_eq!(tensor[[0, 100, 100, 0]], 10.0);
        assert_eq!(tensor[[0, 100, 100, 1]], 20.0);
        assert_eq!(tensor[[0, 100, 100, 2]], 30.0);
    }

    #[test]
    fn test_keypoint_names() {
        assert_eq!(KEYPOINT_NAMES.len(), 17);
        assert_eq!(KEYPOINT_NAMES[0], "nose");
        assert_eq!(KEYPOINT_NAMES[16], "right_ankle");
    }
}
