//! Per-frame processing: decode then detect
//!
//! Both steps are CPU-bound and run on tokio's blocking pool so a session
//! awaiting its frame never stalls the other connections.

use std::sync::Arc;

use bytes::Bytes;

use crate::media::{DecodeError, FrameDecoder};

use super::detector::PoseDetector;
use super::landmark::PoseResult;
use super::model::InferenceError;

/// Error type for one frame
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Client sent bytes that are not a decodable image (recoverable)
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The model failed (fatal to the connection)
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Decode + detect for single frames, shared by all sessions
#[derive(Debug, Clone)]
pub struct FramePipeline {
    decoder: FrameDecoder,
    detector: Arc<PoseDetector>,
}

impl FramePipeline {
    pub fn new(detector: Arc<PoseDetector>) -> Self {
        Self {
            decoder: FrameDecoder::new(),
            detector,
        }
    }

    /// The shared detector
    pub fn detector(&self) -> &Arc<PoseDetector> {
        &self.detector
    }

    /// Decode and run inference on one compressed frame
    pub async fn process(&self, data: Bytes) -> Result<PoseResult, FrameError> {
        let decoder = self.decoder;
        let detector = Arc::clone(&self.detector);

        tokio::task::spawn_blocking(move || -> Result<PoseResult, FrameError> {
            let frame = decoder.decode(&data)?;
            Ok(detector.detect(&frame)?)
        })
        .await
        .map_err(|e| FrameError::Inference(InferenceError::Aborted(e.to_string())))?
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, RgbImage};

    use super::super::model::{NormalizedLandmark, PoseModel};
    use super::*;
    use crate::media::PixelBuffer;

    struct CornerModel;

    impl PoseModel for CornerModel {
        fn name(&self) -> &str {
            "corner"
        }

        fn infer(
            &mut self,
            _frame: &PixelBuffer,
        ) -> Result<Option<Vec<NormalizedLandmark>>, InferenceError> {
            Ok(Some(vec![
                NormalizedLandmark::new(0.0, 0.0, 1.0),
                NormalizedLandmark::new(1.0, 1.0, 1.0),
            ]))
        }
    }

    struct PanickingModel;

    impl PoseModel for PanickingModel {
        fn name(&self) -> &str {
            "panicking"
        }

        fn infer(
            &mut self,
            _frame: &PixelBuffer,
        ) -> Result<Option<Vec<NormalizedLandmark>>, InferenceError> {
            panic!("model blew up");
        }
    }

    fn png(width: u32, height: u32) -> Bytes {
        let mut out = Cursor::new(Vec::new());
        RgbImage::new(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    #[tokio::test]
    async fn test_process_valid_frame() {
        let pipeline = FramePipeline::new(Arc::new(PoseDetector::new(CornerModel)));
        let result = pipeline.process(png(100, 50)).await.unwrap();

        assert!(result.has_pose);
        assert_eq!(result.landmarks[1].x, 100.0);
        assert_eq!(result.landmarks[1].y, 50.0);
    }

    #[tokio::test]
    async fn test_process_decode_failure() {
        let pipeline = FramePipeline::new(Arc::new(PoseDetector::new(CornerModel)));
        let err = pipeline
            .process(Bytes::from_static(b"not-an-image"))
            .await
            .unwrap_err();

        assert_eq!(err, FrameError::Decode(DecodeError::UnknownFormat));
    }

    #[tokio::test]
    async fn test_process_model_panic_is_contained() {
        let pipeline = FramePipeline::new(Arc::new(PoseDetector::new(PanickingModel)));
        let err = pipeline.process(png(8, 8)).await.unwrap_err();

        assert!(matches!(err, FrameError::Inference(InferenceError::Aborted(_))));
    }
}
