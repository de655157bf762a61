#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use image::{ImageFormat, Rgb, RgbImage};
use pose_relay::media::PixelBuffer;
use pose_relay::pose::{InferenceError, NormalizedLandmark, PoseDetector, PoseModel};
use pose_relay::{ControlRegistry, PoseServer, ServerConfig};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Two landmarks for frames at least 4px wide, nothing for smaller ones
pub struct ScriptedModel;

impl PoseModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn infer(&mut self, frame: &PixelBuffer) -> Result<Option<Vec<NormalizedLandmark>>, InferenceError> {
        if frame.width() < 4 {
            return Ok(None);
        }
        Ok(Some(vec![
            NormalizedLandmark::new(0.5, 0.25, 0.9),
            NormalizedLandmark::new(0.25, 0.5, 0.8).with_depth(-0.5),
        ]))
    }

    fn landmark_name(&self, index: usize) -> String {
        ["nose", "left_eye"][index].to_string()
    }
}

/// Always fails
pub struct BrokenModel;

impl PoseModel for BrokenModel {
    fn name(&self) -> &str {
        "broken"
    }

    fn infer(&mut self, _frame: &PixelBuffer) -> Result<Option<Vec<NormalizedLandmark>>, InferenceError> {
        Err(InferenceError::Model("tensor shape mismatch".into()))
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([10, 200, 30]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub struct TestServer {
    pub server: Arc<PoseServer>,
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<pose_relay::Result<()>>>,
}

impl TestServer {
    pub async fn start(config: ServerConfig, model: impl PoseModel) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(PoseServer::new(config, PoseDetector::new(model)));

        let (tx, rx) = oneshot::channel::<()>();
        let serving = Arc::clone(&server);
        let task = tokio::spawn(async move {
            serving
                .serve(listener, async move {
                    let _ = rx.await;
                })
                .await
        });

        Self {
            server,
            addr,
            shutdown: Some(tx),
            task: Some(task),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Poll `check` until it holds or two seconds pass
pub async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Wait for a registry to reach `count` members
pub async fn wait_for_members<M: Clone>(registry: &ControlRegistry<M>, count: usize) -> bool {
    for _ in 0..200 {
        if registry.len().await == count {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
