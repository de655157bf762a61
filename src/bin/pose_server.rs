//! Pose relay server
//!
//! ```text
//! pose-server --port 8000 --model movenet.onnx
//! ```
//!
//! Without `--model` (or without the `onnx` feature) every frame reports no
//! pose; the WebSocket and HTTP surfaces still work.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use pose_relay::pose::DetectorConfig;
use pose_relay::{PoseServer, ServerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "WebSocket relay for real-time pose estimation")]
struct Args {
    #[arg(short = 'p', long, default_value = "8000")]
    port: u16,

    #[arg(short = 'b', long, default_value = "0.0.0.0")]
    bind_address: String,

    /// ONNX MoveNet model; omit to run without detection
    #[arg(short = 'm', long)]
    model: Option<PathBuf>,

    /// Minimum mean keypoint score for a pose to be reported
    #[arg(long, default_value = "0.2")]
    score_threshold: f32,

    /// Maximum concurrent WebSocket connections (0 = unlimited)
    #[arg(long, default_value = "0")]
    max_connections: usize,

    /// Broadcast stdin lines to /ws/test clients
    #[arg(long)]
    stdin_broadcast: bool,
}

/// IPv4 or IPv6 host plus port
fn bind_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("invalid bind address {host}"))?;
    Ok(SocketAddr::new(ip, port))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pose_relay=info,pose_server=info")),
        )
        .init();

    let args = Args::parse();

    let bind_addr = bind_addr(&args.bind_address, args.port)?;

    let mut detector_config = DetectorConfig::default().score_threshold(args.score_threshold);
    if let Some(path) = args.model {
        detector_config = detector_config.model_path(path);
    }

    let config = ServerConfig::with_addr(bind_addr)
        .max_connections(args.max_connections)
        .stdin_broadcast(args.stdin_broadcast)
        .detector(detector_config);

    info!("Streaming endpoint: ws://{}/ws", bind_addr);
    info!("Control endpoint:   ws://{}/ws/control", bind_addr);
    info!("Single image:       POST http://{}/pose", bind_addr);

    let server = PoseServer::from_config(config).context("failed to set up pose detector")?;
    info!(model = server.model_name(), "Pose detector ready");
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("server error")?;

    Ok(())
}
