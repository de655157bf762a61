//! Pose server listener
//!
//! Binds the TCP socket and serves the router until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::error::Result;
use crate::pose::{FramePipeline, PoseDetector};
use crate::protocol::{ControlReply, EchoEvent};
use crate::registry::ControlRegistry;
use crate::server::config::ServerConfig;
use crate::server::routes::{self, ServerState};
use crate::server::stdin::spawn_stdin_broadcaster;
use crate::stats::ServerStats;

/// Pose relay server
pub struct PoseServer {
    state: Arc<ServerState>,
}

impl PoseServer {
    /// Create a server whose detector is built from `config.detector`
    ///
    /// Fails if the configured model cannot be loaded.
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let detector = PoseDetector::from_config(&config.detector)?;
        Ok(Self::new(config, detector))
    }

    /// Create a new server with the given configuration and detector
    ///
    /// `config.detector` is not consulted; the detector is used as given.
    pub fn new(config: ServerConfig, detector: PoseDetector) -> Self {
        let pipeline = FramePipeline::new(Arc::new(detector));

        Self {
            state: Arc::new(ServerState::new(config, pipeline)),
        }
    }

    /// Name of the pose model serving requests
    pub fn model_name(&self) -> &str {
        self.state.pipeline.detector().model_name()
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Registry of `/ws/control` clients
    pub fn control_registry(&self) -> &Arc<ControlRegistry<ControlReply>> {
        &self.state.control
    }

    /// Registry of `/ws/test` clients
    pub fn test_registry(&self) -> &Arc<ControlRegistry<EchoEvent>> {
        &self.state.test
    }

    /// Connection counters
    pub fn stats(&self) -> &Arc<ServerStats> {
        &self.state.stats
    }

    /// The application router, for serving on a custom listener or testing
    pub fn router(&self) -> Router {
        routes::router(Arc::clone(&self.state))
    }

    /// Run the server
    ///
    /// This method blocks until the server fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.state.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            addr = %addr,
            model = self.state.pipeline.detector().model_name(),
            max_connections = self.state.config.max_connections,
            "Pose server listening"
        );

        let stdin_handle = self
            .state
            .config
            .stdin_broadcast
            .then(|| spawn_stdin_broadcaster(Arc::clone(&self.state.test)));

        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        // Stop the broadcaster on shutdown
        if let Some(handle) = stdin_handle {
            handle.abort();
        }

        tracing::info!(
            total_connections = self.state.stats.total_connections(),
            rejected_connections = self.state.stats.rejected_connections(),
            "Pose server stopped"
        );

        Ok(result?)
    }
}
