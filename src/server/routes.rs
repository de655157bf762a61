//! HTTP routes and WebSocket upgrades
//!
//! ```text
//! GET  /ws          → StreamingSession
//! GET  /ws/control  → ControlSession
//! GET  /ws/test     → EchoSession
//! POST /pose        → one-shot detection on a multipart upload
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::pose::{FrameError, FramePipeline, PoseResult};
use crate::protocol::{ControlReply, EchoEvent, PoseCatalog};
use crate::registry::{ConnectionId, ControlRegistry};
use crate::server::config::ServerConfig;
use crate::session::{
    Channel, ChannelHandler, ControlHandler, ControlSession, EchoHandler, EchoSession, SessionContext,
    StreamingSession, SubscribedSession,
};
use crate::stats::ServerStats;

/// Multipart field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

/// State shared by every route
pub struct ServerState {
    pub(crate) config: ServerConfig,
    pub(crate) pipeline: FramePipeline,
    pub(crate) catalog: PoseCatalog,
    pub(crate) control: Arc<ControlRegistry<ControlReply>>,
    pub(crate) test: Arc<ControlRegistry<EchoEvent>>,
    pub(crate) stats: Arc<ServerStats>,
    next_connection_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl ServerState {
    pub fn new(config: ServerConfig, pipeline: FramePipeline) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            pipeline,
            catalog: PoseCatalog::fixed(),
            control: Arc::new(ControlRegistry::new("control")),
            test: Arc::new(ControlRegistry::new("test")),
            stats: Arc::new(ServerStats::new()),
            next_connection_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Admit a WebSocket connection, or `None` when the limit is reached
    fn admit(&self, peer_addr: SocketAddr, channel: Channel) -> Option<ConnectionSlot> {
        let permit = match self.connection_semaphore {
            Some(ref sem) => match Arc::clone(sem).try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    self.stats.connection_rejected();
                    tracing::warn!(peer = %peer_addr, channel = %channel, "Connection rejected: limit reached");
                    return None;
                }
            },
            None => None,
        };

        let id = ConnectionId(self.next_connection_id.fetch_add(1, Ordering::Relaxed));
        let active = self.stats.connection_opened();
        tracing::debug!(
            connection_id = %id,
            peer = %peer_addr,
            channel = %channel,
            active,
            "Connection accepted"
        );

        Some(ConnectionSlot {
            ctx: SessionContext::new(id, peer_addr, channel),
            stats: Arc::clone(&self.stats),
            _permit: permit,
        })
    }
}

/// Held for the life of one WebSocket; releases its slot on drop
struct ConnectionSlot {
    ctx: SessionContext,
    stats: Arc<ServerStats>,
    _permit: Option<OwnedSemaphorePermit>,
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        let active = self.stats.connection_closed();
        tracing::debug!(
            connection_id = %self.ctx.connection_id,
            channel = %self.ctx.channel,
            active,
            "Connection closed"
        );
    }
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let upload_limit = state.config.max_upload_size;

    Router::new()
        .route("/ws", get(stream_endpoint))
        .route("/ws/control", get(control_endpoint))
        .route("/ws/test", get(test_endpoint))
        .route("/pose", post(pose_endpoint))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

fn limit_reached() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "connection limit reached").into_response()
}

async fn stream_endpoint(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(slot) = state.admit(peer_addr, Channel::Stream) else {
        return limit_reached();
    };
    let pipeline = state.pipeline.clone();

    ws.max_message_size(state.config.max_frame_size)
        .on_upgrade(move |socket| run_streaming(slot, socket, pipeline))
}

async fn control_endpoint(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(slot) = state.admit(peer_addr, Channel::Control) else {
        return limit_reached();
    };
    let session = ControlSession::new(slot.ctx, Arc::clone(&state.control), ControlHandler::new(state.catalog));

    ws.on_upgrade(move |socket| run_subscribed(slot, socket, session))
}

async fn test_endpoint(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(slot) = state.admit(peer_addr, Channel::Test) else {
        return limit_reached();
    };
    let session = EchoSession::new(slot.ctx, Arc::clone(&state.test), EchoHandler);

    ws.on_upgrade(move |socket| run_subscribed(slot, socket, session))
}

async fn run_streaming(slot: ConnectionSlot, socket: WebSocket, pipeline: FramePipeline) {
    let (outgoing, incoming) = socket.split();
    let mut session = StreamingSession::new(slot.ctx, pipeline);

    if let Err(e) = session.run(incoming, outgoing).await {
        tracing::warn!(connection_id = %slot.ctx.connection_id, error = %e, "Streaming session ended with error");
    }
}

async fn run_subscribed<H: ChannelHandler>(slot: ConnectionSlot, socket: WebSocket, session: SubscribedSession<H>) {
    let (outgoing, incoming) = socket.split();

    if let Err(e) = session.run(incoming, outgoing).await {
        tracing::debug!(
            connection_id = %slot.ctx.connection_id,
            channel = %slot.ctx.channel,
            error = %e,
            "Session ended with error"
        );
    }
}

/// Error body for the HTTP endpoint: `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

fn is_image_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split('/').next())
        .is_some_and(|top| top.trim().eq_ignore_ascii_case("image"))
}

async fn pose_endpoint(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Result<Json<PoseResult>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        if !is_image_type(field.content_type()) {
            return Err(ApiError::bad_request("Uploaded file must be an image"));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        return match state.pipeline.process(data).await {
            Ok(result) => {
                tracing::debug!(landmarks = result.len(), "Single-image detection done");
                Ok(Json(result))
            }
            Err(FrameError::Decode(e)) => Err(ApiError::bad_request(format!("Could not decode image: {e}"))),
            Err(FrameError::Inference(e)) => {
                tracing::error!(error = %e, "Single-image inference failed");
                Err(ApiError::internal(format!("Pose estimation failed: {e}")))
            }
        };
    }

    Err(ApiError::bad_request(format!("Missing multipart field `{IMAGE_FIELD}`")))
}
