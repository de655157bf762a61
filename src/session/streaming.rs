//! Frame streaming session (`/ws`)
//!
//! Each binary message is one compressed frame. It is decoded, run through the
//! pose model, and answered before the next message is read, so a client can
//! have at most one frame in flight and a slow client throttles itself.

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};

use crate::pose::{FrameError, FramePipeline};
use crate::protocol::{ErrorReply, StreamReply};

use super::context::SessionContext;
use super::error::SessionError;
use super::send_json;
use super::state::SessionState;

/// One streaming client's session
pub struct StreamingSession {
    state: SessionState,
    pipeline: FramePipeline,
}

impl StreamingSession {
    /// Create a session for an accepted connection
    pub fn new(ctx: SessionContext, pipeline: FramePipeline) -> Self {
        Self {
            state: SessionState::new(ctx.connection_id, ctx.peer_addr),
            pipeline,
        }
    }

    /// Current session state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Drive the session until the client leaves or the transport fails
    ///
    /// Returns `Ok` on an orderly close, `Err` when the session was ended by a
    /// transport or inference failure. Either way the session is `Closed`
    /// afterwards and the sink has been closed.
    pub async fn run<St, Si, E>(&mut self, mut incoming: St, mut outgoing: Si) -> Result<(), SessionError>
    where
        St: Stream<Item = Result<Message, E>> + Unpin,
        E: std::fmt::Display,
        Si: Sink<Message> + Unpin,
        Si::Error: std::fmt::Display,
    {
        let result = self.receive_loop(&mut incoming, &mut outgoing).await;

        self.state.close();
        let _ = outgoing.close().await;

        let stats = &self.state.stats;
        tracing::debug!(
            connection_id = %self.state.id,
            peer = %self.state.peer_addr,
            frames = stats.frames_received,
            decoded = stats.frames_decoded,
            poses = stats.poses_detected,
            decode_failures = stats.decode_failures,
            protocol_violations = stats.protocol_violations,
            bytes = stats.bytes_received,
            duration_ms = stats.duration.as_millis() as u64,
            detection_rate = stats.detection_rate(),
            fps = stats.frame_rate(),
            "Streaming session closed"
        );

        result
    }

    async fn receive_loop<St, Si, E>(&mut self, incoming: &mut St, outgoing: &mut Si) -> Result<(), SessionError>
    where
        St: Stream<Item = Result<Message, E>> + Unpin,
        E: std::fmt::Display,
        Si: Sink<Message> + Unpin,
        Si::Error: std::fmt::Display,
    {
        while let Some(message) = incoming.next().await {
            match message.map_err(SessionError::transport)? {
                Message::Binary(data) => {
                    self.state.begin_frame(data.len());
                    let reply = self.process_frame(data).await?;

                    self.state.begin_response();
                    send_json(outgoing, &reply).await?;
                    self.state.finish_response();
                }
                Message::Text(_) => {
                    self.state.on_protocol_violation();
                    tracing::debug!(
                        connection_id = %self.state.id,
                        "Text message on frame channel"
                    );

                    send_json(outgoing, &StreamReply::Error(ErrorReply::send_binary_frames())).await?;
                    self.state.finish_response();
                }
                Message::Close(_) => break,
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }

        Ok(())
    }

    async fn process_frame(&mut self, data: bytes::Bytes) -> Result<StreamReply, SessionError> {
        match self.pipeline.process(data).await {
            Ok(result) => {
                self.state.on_decoded(result.has_pose);
                Ok(StreamReply::Pose(result))
            }
            Err(FrameError::Decode(e)) => {
                self.state.on_decode_failed();
                tracing::debug!(
                    connection_id = %self.state.id,
                    error = %e,
                    "Frame decode failed"
                );
                Ok(StreamReply::Error(ErrorReply::decode_failed(e.to_string())))
            }
            Err(FrameError::Inference(e)) => {
                tracing::error!(
                    connection_id = %self.state.id,
                    model = self.pipeline.detector().model_name(),
                    error = %e,
                    "Inference failed, closing connection"
                );
                Err(SessionError::Inference(e))
            }
        }
    }
}
