//! Control channel session (`/ws/control`)
//!
//! - `{"type":"next"}`: pick a pose and broadcast it to every control client
//! - other JSON: `{"type":"error","detail":"unknown_type"}` to the sender
//! - not JSON: `{"error":"invalid_json"}` to the sender
//! - binary: ignored

use crate::protocol::{ControlCommand, ControlEvent, ControlReply, ErrorReply, PoseCatalog};

use super::context::SessionContext;
use super::subscribed::{ChannelHandler, Dispatch, SubscribedSession};

/// Control session: a [`SubscribedSession`] running [`ControlHandler`]
pub type ControlSession = SubscribedSession<ControlHandler>;

/// Command handling for the control channel
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlHandler {
    catalog: PoseCatalog,
}

impl ControlHandler {
    pub fn new(catalog: PoseCatalog) -> Self {
        Self { catalog }
    }
}

impl ChannelHandler for ControlHandler {
    type Message = ControlReply;

    fn on_text(&mut self, ctx: &SessionContext, text: &str) -> Dispatch<ControlReply> {
        match ControlCommand::parse(text) {
            Ok(ControlCommand::Next) => {
                let pose = self.catalog.choose();
                tracing::info!(connection_id = %ctx.connection_id, pose, "Next pose requested");
                Dispatch::Broadcast(ControlEvent::pose(pose).into())
            }
            Ok(ControlCommand::Unknown) => {
                tracing::debug!(connection_id = %ctx.connection_id, "Unknown control command");
                Dispatch::Reply(ControlEvent::unknown_type().into())
            }
            Err(e) => {
                tracing::debug!(connection_id = %ctx.connection_id, error = %e, "Invalid control JSON");
                Dispatch::Reply(ErrorReply::invalid_json().into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;
    use crate::registry::ConnectionId;
    use crate::session::context::Channel;

    fn ctx() -> SessionContext {
        let addr: SocketAddr = "127.0.0.1:40001".parse().unwrap();
        SessionContext::new(ConnectionId(1), addr, Channel::Control)
    }

    #[test]
    fn test_next_broadcasts_catalog_pose() {
        let mut handler = ControlHandler::default();

        match handler.on_text(&ctx(), r#"{"type":"next"}"#) {
            Dispatch::Broadcast(ControlReply::Event(ControlEvent::Pose { pose })) => {
                assert!(PoseCatalog::fixed().contains(&pose));
            }
            other => panic!("expected pose broadcast, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_replies_to_sender() {
        let mut handler = ControlHandler::default();

        assert_eq!(
            handler.on_text(&ctx(), r#"{"type":"bogus"}"#),
            Dispatch::Reply(ControlEvent::unknown_type().into())
        );
    }

    #[test]
    fn test_invalid_json_replies_to_sender() {
        let mut handler = ControlHandler::default();

        assert_eq!(
            handler.on_text(&ctx(), "{not json"),
            Dispatch::Reply(ErrorReply::invalid_json().into())
        );
    }
}
