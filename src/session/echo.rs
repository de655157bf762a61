//! Test channel session (`/ws/test`)
//!
//! Echoes each text message back as an ack. Lines typed on the server's stdin
//! are broadcast to the same members by the stdin broadcaster.

use crate::protocol::EchoEvent;

use super::context::SessionContext;
use super::subscribed::{ChannelHandler, Dispatch, SubscribedSession};

/// Test channel session: a [`SubscribedSession`] running [`EchoHandler`]
pub type EchoSession = SubscribedSession<EchoHandler>;

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

impl ChannelHandler for EchoHandler {
    type Message = EchoEvent;

    fn on_text(&mut self, _ctx: &SessionContext, text: &str) -> Dispatch<EchoEvent> {
        Dispatch::Reply(EchoEvent::Ack {
            received: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;
    use crate::registry::ConnectionId;
    use crate::session::context::Channel;

    #[test]
    fn test_ack() {
        let addr: SocketAddr = "127.0.0.1:40002".parse().unwrap();
        let ctx = SessionContext::new(ConnectionId(1), addr, Channel::Test);

        assert_eq!(
            EchoHandler.on_text(&ctx, "ping"),
            Dispatch::Reply(EchoEvent::Ack {
                received: "ping".into()
            })
        );
    }
}
