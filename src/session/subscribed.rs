//! Sessions on broadcast channels
//!
//! A subscribed session registers its connection with a [`ControlRegistry`]
//! for its whole life. Everything written to the socket, direct replies and
//! broadcasts alike, goes through the connection's own queue, so the client
//! sees messages in the order they were queued.

use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;

use crate::registry::{ControlRegistry, Subscriber};

use super::context::SessionContext;
use super::error::SessionError;
use super::send_json;

/// What to do in response to one text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<M> {
    /// Send to the sender only
    Reply(M),
    /// Send to every subscriber, sender included
    Broadcast(M),
    /// Nothing to send
    Ignore,
}

/// Channel-specific message handling
pub trait ChannelHandler: Send {
    /// Message type queued for subscribers
    type Message: Clone + Serialize + Send + 'static;

    /// Decide what a text message from the client triggers
    fn on_text(&mut self, ctx: &SessionContext, text: &str) -> Dispatch<Self::Message>;
}

/// Session registered with a broadcast registry
pub struct SubscribedSession<H: ChannelHandler> {
    ctx: SessionContext,
    registry: Arc<ControlRegistry<H::Message>>,
    handler: H,
}

impl<H: ChannelHandler> SubscribedSession<H> {
    pub fn new(ctx: SessionContext, registry: Arc<ControlRegistry<H::Message>>, handler: H) -> Self {
        Self {
            ctx,
            registry,
            handler,
        }
    }

    /// Drive the session until the client leaves or the transport fails
    ///
    /// The connection is registered on entry and unregistered on every exit
    /// path.
    pub async fn run<St, Si, E>(mut self, mut incoming: St, mut outgoing: Si) -> Result<(), SessionError>
    where
        St: Stream<Item = Result<Message, E>> + Unpin,
        E: std::fmt::Display,
        Si: Sink<Message> + Unpin,
        Si::Error: std::fmt::Display,
    {
        let id = self.ctx.connection_id;
        let (subscriber, mut queue) = Subscriber::channel(id);
        self.registry.add(subscriber.clone()).await;

        let result = loop {
            tokio::select! {
                queued = queue.recv() => {
                    // `subscriber` keeps a sender alive, so the queue never ends here
                    let Some(message) = queued else { break Ok(()) };
                    if let Err(e) = send_json(&mut outgoing, &message).await {
                        break Err(e);
                    }
                }
                received = incoming.next() => {
                    match received {
                        None | Some(Ok(Message::Close(_))) => break Ok(()),
                        Some(Err(e)) => break Err(SessionError::transport(e)),
                        Some(Ok(Message::Text(text))) => {
                            self.dispatch(&subscriber, text.as_str()).await;
                        }
                        // Text-only channel
                        Some(Ok(_)) => {}
                    }
                }
            }
        };

        self.registry.remove(id).await;
        drop(queue);
        let _ = outgoing.close().await;

        tracing::debug!(
            connection_id = %id,
            peer = %self.ctx.peer_addr,
            channel = %self.ctx.channel,
            "Subscribed session closed"
        );

        result
    }

    async fn dispatch(&mut self, me: &Subscriber<H::Message>, text: &str) {
        match self.handler.on_text(&self.ctx, text) {
            Dispatch::Reply(message) => {
                if let Err(e) = me.send(message) {
                    tracing::debug!(error = %e, "Reply dropped");
                }
            }
            Dispatch::Broadcast(message) => {
                self.registry.broadcast(message).await;
            }
            Dispatch::Ignore => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use futures::channel::mpsc;

    use super::*;
    use crate::registry::ConnectionId;
    use crate::session::context::Channel;

    /// Upper-cases replies; "all:" prefix broadcasts
    struct Shout;

    impl ChannelHandler for Shout {
        type Message = String;

        fn on_text(&mut self, _ctx: &SessionContext, text: &str) -> Dispatch<String> {
            match text.strip_prefix("all:") {
                Some(rest) => Dispatch::Broadcast(rest.to_uppercase()),
                None if text.is_empty() => Dispatch::Ignore,
                None => Dispatch::Reply(text.to_uppercase()),
            }
        }
    }

    fn ctx(id: u64) -> SessionContext {
        let addr: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        SessionContext::new(ConnectionId(id), addr, Channel::Test)
    }

    fn texts(messages: Vec<Message>) -> Vec<String> {
        messages
            .into_iter()
            .filter_map(|m| match m {
                Message::Text(t) => Some(serde_json::from_str::<String>(t.as_str()).unwrap()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_reply_goes_to_sender() {
        let registry = Arc::new(ControlRegistry::new("test"));
        let (in_tx, in_rx) = mpsc::unbounded::<Result<Message, std::io::Error>>();
        let (out_tx, out_rx) = mpsc::unbounded();

        let session = SubscribedSession::new(ctx(1), Arc::clone(&registry), Shout);
        let task = tokio::spawn(session.run(in_rx, out_tx));

        in_tx.unbounded_send(Ok(Message::Text("hi".into()))).unwrap();
        in_tx.unbounded_send(Ok(Message::Binary(bytes::Bytes::from_static(b"x")))).unwrap();
        in_tx.unbounded_send(Ok(Message::Text("".into()))).unwrap();
        in_tx.unbounded_send(Ok(Message::Text("there".into()))).unwrap();

        // Give the session time to drain its queue before the stream ends
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        drop(in_tx);

        task.await.unwrap().unwrap();
        let out: Vec<Message> = out_rx.collect().await;

        assert_eq!(texts(out), vec!["HI", "THERE"]);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_registered_while_open() {
        let registry = Arc::new(ControlRegistry::<String>::new("test"));
        let (in_tx, in_rx) = mpsc::unbounded::<Result<Message, std::io::Error>>();
        let (out_tx, _out_rx) = mpsc::unbounded();

        let session = SubscribedSession::new(ctx(7), Arc::clone(&registry), Shout);
        let task = tokio::spawn(session.run(in_rx, out_tx));

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(registry.contains(ConnectionId(7)).await);

        in_tx.unbounded_send(Ok(Message::Close(None))).unwrap();
        task.await.unwrap().unwrap();

        assert!(!registry.contains(ConnectionId(7)).await);
    }

    #[tokio::test]
    async fn test_transport_error_unregisters() {
        let registry = Arc::new(ControlRegistry::<String>::new("test"));
        let incoming = futures::stream::iter(vec![Err::<Message, _>(std::io::Error::other("boom"))]);
        let (out_tx, _out_rx) = mpsc::unbounded();

        let result = SubscribedSession::new(ctx(3), Arc::clone(&registry), Shout)
            .run(incoming, out_tx)
            .await;

        assert!(matches!(result, Err(SessionError::Transport(_))));
        assert!(registry.is_empty().await);
    }
}
