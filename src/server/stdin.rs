//! stdin → `/ws/test` broadcaster
//!
//! Every non-empty line typed on the server's stdin goes out to all test
//! channel members as `{"type":"stdin","text":...}`.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::protocol::EchoEvent;
use crate::registry::ControlRegistry;

/// Broadcast each non-empty line of `reader`; returns the number broadcast
pub async fn broadcast_lines<R>(reader: R, registry: &ControlRegistry<EchoEvent>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut count = 0;

    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            continue;
        }

        let report = registry.broadcast(EchoEvent::Stdin { text: line }).await;
        tracing::debug!(delivered = report.delivered, "stdin line broadcast");
        count += 1;
    }

    Ok(count)
}

/// Spawn the broadcaster on the process stdin
///
/// The task ends at EOF; abort the handle to stop it earlier.
pub fn spawn_stdin_broadcaster(registry: Arc<ControlRegistry<EchoEvent>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reader = BufReader::new(tokio::io::stdin());
        match broadcast_lines(reader, &registry).await {
            Ok(count) => tracing::info!(lines = count, "stdin closed, broadcaster stopped"),
            Err(e) => tracing::warn!(error = %e, "stdin read failed, broadcaster stopped"),
        }
    })
}
