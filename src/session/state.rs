//! Streaming session state machine
//!
//! `Open → (ReceivingFrame → Responding)* → Closed`

use std::net::SocketAddr;
use std::time::Instant;

use crate::registry::ConnectionId;
use crate::stats::SessionStats;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Accepted, waiting for the next message
    Open,
    /// Decoding and running inference on a frame
    ReceivingFrame,
    /// Writing the reply for the current frame
    Responding,
    /// Session closed; terminal
    Closed,
}

/// Complete streaming session state
#[derive(Debug)]
pub struct SessionState {
    /// Connection identity
    pub id: ConnectionId,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Current phase
    pub phase: SessionPhase,

    /// Connection start time
    pub connected_at: Instant,

    /// Running counters
    pub stats: SessionStats,
}

impl SessionState {
    /// Create a new session state; sessions start `Open`
    pub fn new(id: ConnectionId, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            phase: SessionPhase::Open,
            connected_at: Instant::now(),
            stats: SessionStats::new(),
        }
    }

    /// A binary frame arrived
    pub fn begin_frame(&mut self, size: usize) {
        if self.phase == SessionPhase::Open {
            self.phase = SessionPhase::ReceivingFrame;
            self.stats.frames_received += 1;
            self.stats.bytes_received += size as u64;
        }
    }

    /// Frame decoded; `has_pose` is the detection outcome
    pub fn on_decoded(&mut self, has_pose: bool) {
        self.stats.frames_decoded += 1;
        if has_pose {
            self.stats.poses_detected += 1;
        }
    }

    /// Frame rejected by the decoder
    pub fn on_decode_failed(&mut self) {
        self.stats.decode_failures += 1;
    }

    /// Text arrived on the binary-only channel
    pub fn on_protocol_violation(&mut self) {
        self.stats.protocol_violations += 1;
    }

    /// Reply for the current frame is being written
    pub fn begin_response(&mut self) {
        if self.phase == SessionPhase::ReceivingFrame {
            self.phase = SessionPhase::Responding;
        }
    }

    /// Reply written; back to waiting
    pub fn finish_response(&mut self) {
        self.stats.replies_sent += 1;
        if self.phase == SessionPhase::Responding {
            self.phase = SessionPhase::Open;
        }
    }

    /// Close the session. Irreversible.
    pub fn close(&mut self) {
        self.phase = SessionPhase::Closed;
        self.stats.duration = self.connected_at.elapsed();
    }

    pub fn is_closed(&self) -> bool {
        self.phase == SessionPhase::Closed
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    fn state() -> SessionState {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000);
        SessionState::new(ConnectionId(1), addr)
    }

    #[test]
    fn test_frame_cycle() {
        let mut state = state();
        assert_eq!(state.phase, SessionPhase::Open);

        state.begin_frame(1024);
        assert_eq!(state.phase, SessionPhase::ReceivingFrame);

        state.on_decoded(true);
        state.begin_response();
        assert_eq!(state.phase, SessionPhase::Responding);

        state.finish_response();
        assert_eq!(state.phase, SessionPhase::Open);

        assert_eq!(state.stats.frames_received, 1);
        assert_eq!(state.stats.bytes_received, 1024);
        assert_eq!(state.stats.poses_detected, 1);
        assert_eq!(state.stats.replies_sent, 1);
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut state = state();
        state.close();
        assert!(state.is_closed());

        state.begin_frame(10);
        state.begin_response();
        state.finish_response();

        assert_eq!(state.phase, SessionPhase::Closed);
        assert_eq!(state.stats.frames_received, 0);
    }

    #[test]
    fn test_protocol_violation_keeps_session_open() {
        let mut state = state();
        state.on_protocol_violation();
        state.finish_response();

        assert_eq!(state.phase, SessionPhase::Open);
        assert_eq!(state.stats.protocol_violations, 1);
    }
}
