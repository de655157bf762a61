//! Statistics for sessions and the server

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Streaming-session statistics
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Binary frames received
    pub frames_received: u64,
    /// Frames that decoded successfully
    pub frames_decoded: u64,
    /// Decoded frames where a pose was found
    pub poses_detected: u64,
    /// Frames rejected by the decoder
    pub decode_failures: u64,
    /// Text messages on the binary-only channel
    pub protocol_violations: u64,
    /// Total payload bytes received
    pub bytes_received: u64,
    /// Replies written to the client
    pub replies_sent: u64,
    /// Connection duration
    pub duration: Duration,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of decoded frames with a pose (0.0 if none decoded)
    pub fn detection_rate(&self) -> f64 {
        if self.frames_decoded == 0 {
            0.0
        } else {
            self.poses_detected as f64 / self.frames_decoded as f64
        }
    }

    /// Average frames per second over the session
    pub fn frame_rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.frames_received as f64 / secs
        } else {
            0.0
        }
    }
}

/// Server-wide connection counters
#[derive(Debug, Default)]
pub struct ServerStats {
    total_connections: AtomicU64,
    active_connections: AtomicU64,
    rejected_connections: AtomicU64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted connection; returns the new active count
    pub fn connection_opened(&self) -> u64 {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record a finished connection; returns the new active count
    pub fn connection_closed(&self) -> u64 {
        self.active_connections.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }

    /// Record a connection turned away by the limit
    pub fn connection_rejected(&self) {
        self.rejected_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    pub fn active_connections(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }

    pub fn rejected_connections(&self) -> u64 {
        self.rejected_connections.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_stats_new() {
        let stats = SessionStats::new();
        assert_eq!(stats.frames_received, 0);
        assert_eq!(stats.frames_decoded, 0);
        assert_eq!(stats.decode_failures, 0);
        assert_eq!(stats.protocol_violations, 0);
        assert_eq!(stats.bytes_received, 0);
    }

    #[test]
    fn test_detection_rate() {
        let mut stats = SessionStats::new();
        assert_eq!(stats.detection_rate(), 0.0);

        stats.frames_decoded = 4;
        stats.poses_detected = 3;
        assert_eq!(stats.detection_rate(), 0.75);
    }

    #[test]
    fn test_frame_rate() {
        let mut stats = SessionStats::new();
        stats.frames_received = 300;
        stats.duration = Duration::from_secs(10);

        assert_eq!(stats.frame_rate(), 30.0);
    }

    #[test]
    fn test_frame_rate_zero_duration() {
        let mut stats = SessionStats::new();
        stats.frames_received = 300;

        assert_eq!(stats.frame_rate(), 0.0);
    }

    #[test]
    fn test_server_stats_counts() {
        let stats = ServerStats::new();

        assert_eq!(stats.connection_opened(), 1);
        assert_eq!(stats.connection_opened(), 2);
        assert_eq!(stats.connection_closed(), 1);
        stats.connection_rejected();

        assert_eq!(stats.total_connections(), 2);
        assert_eq!(stats.active_connections(), 1);
        assert_eq!(stats.rejected_connections(), 1);
    }
}
