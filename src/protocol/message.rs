//! JSON message shapes for every channel
//!
//! Each channel has a closed set of shapes. Incoming control commands are an
//! internally tagged enum with a catch-all arm, so unrecognized `type` values
//! are a normal variant rather than a parse error.

use serde::{Deserialize, Serialize};

use crate::pose::PoseResult;

/// Error codes sent in `{"error": ...}` replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    DecodeFailed,
    SendBinaryFrames,
    InvalidJson,
}

/// `{"error": <code>, "detail": <text>}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorReply {
    pub fn decode_failed(detail: impl Into<String>) -> Self {
        Self {
            error: ErrorCode::DecodeFailed,
            detail: Some(detail.into()),
        }
    }

    pub fn send_binary_frames() -> Self {
        Self {
            error: ErrorCode::SendBinaryFrames,
            detail: Some("Send image bytes as binary frames".into()),
        }
    }

    pub fn invalid_json() -> Self {
        Self {
            error: ErrorCode::InvalidJson,
            detail: None,
        }
    }
}

/// Server → client on the streaming channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamReply {
    Pose(PoseResult),
    Error(ErrorReply),
}

/// Client → server on the control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlCommand {
    /// Ask the server to pick and broadcast the next pose
    Next,
    /// Any other `type` value
    #[serde(other)]
    Unknown,
}

impl ControlCommand {
    /// Parse a control text message
    ///
    /// Fails only when `text` is not JSON at all. Valid JSON that is not a
    /// recognized command shape (no `type`, not an object) is `Unknown`.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::deserialize(value).unwrap_or(ControlCommand::Unknown))
    }
}

/// Server → client on the control channel (`"type"`-tagged)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlEvent {
    /// Broadcast pose selection
    Pose { pose: String },
    /// Reply to the sender of an unrecognized command
    Error { detail: String },
}

impl ControlEvent {
    pub fn pose(pose: impl Into<String>) -> Self {
        ControlEvent::Pose { pose: pose.into() }
    }

    pub fn unknown_type() -> Self {
        ControlEvent::Error {
            detail: "unknown_type".into(),
        }
    }
}

/// Anything queued for a control connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlReply {
    Event(ControlEvent),
    Error(ErrorReply),
}

impl From<ControlEvent> for ControlReply {
    fn from(event: ControlEvent) -> Self {
        ControlReply::Event(event)
    }
}

impl From<ErrorReply> for ControlReply {
    fn from(reply: ErrorReply) -> Self {
        ControlReply::Error(reply)
    }
}

/// Server → client on the test channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EchoEvent {
    /// Echo of a message the client sent
    Ack { received: String },
    /// A line read from the server's stdin
    Stdin { text: String },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::pose::Landmark;

    #[test]
    fn test_stream_reply_pose_shape() {
        let reply = StreamReply::Pose(PoseResult {
            landmarks: vec![Landmark {
                index: 0,
                name: "nose".into(),
                x: 1.5,
                y: 2.5,
                z: Some(0.5),
                visibility: 0.75,
            }],
            has_pose: true,
        });

        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({
                "landmarks": [{
                    "index": 0, "name": "nose",
                    "x": 1.5, "y": 2.5, "z": 0.5, "visibility": 0.75
                }],
                "has_pose": true
            })
        );
    }

    #[test]
    fn test_stream_reply_error_shapes() {
        let decode = StreamReply::Error(ErrorReply::decode_failed("bad bytes"));
        assert_eq!(
            serde_json::to_value(&decode).unwrap(),
            json!({"error": "decode_failed", "detail": "bad bytes"})
        );

        let text = StreamReply::Error(ErrorReply::send_binary_frames());
        assert_eq!(
            serde_json::to_value(&text).unwrap(),
            json!({"error": "send_binary_frames", "detail": "Send image bytes as binary frames"})
        );
    }

    #[test]
    fn test_parse_next() {
        assert_eq!(ControlCommand::parse(r#"{"type":"next"}"#).unwrap(), ControlCommand::Next);
        assert_eq!(
            ControlCommand::parse(r#"{"type":"next","from":"ui"}"#).unwrap(),
            ControlCommand::Next
        );
    }

    #[test]
    fn test_parse_unknown_shapes() {
        for text in [r#"{"type":"bogus"}"#, r#"{}"#, r#"{"type":5}"#, "[1,2]", "42", r#""next""#] {
            assert_eq!(
                ControlCommand::parse(text).unwrap(),
                ControlCommand::Unknown,
                "input: {text}"
            );
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(ControlCommand::parse("next please").is_err());
        assert!(ControlCommand::parse("").is_err());
    }

    #[test]
    fn test_control_reply_shapes() {
        let pose: ControlReply = ControlEvent::pose("T-Pose").into();
        assert_eq!(
            serde_json::to_value(&pose).unwrap(),
            json!({"type": "pose", "pose": "T-Pose"})
        );

        let unknown: ControlReply = ControlEvent::unknown_type().into();
        assert_eq!(
            serde_json::to_value(&unknown).unwrap(),
            json!({"type": "error", "detail": "unknown_type"})
        );

        let invalid: ControlReply = ErrorReply::invalid_json().into();
        assert_eq!(serde_json::to_value(&invalid).unwrap(), json!({"error": "invalid_json"}));
    }

    #[test]
    fn test_echo_event_shapes() {
        let ack = EchoEvent::Ack {
            received: "hi".into(),
        };
        assert_eq!(
            serde_json::to_value(&ack).unwrap(),
            json!({"type": "ack", "received": "hi"})
        );

        let line = EchoEvent::Stdin {
            text: "hello".into(),
        };
        assert_eq!(
            serde_json::to_value(&line).unwrap(),
            json!({"type": "stdin", "text": "hello"})
        );
    }
}
