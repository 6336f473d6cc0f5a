//! Gateway frame format
//!
//! Every frame is `{op, d, s, t}`. `op` stays a raw integer so that frames with
//! opcodes this library does not know still parse and can be routed to the
//! unknown-event fallback.

use super::{IdentifyPayload, OpCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: u8,

    /// Event data payload; `null` for payload-less frames
    #[serde(default)]
    pub d: Value,

    /// Sequence number (dispatch frames only)
    #[serde(default)]
    pub s: Option<u64>,

    /// Event type name (dispatch frames only)
    #[serde(default)]
    pub t: Option<String>,
}

impl GatewayMessage {
    /// Frame with the given opcode and payload, without sequence or type
    #[must_use]
    pub fn new(op: OpCode, d: Value) -> Self {
        Self {
            op: op.as_u8(),
            d,
            s: None,
            t: None,
        }
    }

    /// Create a Heartbeat frame (op=1) carrying the last sequence number seen
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self::new(
            OpCode::Heartbeat,
            last_sequence.map_or(Value::Null, |s| Value::Number(s.into())),
        )
    }

    /// Create an Identify frame (op=2)
    pub fn identify(payload: &IdentifyPayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(OpCode::Identify, serde_json::to_value(payload)?))
    }

    /// Create a Dispatch frame (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch.as_u8(),
            d: data,
            s: Some(sequence),
            t: Some(event_type.into()),
        }
    }

    /// The opcode, if this library knows it
    #[must_use]
    pub fn opcode(&self) -> Option<OpCode> {
        OpCode::from_u8(self.op)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.opcode() {
            Some(op) => write!(f, "GatewayMessage(op={op}")?,
            None => write!(f, "GatewayMessage(op={}", self.op)?,
        }
        if let Some(t) = &self.t {
            write!(f, ", t={t}")?;
        }
        if let Some(s) = self.s {
            write!(f, ", s={s}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::Intents;
    use serde_json::json;

    #[test]
    fn test_heartbeat_frame() {
        let first = GatewayMessage::heartbeat(None);
        assert_eq!(serde_json::to_value(&first).unwrap()["d"], Value::Null);
        assert_eq!(first.opcode(), Some(OpCode::Heartbeat));

        let later = GatewayMessage::heartbeat(Some(42));
        let json = serde_json::to_value(&later).unwrap();
        assert_eq!(json["op"], 1);
        assert_eq!(json["d"], 42);
    }

    #[test]
    fn test_identify_frame() {
        let payload = IdentifyPayload::new("abc", Intents::GUILDS, "chat-sdk");
        let frame = GatewayMessage::identify(&payload).unwrap();
        let json = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["op"], 2);
        assert_eq!(json["d"]["token"], "abc");
        assert_eq!(json["d"]["intents"], 1);
    }

    #[test]
    fn test_parse_dispatch() {
        let frame = GatewayMessage::from_json(
            r#"{"op": 0, "d": {"v": 9}, "s": 3, "t": "READY"}"#,
        )
        .unwrap();

        assert_eq!(frame.opcode(), Some(OpCode::Dispatch));
        assert_eq!(frame.s, Some(3));
        assert_eq!(frame.t.as_deref(), Some("READY"));
        assert_eq!(frame.d, json!({"v": 9}));
    }

    #[test]
    fn test_parse_null_fields() {
        let frame = GatewayMessage::from_json(r#"{"op": 11, "d": null, "s": null, "t": null}"#).unwrap();
        assert_eq!(frame.opcode(), Some(OpCode::HeartbeatAck));
        assert!(frame.s.is_none());
        assert!(frame.t.is_none());
        assert!(frame.d.is_null());

        let bare = GatewayMessage::from_json(r#"{"op": 11}"#).unwrap();
        assert_eq!(bare, frame);
    }

    #[test]
    fn test_parse_unknown_opcode() {
        let frame = GatewayMessage::from_json(r#"{"op": 42, "d": {}}"#).unwrap();
        assert_eq!(frame.op, 42);
        assert!(frame.opcode().is_none());
        assert_eq!(frame.to_string(), "GatewayMessage(op=42)");
    }

    #[test]
    fn test_message_display() {
        let dispatch = GatewayMessage::dispatch("MESSAGE_CREATE", 5, json!({}));
        assert_eq!(
            dispatch.to_string(),
            "GatewayMessage(op=Dispatch (0), t=MESSAGE_CREATE, s=5)"
        );
    }
}
