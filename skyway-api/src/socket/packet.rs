//! Engine.IO v4 and Socket.IO v4 text framing, default namespace only.
//!
//! An Engine.IO frame is a one-digit type followed by its payload. Socket.IO
//! packets travel inside Engine.IO `message` frames, so an event arrives as
//! `42["name",{...}]`: `4` for message, `2` for event.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("Empty frame")]
    Empty,
    #[error("Unknown {layer} packet type: {kind}")]
    UnknownType { layer: &'static str, kind: char },
    #[error("Malformed packet: {0}")]
    Malformed(String),
    #[error("Invalid packet JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Body of the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds.
    pub ping_interval: u64,
    /// Milliseconds.
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, PacketError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let payload = chars.as_str();
        Ok(match kind {
            '0' => EnginePacket::Open(serde_json::from_str(payload)?),
            '1' => EnginePacket::Close,
            '2' => EnginePacket::Ping,
            '3' => EnginePacket::Pong,
            '4' => EnginePacket::Message(payload.to_string()),
            '5' => EnginePacket::Upgrade,
            '6' => EnginePacket::Noop,
            other => return Err(PacketError::UnknownType { layer: "engine", kind: other }),
        })
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(handshake) => {
                format!("0{}", serde_json::to_string(handshake).unwrap_or_default())
            }
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping => "2".to_string(),
            EnginePacket::Pong => "3".to_string(),
            EnginePacket::Message(payload) => format!("4{}", payload),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Client → server carries auth; server → client carries `{"sid": ..}`.
    Connect(Option<Value>),
    Disconnect,
    Event {
        name: String,
        data: Value,
        ack_id: Option<u64>,
    },
    Ack {
        ack_id: u64,
        data: Vec<Value>,
    },
    ConnectError(Value),
}

impl SocketPacket {
    pub fn event(name: impl Into<String>, data: Value) -> Self {
        SocketPacket::Event {
            name: name.into(),
            data,
            ack_id: None,
        }
    }

    pub fn decode(payload: &str) -> Result<Self, PacketError> {
        let mut chars = payload.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let rest = skip_namespace(chars.as_str());

        match kind {
            '0' => {
                let data = if rest.is_empty() { None } else { Some(serde_json::from_str(rest)?) };
                Ok(SocketPacket::Connect(data))
            }
            '1' => Ok(SocketPacket::Disconnect),
            '2' => {
                let (ack_id, body) = split_ack_id(rest);
                let mut args = match serde_json::from_str::<Value>(body)? {
                    Value::Array(args) => args.into_iter(),
                    _ => return Err(PacketError::Malformed(payload.to_string())),
                };
                let name = match args.next() {
                    Some(Value::String(name)) => name,
                    _ => return Err(PacketError::Malformed(payload.to_string())),
                };
                // Extra arguments beyond the first are not used by this server
                let data = args.next().unwrap_or(Value::Null);
                Ok(SocketPacket::Event { name, data, ack_id })
            }
            '3' => {
                let (ack_id, body) = split_ack_id(rest);
                let ack_id = ack_id.ok_or_else(|| PacketError::Malformed(payload.to_string()))?;
                let data = match serde_json::from_str::<Value>(body)? {
                    Value::Array(data) => data,
                    other => vec![other],
                };
                Ok(SocketPacket::Ack { ack_id, data })
            }
            '4' => {
                let data = if rest.is_empty() { Value::Null } else { serde_json::from_str(rest)? };
                Ok(SocketPacket::ConnectError(data))
            }
            other => Err(PacketError::UnknownType { layer: "socket", kind: other }),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            SocketPacket::Connect(None) => "0".to_string(),
            SocketPacket::Connect(Some(data)) => format!("0{}", data),
            SocketPacket::Disconnect => "1".to_string(),
            SocketPacket::Event { name, data, ack_id } => {
                let args = Value::Array(vec![Value::String(name.clone()), data.clone()]);
                match ack_id {
                    Some(id) => format!("2{}{}", id, args),
                    None => format!("2{}", args),
                }
            }
            SocketPacket::Ack { ack_id, data } => {
                format!("3{}{}", ack_id, Value::Array(data.clone()))
            }
            SocketPacket::ConnectError(data) => format!("4{}", data),
        }
    }

    /// Wrap in an Engine.IO message frame.
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(self.encode()).encode()
    }
}

/// Drop a `/nsp,` prefix. Only the default namespace is used.
fn skip_namespace(rest: &str) -> &str {
    if rest.starts_with('/') {
        match rest.find(',') {
            Some(idx) => &rest[idx + 1..],
            None => "",
        }
    } else {
        rest
    }
}

fn split_ack_id(rest: &str) -> (Option<u64>, &str) {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return (None, rest);
    }
    (rest[..digits].parse().ok(), &rest[digits..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open_handshake() {
        let frame = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        match EnginePacket::decode(frame).unwrap() {
            EnginePacket::Open(handshake) => {
                assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
                assert_eq!(handshake.ping_interval, 25000);
                assert_eq!(handshake.ping_timeout, 20000);
            }
            other => panic!("expected open, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_control_frames() {
        assert_eq!(EnginePacket::decode("2").unwrap(), EnginePacket::Ping);
        assert_eq!(EnginePacket::Pong.encode(), "3");
        assert_eq!(EnginePacket::decode("1").unwrap(), EnginePacket::Close);
        assert!(matches!(EnginePacket::decode(""), Err(PacketError::Empty)));
        assert!(matches!(
            EnginePacket::decode("9"),
            Err(PacketError::UnknownType { layer: "engine", kind: '9' })
        ));
    }

    #[test]
    fn test_connect_with_auth_frame() {
        let frame = SocketPacket::Connect(Some(json!({"token": "abc"}))).to_frame();
        assert_eq!(frame, r#"40{"token":"abc"}"#);
    }

    #[test]
    fn test_event_frame_encoding() {
        let packet = SocketPacket::event("join_flight_room", json!({"flight_id": 12}));
        assert_eq!(packet.to_frame(), r#"42["join_flight_room",{"flight_id":12}]"#);
    }

    #[test]
    fn test_decode_server_event() {
        let frame = r#"2["flight_cancelled",{"flight_id":3,"status":"CANCELLED"}]"#;
        let packet = SocketPacket::decode(frame).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Event {
                name: "flight_cancelled".to_string(),
                data: json!({"flight_id": 3, "status": "CANCELLED"}),
                ack_id: None,
            }
        );
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack_id() {
        let packet = SocketPacket::decode(r#"2/admin,7["connected",{"message":"hi"}]"#).unwrap();
        match packet {
            SocketPacket::Event { name, ack_id, .. } => {
                assert_eq!(name, "connected");
                assert_eq!(ack_id, Some(7));
            }
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_connect_variants() {
        assert_eq!(
            SocketPacket::decode(r#"0{"sid":"x"}"#).unwrap(),
            SocketPacket::Connect(Some(json!({"sid": "x"})))
        );
        assert_eq!(SocketPacket::decode("1").unwrap(), SocketPacket::Disconnect);
        assert_eq!(
            SocketPacket::decode(r#"4{"message":"Not authorized"}"#).unwrap(),
            SocketPacket::ConnectError(json!({"message": "Not authorized"}))
        );
    }

    #[test]
    fn test_event_without_name_is_malformed() {
        assert!(matches!(SocketPacket::decode("2[]"), Err(PacketError::Malformed(_))));
        assert!(matches!(SocketPacket::decode(r#"2{"a":1}"#), Err(PacketError::Malformed(_))));
    }
}
