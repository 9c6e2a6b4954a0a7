use serde::{Deserialize, Serialize};

/// An SDP description exchanged during offer/answer negotiation.
///
/// `kind` maps to the wire field `type` ("offer" or "answer").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDescription {
    pub sdp: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Payload of a client `event` message. Unknown extra fields are kept so
/// they can be logged without being modeled here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(rename = "eventName", default)]
    pub event_name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Wire messages of the signaling protocol, tagged by the JSON `type` field.
///
/// Messages with an unrecognized `type` decode to [`SignalMessage::Unknown`];
/// a malformed body is a decode error. Both are non-fatal for the connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalMessage {
    Welcome { message: String },
    Offer { payload: SessionDescription },
    Answer { payload: SessionDescription },
    Event { payload: EventPayload },
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_decodes_from_wire_shape() {
        let raw = r#"{"type":"offer","payload":{"sdp":"v=0...","type":"offer"}}"#;
        let msg: SignalMessage = serde_json::from_str(raw).unwrap();
        match msg {
            SignalMessage::Offer { payload } => {
                assert_eq!(payload.sdp, "v=0...");
                assert_eq!(payload.kind, "offer");
            }
            other => panic!("expected offer, got {:?}", other),
        }
    }

    #[test]
    fn answer_serializes_with_nested_type_field() {
        let msg = SignalMessage::Answer {
            payload: SessionDescription {
                sdp: "v=0...".into(),
                kind: "answer".into(),
            },
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "answer");
        assert_eq!(json["payload"]["type"], "answer");
        assert_eq!(json["payload"]["sdp"], "v=0...");
    }

    #[test]
    fn unrecognized_type_decodes_to_unknown() {
        let raw = r#"{"type":"candidate","payload":{"candidate":"..."}}"#;
        let msg: SignalMessage = serde_json::from_str(raw).unwrap();
        assert!(matches!(msg, SignalMessage::Unknown));
    }

    #[test]
    fn event_keeps_extra_fields() {
        let raw = r#"{"type":"event","payload":{"eventName":"device_changed","deviceId":"cam0"}}"#;
        let msg: SignalMessage = serde_json::from_str(raw).unwrap();
        match msg {
            SignalMessage::Event { payload } => {
                assert_eq!(payload.event_name, "device_changed");
                assert_eq!(payload.extra["deviceId"], "cam0");
            }
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn event_without_name_decodes_empty() {
        let raw = r#"{"type":"event","payload":{}}"#;
        let msg: SignalMessage = serde_json::from_str(raw).unwrap();
        match msg {
            SignalMessage::Event { payload } => assert!(payload.event_name.is_empty()),
            other => panic!("expected event, got {:?}", other),
        }
    }
}
