use domain::Speaker;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlEvent {
    EmmaSpeaking,
    Listening,
    CallEnded,
}

/// A message sent from the dialog engine to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    Control {
        event: ControlEvent,
    },
    Text {
        text: String,
        speaker: Speaker,
    },
    AudioChunk {
        speaker: Speaker,
        codec: String,
        seq: u64,
        data_b64: String,
        is_final: bool,
    },
}

/// A message received from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingMessage {
    Text {
        text: String,
    },
    AudioStart {
        codec: String,
        sample_rate_hz: u32,
    },
    AudioChunk {
        data_b64: String,
        seq: u64,
        is_final: bool,
    },
    AudioEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_text_round_trips() {
        let msg = IncomingMessage::Text { text: "Ready".into() };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"Ready"}"#);
        let parsed: IncomingMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, IncomingMessage::Text { text } if text == "Ready"));
    }

    #[test]
    fn outgoing_control_round_trips() {
        let msg = OutgoingMessage::Control { event: ControlEvent::EmmaSpeaking };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"control","event":"emma_speaking"}"#);
    }
}
