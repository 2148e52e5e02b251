//! Defines the JSON message protocol exchanged over the per-session WebSocket.
//!
//! Every frame is a single JSON object with a `type` discriminator. Field
//! names and enumerated string values are the compatibility surface between
//! the widget and the screening backend, so the serde attributes here are
//! load-bearing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendering class for a bot message, assigned by the backend.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Intro,
    Questions,
    #[default]
    Body,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Intro => write!(f, "intro"),
            MessageType::Questions => write!(f, "questions"),
            MessageType::Body => write!(f, "body"),
        }
    }
}

/// Messages sent from the backend to the widget.
///
/// Unrecognized `type` values deserialize into [`InboundMessage::Unknown`]
/// so that newer server message kinds never break an older client.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// A conversational message from the bot, optionally requesting that a
    /// structured sub-form take over the input area.
    AiMessage {
        content: String,
        #[serde(rename = "messageType", default)]
        message_type: MessageType,
        #[serde(default)]
        show_work_experience_ui: bool,
        #[serde(default)]
        show_education_ui: bool,
        #[serde(default)]
        show_address_ui: bool,
        #[serde(default)]
        show_gps_ui: bool,
    },
    /// The bot is composing its next message.
    Typing,
    /// The screening workflow has finished; no further input is accepted.
    WorkflowComplete,
    /// A fatal backend error, surfaced to the user in the transcript.
    Error { message: String },
    /// Forward-compatibility catch-all for message kinds this client
    /// does not understand.
    #[serde(other)]
    Unknown,
}

/// One position in the candidate's work history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkExperienceEntry {
    pub company: String,
    pub role: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
}

/// A structured postal address. `full` is always populated; the component
/// fields are best-effort and empty when only a free-text fallback was
/// available.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    pub full: String,
}

/// Messages sent from the widget to the backend.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Free-text input from the candidate.
    UserMessage { content: String },
    /// The completed work-history form.
    WorkExperienceData { data: Vec<WorkExperienceEntry> },
    /// The confirmed education level, as its display string.
    EducationData { data: String },
    /// The confirmed structured address.
    AddressData { data: Address },
    /// A GPS capture, or an explicit skip (`lat`/`lng` null, `skipped` true).
    GpsData {
        lat: Option<f64>,
        lng: Option<f64>,
        skipped: bool,
    },
}

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_message_minimal_deserializes_with_defaults() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type": "ai_message", "content": "hi"}"#).unwrap();
        match msg {
            InboundMessage::AiMessage {
                content,
                message_type,
                show_work_experience_ui,
                show_education_ui,
                show_address_ui,
                show_gps_ui,
            } => {
                assert_eq!(content, "hi");
                assert_eq!(message_type, MessageType::Body);
                assert!(!show_work_experience_ui);
                assert!(!show_education_ui);
                assert!(!show_address_ui);
                assert!(!show_gps_ui);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn ai_message_carries_message_type_and_flags() {
        let msg: InboundMessage = serde_json::from_str(
            r#"{"type": "ai_message", "content": "Where did you work?",
                "messageType": "questions", "show_work_experience_ui": true}"#,
        )
        .unwrap();
        match msg {
            InboundMessage::AiMessage {
                message_type,
                show_work_experience_ui,
                ..
            } => {
                assert_eq!(message_type, MessageType::Questions);
                assert!(show_work_experience_ui);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn typing_and_workflow_complete_deserialize() {
        let typing: InboundMessage = serde_json::from_str(r#"{"type": "typing"}"#).unwrap();
        assert_eq!(typing, InboundMessage::Typing);

        let done: InboundMessage =
            serde_json::from_str(r#"{"type": "workflow_complete"}"#).unwrap();
        assert_eq!(done, InboundMessage::WorkflowComplete);
    }

    #[test]
    fn error_frame_carries_message() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type": "error", "message": "Invalid session ID"}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Error {
                message: "Invalid session ID".to_string()
            }
        );
    }

    #[test]
    fn unknown_type_is_tolerated() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type": "future_feature", "payload": 42}"#).unwrap();
        assert_eq!(msg, InboundMessage::Unknown);
    }

    #[test]
    fn user_message_wire_format() {
        let json = serde_json::to_string(&OutboundMessage::UserMessage {
            content: "hello".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"user_message","content":"hello"}"#);
    }

    #[test]
    fn work_experience_wire_format_uses_camel_case_dates() {
        let json = serde_json::to_string(&OutboundMessage::WorkExperienceData {
            data: vec![WorkExperienceEntry {
                company: "Acme".to_string(),
                role: "Cashier".to_string(),
                start_date: "2021-01".to_string(),
                end_date: "2022-01".to_string(),
            }],
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"work_experience_data","data":[{"company":"Acme","role":"Cashier","startDate":"2021-01","endDate":"2022-01"}]}"#
        );
    }

    #[test]
    fn gps_skip_wire_format() {
        let json = serde_json::to_string(&OutboundMessage::GpsData {
            lat: None,
            lng: None,
            skipped: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"gps_data","lat":null,"lng":null,"skipped":true}"#);
    }

    #[test]
    fn address_wire_format() {
        let json = serde_json::to_string(&OutboundMessage::AddressData {
            data: Address {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip: "62701".to_string(),
                full: "1 Main St, Springfield, IL 62701".to_string(),
            },
        })
        .unwrap();
        assert!(json.starts_with(r#"{"type":"address_data","data":{"#));
        assert!(json.contains(r#""full":"1 Main St, Springfield, IL 62701""#));
    }

    #[test]
    fn message_type_round_trip() {
        for (mt, s) in [
            (MessageType::Intro, "\"intro\""),
            (MessageType::Questions, "\"questions\""),
            (MessageType::Body, "\"body\""),
        ] {
            assert_eq!(serde_json::to_string(&mt).unwrap(), s);
            let back: MessageType = serde_json::from_str(s).unwrap();
            assert_eq!(back, mt);
        }
    }
}
