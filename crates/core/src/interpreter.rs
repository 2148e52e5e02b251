//! Turns inbound protocol frames into state transitions and view reactions.
//!
//! [`interpret`] is a pure function: it mutates the [`ConversationState`]
//! and returns the ordered list of [`Reaction`]s the runtime must apply to
//! the view. Keeping the dispatch here, away from any I/O, is what makes
//! the protocol behavior testable without a transport or a host page.

use crate::{
    protocol::{InboundMessage, MessageType, Speaker},
    state::{ConversationState, FormKind, Phase, Status},
};
use tracing::warn;

/// A side effect the runtime must apply to the host view, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    AppendTranscript {
        speaker: Speaker,
        content: String,
        message_type: MessageType,
    },
    ShowTyping,
    HideTyping,
    /// Show the given form. The runtime is responsible for hiding the
    /// displaced form first, if the returned state transition displaced one.
    ActivateForm(FormKind),
    /// Hide a form that was displaced by a newer activation.
    DeactivateForm(FormKind),
    SetInputEnabled(bool),
    SetStatus(Status),
}

/// Applies one inbound frame to the conversation state.
///
/// Dispatch order for `ai_message` UI-activation flags is fixed: work
/// experience, then education, then address, then GPS. If the backend ever
/// sets more than one flag on a single message, the first in that order
/// wins and the rest are ignored.
pub fn interpret(state: &mut ConversationState, message: InboundMessage) -> Vec<Reaction> {
    match message {
        InboundMessage::Typing => {
            state.set_typing_indicator(true);
            vec![Reaction::ShowTyping]
        }
        InboundMessage::AiMessage {
            content,
            message_type,
            show_work_experience_ui,
            show_education_ui,
            show_address_ui,
            show_gps_ui,
        } => {
            state.set_typing_indicator(false);
            state.mark_live();
            let mut reactions = vec![
                Reaction::HideTyping,
                Reaction::AppendTranscript {
                    speaker: Speaker::Bot,
                    content,
                    message_type,
                },
            ];

            let requested = if show_work_experience_ui {
                Some(FormKind::WorkExperience)
            } else if show_education_ui {
                Some(FormKind::Education)
            } else if show_address_ui {
                Some(FormKind::Address)
            } else if show_gps_ui {
                Some(FormKind::Gps)
            } else {
                None
            };

            let terminal = matches!(state.phase(), Phase::Complete | Phase::Disconnected);
            match requested {
                Some(kind) if !terminal => {
                    if let Some(displaced) = state.activate_form(kind) {
                        reactions.push(Reaction::DeactivateForm(displaced));
                    }
                    reactions.push(Reaction::SetInputEnabled(false));
                    reactions.push(Reaction::ActivateForm(kind));
                }
                // A completed or disconnected session accepts no further
                // input; a late form request is ignored.
                Some(_) => {}
                None => {
                    state.enable_input();
                    if state.input_enabled() {
                        reactions.push(Reaction::SetInputEnabled(true));
                    }
                }
            }
            reactions
        }
        InboundMessage::WorkflowComplete => {
            state.set_typing_indicator(false);
            let dismissed = state.active_form();
            state.complete();
            let mut reactions = vec![Reaction::HideTyping];
            if let Some(kind) = dismissed {
                reactions.push(Reaction::DeactivateForm(kind));
            }
            reactions.push(Reaction::SetStatus(Status::Complete));
            reactions.push(Reaction::SetInputEnabled(false));
            reactions
        }
        InboundMessage::Error { message } => {
            state.set_typing_indicator(false);
            // Input state is deliberately left as-is: a backend error does
            // not by itself end the conversation.
            vec![
                Reaction::HideTyping,
                Reaction::SetStatus(Status::Disconnected),
                Reaction::AppendTranscript {
                    speaker: Speaker::Bot,
                    content: format!("Error: {}", message),
                    message_type: MessageType::Body,
                },
            ]
        }
        InboundMessage::Unknown => {
            warn!("Ignoring inbound frame of unrecognized kind");
            vec![]
        }
    }
}
