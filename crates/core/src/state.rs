//! Conversation state for a single widget session.
//!
//! The state is deliberately small: whether free-text input is accepted,
//! which structured sub-form (if any) currently owns the input area, and
//! whether the typing indicator is visible. The mutators enforce the two
//! rules the rest of the widget relies on: at most one sub-form is active
//! at a time, and input is never enabled while a sub-form is active.

use std::fmt;

/// Identity of a structured data-collection sub-form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    WorkExperience,
    Education,
    Address,
    Gps,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormKind::WorkExperience => write!(f, "work experience"),
            FormKind::Education => write!(f, "education"),
            FormKind::Address => write!(f, "address"),
            FormKind::Gps => write!(f, "location"),
        }
    }
}

/// Lifecycle phase of the conversation, mirrored into the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Live,
    /// The workflow finished; input stays disabled for the rest of the
    /// session, there is no resumption path.
    Complete,
    Disconnected,
}

/// Connection/workflow status surfaced to the host view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Connecting,
    Connected,
    Complete,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    input_enabled: bool,
    active_form: Option<FormKind>,
    typing_indicator_visible: bool,
    phase: Phase,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            input_enabled: false,
            active_form: None,
            typing_indicator_visible: false,
            phase: Phase::Connecting,
        }
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn active_form(&self) -> Option<FormKind> {
        self.active_form
    }

    pub fn typing_indicator_visible(&self) -> bool {
        self.typing_indicator_visible
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_typing_indicator(&mut self, visible: bool) {
        self.typing_indicator_visible = visible;
    }

    pub fn mark_live(&mut self) {
        if self.phase == Phase::Connecting {
            self.phase = Phase::Live;
        }
    }

    /// Enables free-text input. A no-op once the workflow is complete or the
    /// connection is gone, and never valid while a sub-form is active, so an
    /// active form is deactivated first.
    pub fn enable_input(&mut self) {
        if matches!(self.phase, Phase::Complete | Phase::Disconnected) {
            return;
        }
        self.active_form = None;
        self.input_enabled = true;
    }

    pub fn disable_input(&mut self) {
        self.input_enabled = false;
    }

    /// Activates a sub-form, displacing any previously active one.
    ///
    /// Returns the form that was displaced, if any, so the caller can hide
    /// its UI. Input is always disabled as part of activation. A no-op once
    /// the workflow is complete or the connection is gone: a finished
    /// session accepts no further input, structured or free-text.
    pub fn activate_form(&mut self, kind: FormKind) -> Option<FormKind> {
        if matches!(self.phase, Phase::Complete | Phase::Disconnected) {
            return None;
        }
        let previous = self.active_form.filter(|&prev| prev != kind);
        self.active_form = Some(kind);
        self.input_enabled = false;
        previous
    }

    /// Deactivates the given form if it is the active one and restores the
    /// default input-enabled mode. Deactivating a form that is not active is
    /// a no-op (a stale hide from an already-displaced form).
    pub fn deactivate_form(&mut self, kind: FormKind) {
        if self.active_form == Some(kind) {
            self.active_form = None;
            self.enable_input();
        }
    }

    /// Marks the workflow complete. Input is disabled permanently; any
    /// active form is dismissed.
    pub fn complete(&mut self) {
        self.phase = Phase::Complete;
        self.active_form = None;
        self.input_enabled = false;
    }

    /// Marks the connection as terminally lost.
    pub fn disconnect(&mut self) {
        if self.phase != Phase::Complete {
            self.phase = Phase::Disconnected;
        }
        self.active_form = None;
        self.input_enabled = false;
    }

    /// The invariant every transition must preserve.
    pub fn invariant_holds(&self) -> bool {
        self.active_form.is_none() || !self.input_enabled
    }
}
