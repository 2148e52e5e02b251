//! Protocol and conversation logic for the screening chat widget.
//!
//! This crate is pure: it defines the WebSocket wire messages, the
//! conversation state machine, the frame interpreter, and sub-form
//! validation. All I/O (HTTP bootstrap, the WebSocket transport, the
//! places proxy) lives in the `screener-widget` runtime crate.

pub mod forms;
pub mod interpreter;
pub mod protocol;
pub mod state;
