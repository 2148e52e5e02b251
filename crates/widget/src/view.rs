//! Capabilities the embedding host must provide.
//!
//! The widget never touches a DOM. Everything it needs from the host page
//! is behind two traits: [`WidgetView`] for presentation and
//! [`Geolocator`] for GPS capture. The protocol logic is exercised in
//! tests against recording fakes of these traits.

use async_trait::async_trait;
use screener_core::{
    protocol::{MessageType, Speaker},
    state::{FormKind, Status},
};

/// The single view-binding layer. Implementations render into the host
/// page; the widget runtime is the only caller.
pub trait WidgetView: Send {
    fn append_message(&mut self, speaker: Speaker, content: &str, message_type: MessageType);
    fn set_status(&mut self, status: Status);
    fn set_input_enabled(&mut self, enabled: bool);
    fn set_typing_indicator(&mut self, visible: bool);
    fn show_form(&mut self, kind: FormKind);
    fn hide_form(&mut self, kind: FormKind);
    /// Transient, non-transcript feedback ("not ready", validation
    /// failures, retryable GPS errors).
    fn show_notice(&mut self, text: &str);
    /// Replaces the address form's suggestion list.
    fn show_suggestions(&mut self, descriptions: &[String]);
}

/// A successful GPS capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    pub lat: f64,
    pub lng: f64,
}

/// Why a GPS capture failed. All of these are retryable; none of them is
/// ever converted into a skip on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeoError {
    #[error("Location permission was denied")]
    PermissionDenied,
    #[error("Position is unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
}

/// Host-provided access to the device's location.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn capture(&self) -> Result<GeoPosition, GeoError>;
}
