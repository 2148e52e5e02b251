//! The GPS capture form.
//!
//! The user either shares their device location or explicitly skips. A
//! capture failure is surfaced as a retryable error; it never silently
//! becomes a skip. While a capture is in flight the form's actions are
//! disabled, and a result that lands after the form was hidden is
//! discarded via the generation counter.

use crate::view::GeoPosition;
use screener_core::protocol::OutboundMessage;

#[derive(Debug, Default)]
pub struct GpsForm {
    capturing: bool,
    generation: u64,
}

impl GpsForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capturing(&self) -> bool {
        self.capturing
    }

    /// Starts a capture. Returns its generation, or `None` if one is
    /// already in flight (double-click guard).
    pub fn begin_capture(&mut self) -> Option<u64> {
        if self.capturing {
            return None;
        }
        self.capturing = true;
        self.generation += 1;
        Some(self.generation)
    }

    /// Marks a capture as finished. Returns `false` when the result is
    /// stale (the form was hidden or reset since the capture started) and
    /// must be discarded.
    pub fn finish_capture(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.capturing = false;
        true
    }

    /// Invalidates any in-flight capture, used when the form is hidden.
    pub fn reset(&mut self) {
        self.capturing = false;
        self.generation += 1;
    }

    /// The frame and echo for a successful capture. `formatted` is the
    /// reverse-geocoded address when one was available.
    pub fn share_payload(
        position: GeoPosition,
        formatted: Option<&str>,
    ) -> (OutboundMessage, String) {
        let echo = match formatted {
            Some(address) => format!("Shared location: {}", address),
            None => format!("Shared location: {:.5}, {:.5}", position.lat, position.lng),
        };
        (
            OutboundMessage::GpsData {
                lat: Some(position.lat),
                lng: Some(position.lng),
                skipped: false,
            },
            echo,
        )
    }

    /// The frame and echo for an explicit skip.
    pub fn skip_payload() -> (OutboundMessage, String) {
        (
            OutboundMessage::GpsData {
                lat: None,
                lng: None,
                skipped: true,
            },
            "Skipped sharing location".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_is_single_flight() {
        let mut form = GpsForm::new();
        let first = form.begin_capture();
        assert!(first.is_some());
        assert!(form.capturing());
        assert_eq!(form.begin_capture(), None);

        assert!(form.finish_capture(first.unwrap()));
        assert!(!form.capturing());
        assert!(form.begin_capture().is_some());
    }

    #[test]
    fn result_after_reset_is_stale() {
        let mut form = GpsForm::new();
        let generation = form.begin_capture().unwrap();
        form.reset();
        assert!(!form.finish_capture(generation));
        assert!(!form.capturing());
    }

    #[test]
    fn share_payload_carries_coordinates() {
        let (message, echo) = GpsForm::share_payload(
            GeoPosition {
                lat: 39.78172,
                lng: -89.65015,
            },
            None,
        );
        assert_eq!(
            message,
            OutboundMessage::GpsData {
                lat: Some(39.78172),
                lng: Some(-89.65015),
                skipped: false,
            }
        );
        assert_eq!(echo, "Shared location: 39.78172, -89.65015");
    }

    #[test]
    fn share_payload_prefers_reverse_geocoded_address() {
        let (_, echo) = GpsForm::share_payload(
            GeoPosition {
                lat: 39.78172,
                lng: -89.65015,
            },
            Some("1 Main St, Springfield, IL 62701"),
        );
        assert_eq!(echo, "Shared location: 1 Main St, Springfield, IL 62701");
    }

    #[test]
    fn skip_payload_is_distinct_from_a_capture() {
        let (message, echo) = GpsForm::skip_payload();
        assert_eq!(
            message,
            OutboundMessage::GpsData {
                lat: None,
                lng: None,
                skipped: true,
            }
        );
        assert_eq!(echo, "Skipped sharing location");
    }
}
