//! Runtime for the embeddable screening chat widget.
//!
//! One widget instance per embedding: [`widget::activate`] validates the
//! embedding domain, starts a session, connects the WebSocket, and spawns
//! the event loop. The host page supplies a [`view::WidgetView`] for
//! presentation and a [`view::Geolocator`] for GPS capture; everything
//! else (transport, places proxy, sub-form controllers) lives here, on
//! top of the pure protocol logic in `screener-core`.

pub mod bootstrap;
pub mod config;
pub mod forms;
pub mod places;
pub mod transport;
pub mod view;
pub mod widget;

pub use config::WidgetConfig;
pub use view::{GeoError, GeoPosition, Geolocator, WidgetView};
pub use widget::{WidgetCommand, WidgetHandle, activate};
