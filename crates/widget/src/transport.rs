//! The per-session WebSocket transport.
//!
//! One task owns the socket for the lifetime of the connection. Inbound
//! text frames are parsed into [`InboundMessage`]s and delivered on an
//! event channel; a frame that fails to parse is surfaced as a
//! [`TransportEvent::ProtocolError`] rather than dropped. Outbound sends
//! go through a [`TransportHandle`], which rejects them unless the
//! connection is open. There is no reconnection: a dropped connection is
//! a terminal event surfaced upward.

use futures_util::{SinkExt, StreamExt};
use screener_core::protocol::{InboundMessage, OutboundMessage};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};
use tracing::{error, info, warn};

/// Lifecycle of the one WebSocket behind a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    /// A transport fault occurred. Always followed by `Closed`.
    Errored,
    Closed,
}

/// Everything the connection task reports upward.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Opened,
    Frame(InboundMessage),
    /// An inbound text frame that was not valid protocol JSON.
    ProtocolError(String),
    /// A transport fault. The connection is gone; `Closed` follows.
    Errored(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("Connection is not open")]
    NotConnected,
}

/// The write side of the connection, safe to hand to sub-form controllers.
///
/// Sends are accepted only while the connection is open and the handle has
/// not been retired. [`TransportHandle::retire`] is called once the
/// workflow completes, so late sends fail even if the socket itself is
/// still up.
pub trait OutboundSink: Send + Sync {
    fn send(&self, message: OutboundMessage) -> Result<(), SendError>;
    fn retire(&self);
    fn is_open(&self) -> bool;
}

#[derive(Clone)]
pub struct TransportHandle {
    outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
    state_rx: watch::Receiver<ConnectionState>,
    retired: Arc<AtomicBool>,
}

impl TransportHandle {
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }
}

impl OutboundSink for TransportHandle {
    fn send(&self, message: OutboundMessage) -> Result<(), SendError> {
        if !self.is_open() {
            return Err(SendError::NotConnected);
        }
        self.outbound_tx
            .send(message)
            .map_err(|_| SendError::NotConnected)
    }

    fn retire(&self) {
        self.retired.store(true, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        !self.retired.load(Ordering::SeqCst) && self.state() == ConnectionState::Open
    }
}

/// Opens the WebSocket for a session and spawns the connection task.
///
/// Returns immediately; the handle reports `Connecting` until the server
/// accepts. Event order on the receiver is `Opened`, any number of
/// `Frame`/`ProtocolError`, then optionally `Errored`, then `Closed`.
pub fn connect(
    ws_base: &str,
    session_id: &str,
) -> (TransportHandle, mpsc::Receiver<TransportEvent>) {
    let url = format!("{}/ws/{}", ws_base, session_id);
    let (event_tx, event_rx) = mpsc::channel(32);
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
    let retired = Arc::new(AtomicBool::new(false));

    let handle = TransportHandle {
        outbound_tx,
        state_rx,
        retired,
    };

    tokio::spawn(async move {
        let fault = run_connection(&url, &state_tx, &event_tx, outbound_rx).await;
        if let Err(message) = fault {
            state_tx.send_replace(ConnectionState::Errored);
            let _ = event_tx.send(TransportEvent::Errored(message)).await;
        }
        state_tx.send_replace(ConnectionState::Closed);
        let _ = event_tx.send(TransportEvent::Closed).await;
    });

    (handle, event_rx)
}

/// The connection task body. Returns `Err` with a description on a
/// transport fault, `Ok` on an orderly close.
async fn run_connection(
    url: &str,
    state_tx: &watch::Sender<ConnectionState>,
    event_tx: &mpsc::Sender<TransportEvent>,
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>,
) -> Result<(), String> {
    let (stream, _) = connect_async(url)
        .await
        .map_err(|e| format!("WebSocket connect failed: {}", e))?;
    info!(%url, "WebSocket connection established");
    state_tx.send_replace(ConnectionState::Open);
    if event_tx.send(TransportEvent::Opened).await.is_err() {
        return Ok(());
    }

    let (mut ws_tx, mut ws_rx) = stream.split();

    loop {
        tokio::select! {
            Some(message) = outbound_rx.recv() => {
                let serialized = serde_json::to_string(&message)
                    .map_err(|e| format!("Failed to serialize outbound frame: {}", e))?;
                ws_tx
                    .send(WsMessage::Text(serialized.into()))
                    .await
                    .map_err(|e| format!("WebSocket send failed: {}", e))?;
            }
            frame = ws_rx.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    let event = match serde_json::from_str::<InboundMessage>(text.as_str()) {
                        Ok(message) => TransportEvent::Frame(message),
                        Err(e) => {
                            warn!(error = %e, "Dropping unparseable inbound frame");
                            TransportEvent::ProtocolError(format!("Malformed frame: {}", e))
                        }
                    };
                    if event_tx.send(event).await.is_err() {
                        return Ok(());
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("WebSocket closed by server");
                    return Ok(());
                }
                Some(Ok(_)) => {} // Ping/Pong/Binary carry nothing for us.
                Some(Err(e)) => {
                    error!(error = %e, "WebSocket receive failed");
                    return Err(format!("WebSocket receive failed: {}", e));
                }
            },
            else => return Ok(()),
        }
    }
}
