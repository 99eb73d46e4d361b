//! The tunnel callback seam.
//!
//! User code implements [`TunnelHandler`] and reacts to connection events
//! and telegrams. All callbacks run on the tunnel task, serialized with
//! every other event; a callback that blocks stalls the whole tunnel, so
//! it must return well inside the tightest protocol timeout (1 s for ack
//! handling).
//!
//! Sending is intent-based: a callback returns
//! [`HandlerOutcome::SendTelegram`] instead of calling a send function,
//! which keeps the at-most-one-in-flight rule inside the state machine.

use crate::protocol::constants::StatusCode;
use crate::error::Result;
use std::time::Duration;

/// Why the tunnel lost (or failed to establish) its connection.
///
/// Delivered to [`TunnelHandler::on_disconnect`]; the handler answers
/// with a [`Reconnect`] policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// CONNECT_RESPONSE carried an error status or never arrived
    ConnectResponse(ErrorInfo),
    /// Heartbeat gave up after three failed CONNECTIONSTATE exchanges
    ConnectionstateResponse(ErrorInfo),
    /// TUNNELLING_ACK carried an error status or retransmission gave up
    TunnellingAck(ErrorInfo),
    /// The server sent a DISCONNECT_REQUEST
    Requested,
}

/// What went wrong with a request/response exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorInfo {
    /// The peer answered with this error status
    Status(StatusCode),
    /// No answer arrived in time
    Timeout,
}

/// Return value of the non-disconnect callbacks
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HandlerOutcome {
    /// Keep going
    #[default]
    Continue,
    /// Send this encoded cEMI telegram through the tunnel.
    ///
    /// Silently dropped (with a log notice) while another telegram is
    /// still awaiting its ack.
    SendTelegram(Vec<u8>),
    /// Stop the tunnel permanently
    Stop,
}

/// Return value of [`TunnelHandler::on_disconnect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconnect {
    /// Reconnect after waiting this long (zero = immediately)
    After(Duration),
    /// Stop the tunnel permanently
    Stop,
}

impl Reconnect {
    /// A conservative default backoff for connect failures
    pub const fn default_backoff() -> Self {
        Self::After(Duration::from_secs(3))
    }
}

/// Callbacks a tunnel user implements.
///
/// Every method has a default, so a handler only overrides what it needs.
///
/// # Examples
///
/// ```
/// use knx_tunnel::tunnel::{HandlerOutcome, TunnelHandler};
///
/// struct Logger;
///
/// impl TunnelHandler for Logger {
///     type Message = ();
///
///     fn on_telegram(&mut self, cemi: &[u8]) -> HandlerOutcome {
///         println!("telegram: {:02X?}", cemi);
///         HandlerOutcome::Continue
///     }
/// }
/// ```
pub trait TunnelHandler: Send + 'static {
    /// Messages deliverable through
    /// [`TunnelHandle::cast`](crate::tunnel::TunnelHandle::cast)
    type Message: Send + 'static;

    /// Called once before the first connection attempt.
    ///
    /// An error here aborts the start and is returned from
    /// [`Tunnel::start`](crate::tunnel::Tunnel::start).
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// The tunnel reached CONNECTED
    fn on_connect(&mut self) -> HandlerOutcome {
        HandlerOutcome::Continue
    }

    /// The tunnel lost its connection; decide whether and when to retry
    fn on_disconnect(&mut self, reason: &DisconnectReason) -> Reconnect {
        log::info!("tunnel disconnected: {:?}", reason);
        Reconnect::default_backoff()
    }

    /// A telegram arrived (raw cEMI bytes, in receive order, duplicates
    /// already suppressed)
    fn on_telegram(&mut self, cemi: &[u8]) -> HandlerOutcome {
        let _ = cemi;
        HandlerOutcome::Continue
    }

    /// The server acknowledged the outstanding outbound telegram
    fn on_telegram_ack(&mut self) -> HandlerOutcome {
        HandlerOutcome::Continue
    }

    /// A user message arrived through the tunnel handle
    fn on_message(&mut self, message: Self::Message) -> HandlerOutcome {
        let _ = message;
        HandlerOutcome::Continue
    }
}
