//! The tunnel state machine.
//!
//! Pure protocol logic with no sockets, clocks or callbacks: inputs are
//! decoded-datagram and timer-fired events, outputs are [`Action`]s the
//! driver executes. Keeping the machine free of I/O makes every protocol
//! rule (sequence handling, duplicate suppression, bounded retransmission,
//! heartbeat failure counting) testable without a network or a runtime.
//!
//! ## States
//!
//! ```text
//! INIT → CONNECTING → CONNECTED ⇄ HEARTBEAT_WAIT
//!             ↑            │
//!             │            ▼
//!             └──── DISCONNECTING → DISCONNECTED
//! ```
//!
//! Timers carry generation tokens: arming a slot mints a fresh token,
//! cancelling nulls it, and a timer event whose token no longer matches
//! is a no-op. A late delivery of a cancelled timer therefore cannot
//! perturb the state machine.

use crate::protocol::constants::StatusCode;
use crate::protocol::frame::Hpai;
use crate::protocol::services::{
    ConnectRequest, ConnectResponse, ConnectionHeader, ConnectionstateRequest,
    ConnectionstateResponse, DisconnectRequest, DisconnectResponse, ServiceFrame, TunnellingAck,
    TunnellingRequest,
};
use crate::tunnel::config::TunnelConfig;
use crate::tunnel::handler::{DisconnectReason, ErrorInfo};
use std::net::SocketAddrV4;
use std::time::Duration;

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Init,
    Connecting,
    Connected,
    HeartbeatWait,
    Disconnecting,
    Disconnected,
}

/// The five re-armable timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerSlot {
    Heartbeat = 0,
    ConnectResponse = 1,
    ConnectionstateResponse = 2,
    DisconnectResponse = 3,
    Ack = 4,
}

impl TimerSlot {
    pub(crate) const COUNT: usize = 5;

    const ALL: [TimerSlot; Self::COUNT] = [
        TimerSlot::Heartbeat,
        TimerSlot::ConnectResponse,
        TimerSlot::ConnectionstateResponse,
        TimerSlot::DisconnectResponse,
        TimerSlot::Ack,
    ];
}

/// Instructions for the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    /// Send these bytes on the control socket
    SendControl(Vec<u8>),
    /// Send these bytes on the data socket
    SendData(Vec<u8>),
    /// Arm a timer; a later fire must echo the token back
    Arm {
        slot: TimerSlot,
        token: u32,
        duration: Duration,
    },
    /// Disarm a timer
    Cancel(TimerSlot),
    /// Tell the handler the tunnel is up
    Connected,
    /// Tell the handler the tunnel is down; the driver applies the
    /// returned backoff and reconnects
    Disconnected(DisconnectReason),
    /// Deliver a received telegram to the handler
    Telegram(Vec<u8>),
    /// Tell the handler its outbound telegram was acknowledged
    TelegramAck,
    /// A user-requested stop completed; the driver exits
    Stopped,
}

/// Heartbeat attempts before giving up on the connection
const MAX_HEARTBEAT_FAILURES: u8 = 3;

pub(crate) struct TunnelMachine {
    config: TunnelConfig,
    control_local: SocketAddrV4,
    data_local: SocketAddrV4,

    mode: Mode,
    channel_id: Option<u8>,
    /// Sequence for the next outbound TUNNELLING_REQUEST
    local_seq: u8,
    /// Expected sequence of the next inbound TUNNELLING_REQUEST
    remote_seq: u8,
    heartbeat_failures: u8,
    ack_failures: u8,
    /// The one in-flight encoded TUNNELLING_REQUEST, kept for resends
    pending_request: Option<Vec<u8>>,
    /// Reason to report once the disconnect exchange completes
    pending_reason: Option<DisconnectReason>,
    /// Server data endpoint learned from CONNECT_RESPONSE
    server_data: Option<SocketAddrV4>,

    /// Current token per timer slot; `None` = disarmed
    timers: [Option<u32>; TimerSlot::COUNT],
    next_token: u32,
}

impl TunnelMachine {
    pub(crate) fn new(
        config: TunnelConfig,
        control_local: SocketAddrV4,
        data_local: SocketAddrV4,
    ) -> Self {
        Self {
            config,
            control_local,
            data_local,
            mode: Mode::Init,
            channel_id: None,
            local_seq: 0,
            remote_seq: 0,
            heartbeat_failures: 0,
            ack_failures: 0,
            pending_request: None,
            pending_reason: None,
            server_data: None,
            timers: [None; TimerSlot::COUNT],
            next_token: 0,
        }
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    /// Destination for data-socket sends.
    ///
    /// Learned from the CONNECT_RESPONSE data endpoint; a NAT-style
    /// unspecified endpoint falls back to the server control address.
    pub(crate) fn data_destination(&self) -> SocketAddrV4 {
        match self.server_data {
            Some(addr) if !addr.ip().is_unspecified() && addr.port() != 0 => addr,
            _ => self.config.server_control_addr(),
        }
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Begin a connection attempt (from INIT or after a disconnect)
    pub(crate) fn connect(&mut self, out: &mut Vec<Action>) {
        debug_assert!(matches!(self.mode, Mode::Init | Mode::Disconnected));

        let request = ConnectRequest::new(
            Hpai::from(self.control_local),
            Hpai::from(self.data_local),
        );
        log::debug!(
            "connecting to {} (control {}, data {})",
            self.config.server_control_addr(),
            self.control_local,
            self.data_local
        );

        self.mode = Mode::Connecting;
        out.push(Action::SendControl(encode_connect(&request)));
        self.arm(TimerSlot::ConnectResponse, out);
    }

    /// A datagram arrived on either socket
    pub(crate) fn handle_datagram(&mut self, data: &[u8], out: &mut Vec<Action>) {
        let frame = match ServiceFrame::decode(data) {
            Ok(frame) => frame,
            Err(err) => {
                // Malformed input never perturbs the state machine
                log::warn!("ignoring malformed datagram ({} bytes): {}", data.len(), err);
                return;
            }
        };

        match frame {
            ServiceFrame::ConnectResponse(response) => self.on_connect_response(&response, out),
            ServiceFrame::ConnectionstateResponse(response) => {
                self.on_connectionstate_response(&response, out)
            }
            ServiceFrame::DisconnectRequest(request) => self.on_disconnect_request(&request, out),
            ServiceFrame::DisconnectResponse(response) => {
                self.on_disconnect_response(&response, out)
            }
            ServiceFrame::TunnellingRequest(request) => self.on_tunnelling_request(&request, out),
            ServiceFrame::TunnellingAck(ack) => self.on_tunnelling_ack(&ack, out),
            ServiceFrame::ConnectRequest(_) | ServiceFrame::ConnectionstateRequest(_) => {
                log::warn!(
                    "ignoring server-bound frame {:?} sent to a client",
                    frame.service_type()
                );
            }
        }
    }

    /// A timer fired. Stale tokens (cancelled or re-armed slots) are
    /// dropped here.
    pub(crate) fn handle_timeout(&mut self, slot: TimerSlot, token: u32, out: &mut Vec<Action>) {
        if self.timers[slot as usize] != Some(token) {
            log::trace!("dropping stale {:?} timer (token {})", slot, token);
            return;
        }
        self.timers[slot as usize] = None;

        match slot {
            TimerSlot::Heartbeat => {
                if self.mode == Mode::Connected {
                    self.mode = Mode::HeartbeatWait;
                    self.send_connectionstate(out);
                }
            }
            TimerSlot::ConnectResponse => {
                if self.mode == Mode::Connecting {
                    log::warn!("CONNECT_RESPONSE timed out");
                    self.mode = Mode::Disconnected;
                    out.push(Action::Disconnected(DisconnectReason::ConnectResponse(
                        ErrorInfo::Timeout,
                    )));
                }
            }
            TimerSlot::ConnectionstateResponse => {
                if self.mode == Mode::HeartbeatWait {
                    self.on_heartbeat_failure(ErrorInfo::Timeout, out);
                }
            }
            TimerSlot::DisconnectResponse => {
                if self.mode == Mode::Disconnecting {
                    log::debug!("DISCONNECT_RESPONSE timed out, closing channel anyway");
                    self.finish_disconnect(out);
                }
            }
            TimerSlot::Ack => self.on_ack_timeout(out),
        }
    }

    /// Queue a telegram for transmission.
    ///
    /// At most one TUNNELLING_REQUEST is in flight; further telegrams are
    /// dropped with a log notice until the ack arrives.
    pub(crate) fn send_telegram(&mut self, cemi: &[u8], out: &mut Vec<Action>) {
        let Some(channel_id) = self.channel_id else {
            log::warn!("dropping telegram: tunnel not connected");
            return;
        };
        if !matches!(self.mode, Mode::Connected | Mode::HeartbeatWait) {
            log::warn!("dropping telegram: tunnel is {:?}", self.mode);
            return;
        }
        if self.pending_request.is_some() {
            log::info!("dropping telegram: a request is already awaiting its ack");
            return;
        }

        let request = TunnellingRequest::new(
            ConnectionHeader::new(channel_id, self.local_seq),
            cemi,
        );
        let mut frame = vec![0u8; request.size()];
        match request.encode(&mut frame) {
            Ok(len) => frame.truncate(len),
            Err(err) => {
                log::warn!("dropping unencodable telegram: {}", err);
                return;
            }
        }

        log::debug!("sending telegram seq {} ({} bytes)", self.local_seq, frame.len());
        out.push(Action::SendData(frame.clone()));
        self.pending_request = Some(frame);
        self.ack_failures = 0;
        self.arm(TimerSlot::Ack, out);
    }

    /// User-requested stop: run the disconnect exchange, then report
    /// [`Action::Stopped`] instead of a disconnect callback.
    pub(crate) fn shutdown(&mut self, out: &mut Vec<Action>) {
        match self.mode {
            Mode::Connected | Mode::HeartbeatWait => {
                self.begin_disconnect(None, out);
            }
            Mode::Disconnecting => {
                // Already tearing down; just silence the callback
                self.pending_reason = None;
            }
            _ => {
                self.cancel_all(out);
                self.mode = Mode::Disconnected;
                out.push(Action::Stopped);
            }
        }
    }

    // =========================================================================
    // Frame handlers
    // =========================================================================

    fn on_connect_response(&mut self, response: &ConnectResponse, out: &mut Vec<Action>) {
        if self.mode != Mode::Connecting {
            log::debug!("ignoring CONNECT_RESPONSE in {:?}", self.mode);
            return;
        }
        self.cancel(TimerSlot::ConnectResponse, out);

        match (&response.endpoint, response.status) {
            (Some((data_endpoint, crd)), StatusCode::NoError) => {
                log::info!(
                    "tunnel established: channel {}, bus address {}, data endpoint {}",
                    response.channel_id,
                    crd.address,
                    data_endpoint.socket_addr()
                );
                self.channel_id = Some(response.channel_id);
                self.server_data = Some(data_endpoint.socket_addr());
                self.local_seq = 0;
                self.remote_seq = 0;
                self.heartbeat_failures = 0;
                self.ack_failures = 0;
                self.pending_request = None;
                self.mode = Mode::Connected;
                self.arm(TimerSlot::Heartbeat, out);
                out.push(Action::Connected);
            }
            _ => {
                log::warn!("connect refused: {}", response.status.name());
                self.mode = Mode::Disconnected;
                out.push(Action::Disconnected(DisconnectReason::ConnectResponse(
                    ErrorInfo::Status(response.status),
                )));
            }
        }
    }

    fn on_connectionstate_response(
        &mut self,
        response: &ConnectionstateResponse,
        out: &mut Vec<Action>,
    ) {
        if self.mode != Mode::HeartbeatWait || self.channel_id != Some(response.channel_id) {
            log::debug!("ignoring CONNECTIONSTATE_RESPONSE in {:?}", self.mode);
            return;
        }
        self.cancel(TimerSlot::ConnectionstateResponse, out);

        if response.is_ok() {
            self.heartbeat_failures = 0;
            self.mode = Mode::Connected;
            self.arm(TimerSlot::Heartbeat, out);
        } else {
            log::warn!("heartbeat answered with {}", response.status.name());
            self.on_heartbeat_failure(ErrorInfo::Status(response.status), out);
        }
    }

    fn on_disconnect_request(&mut self, request: &DisconnectRequest, out: &mut Vec<Action>) {
        if self.channel_id != Some(request.channel_id) {
            log::debug!(
                "ignoring DISCONNECT_REQUEST for foreign channel {}",
                request.channel_id
            );
            return;
        }

        log::info!("server requested disconnect of channel {}", request.channel_id);
        self.cancel_all(out);

        let response = DisconnectResponse::new(request.channel_id, StatusCode::NoError);
        let mut frame = [0u8; DisconnectResponse::SIZE];
        // Infallible: the buffer is sized for the frame
        let len = response.encode(&mut frame).unwrap_or(0);
        out.push(Action::SendControl(frame[..len].to_vec()));

        self.channel_id = None;
        self.pending_request = None;
        self.pending_reason = None;
        self.mode = Mode::Disconnected;
        out.push(Action::Disconnected(DisconnectReason::Requested));
    }

    fn on_disconnect_response(&mut self, response: &DisconnectResponse, out: &mut Vec<Action>) {
        if self.mode != Mode::Disconnecting || self.channel_id != Some(response.channel_id) {
            log::debug!("ignoring unsolicited DISCONNECT_RESPONSE");
            return;
        }
        self.finish_disconnect(out);
    }

    fn on_tunnelling_request(&mut self, request: &TunnellingRequest<'_>, out: &mut Vec<Action>) {
        if !matches!(self.mode, Mode::Connected | Mode::HeartbeatWait)
            || self.channel_id != Some(request.connection_header.channel_id)
        {
            log::debug!("ignoring TUNNELLING_REQUEST outside an open channel");
            return;
        }

        let seq = request.connection_header.sequence_counter;
        if seq == self.remote_seq {
            self.remote_seq = self.remote_seq.wrapping_add(1);
            out.push(Action::Telegram(request.cemi.to_vec()));
            self.send_ack(seq, out);
        } else if seq == self.remote_seq.wrapping_sub(1) {
            // Our ack got lost; re-ack without re-delivering
            log::debug!("re-acking duplicate telegram seq {}", seq);
            self.send_ack(seq, out);
        } else {
            log::debug!(
                "dropping out-of-order telegram seq {} (expected {})",
                seq,
                self.remote_seq
            );
        }
    }

    fn on_tunnelling_ack(&mut self, ack: &TunnellingAck, out: &mut Vec<Action>) {
        if self.channel_id != Some(ack.connection_header.channel_id) {
            log::debug!("ignoring TUNNELLING_ACK for foreign channel");
            return;
        }

        if !ack.is_ok() {
            if let Some(frame) = self.pending_request.clone() {
                log::warn!("TUNNELLING_ACK error {}", ack.status.name());
                out.push(Action::SendData(frame));
                self.begin_disconnect(
                    Some(DisconnectReason::TunnellingAck(ErrorInfo::Status(ack.status))),
                    out,
                );
            }
            return;
        }

        if self.pending_request.is_some() && ack.connection_header.sequence_counter == self.local_seq
        {
            self.cancel(TimerSlot::Ack, out);
            self.local_seq = self.local_seq.wrapping_add(1);
            self.pending_request = None;
            self.ack_failures = 0;
            out.push(Action::TelegramAck);
        } else {
            log::debug!(
                "discarding stale TUNNELLING_ACK seq {}",
                ack.connection_header.sequence_counter
            );
        }
    }

    // =========================================================================
    // Internal transitions
    // =========================================================================

    fn send_connectionstate(&mut self, out: &mut Vec<Action>) {
        let Some(channel_id) = self.channel_id else {
            return;
        };

        let request = ConnectionstateRequest::new(channel_id, Hpai::from(self.control_local));
        let mut frame = [0u8; ConnectionstateRequest::SIZE];
        let len = request.encode(&mut frame).unwrap_or(0);

        out.push(Action::SendControl(frame[..len].to_vec()));
        self.arm(TimerSlot::ConnectionstateResponse, out);
        // Incremented after the send so the first response resets a
        // healthy connection back to zero
        self.heartbeat_failures += 1;
    }

    fn on_heartbeat_failure(&mut self, info: ErrorInfo, out: &mut Vec<Action>) {
        if self.heartbeat_failures < MAX_HEARTBEAT_FAILURES {
            log::debug!(
                "heartbeat attempt {} failed ({:?}), retrying",
                self.heartbeat_failures,
                info
            );
            self.cancel(TimerSlot::ConnectionstateResponse, out);
            self.send_connectionstate(out);
        } else {
            log::warn!("heartbeat failed {} times, disconnecting", self.heartbeat_failures);
            self.begin_disconnect(
                Some(DisconnectReason::ConnectionstateResponse(info)),
                out,
            );
        }
    }

    fn on_ack_timeout(&mut self, out: &mut Vec<Action>) {
        let Some(frame) = self.pending_request.clone() else {
            return;
        };

        if self.ack_failures == 0 {
            log::debug!("TUNNELLING_ACK timed out, resending request");
            self.ack_failures = 1;
            out.push(Action::SendData(frame));
            self.arm(TimerSlot::Ack, out);
        } else {
            log::warn!("TUNNELLING_ACK timed out twice, disconnecting");
            out.push(Action::SendData(frame));
            self.begin_disconnect(
                Some(DisconnectReason::TunnellingAck(ErrorInfo::Timeout)),
                out,
            );
        }
    }

    fn begin_disconnect(&mut self, reason: Option<DisconnectReason>, out: &mut Vec<Action>) {
        let Some(channel_id) = self.channel_id else {
            // No channel to tear down; report directly
            self.cancel_all(out);
            self.mode = Mode::Disconnected;
            match reason {
                Some(reason) => out.push(Action::Disconnected(reason)),
                None => out.push(Action::Stopped),
            }
            return;
        };

        self.cancel_all(out);
        self.pending_reason = reason;
        self.mode = Mode::Disconnecting;

        let request = DisconnectRequest::new(channel_id, Hpai::from(self.control_local));
        let mut frame = [0u8; DisconnectRequest::SIZE];
        let len = request.encode(&mut frame).unwrap_or(0);
        out.push(Action::SendControl(frame[..len].to_vec()));
        self.arm(TimerSlot::DisconnectResponse, out);
    }

    fn finish_disconnect(&mut self, out: &mut Vec<Action>) {
        self.cancel_all(out);
        self.channel_id = None;
        self.pending_request = None;
        self.mode = Mode::Disconnected;

        match self.pending_reason.take() {
            Some(reason) => out.push(Action::Disconnected(reason)),
            None => out.push(Action::Stopped),
        }
    }

    fn send_ack(&mut self, seq: u8, out: &mut Vec<Action>) {
        let Some(channel_id) = self.channel_id else {
            return;
        };

        let ack = TunnellingAck::new(ConnectionHeader::new(channel_id, seq), StatusCode::NoError);
        let mut frame = [0u8; TunnellingAck::SIZE];
        let len = ack.encode(&mut frame).unwrap_or(0);
        out.push(Action::SendData(frame[..len].to_vec()));
    }

    // =========================================================================
    // Timer bookkeeping
    // =========================================================================

    fn arm(&mut self, slot: TimerSlot, out: &mut Vec<Action>) {
        self.next_token = self.next_token.wrapping_add(1);
        let token = self.next_token;
        self.timers[slot as usize] = Some(token);
        out.push(Action::Arm {
            slot,
            token,
            duration: self.timer_duration(slot),
        });
    }

    fn cancel(&mut self, slot: TimerSlot, out: &mut Vec<Action>) {
        if self.timers[slot as usize].take().is_some() {
            out.push(Action::Cancel(slot));
        }
    }

    fn cancel_all(&mut self, out: &mut Vec<Action>) {
        for slot in TimerSlot::ALL {
            self.cancel(slot, out);
        }
    }

    fn timer_duration(&self, slot: TimerSlot) -> Duration {
        match slot {
            TimerSlot::Heartbeat => self.config.heartbeat_interval,
            TimerSlot::ConnectResponse => self.config.connect_response_timeout,
            TimerSlot::ConnectionstateResponse => self.config.connectionstate_response_timeout,
            TimerSlot::DisconnectResponse => self.config.disconnect_response_timeout,
            TimerSlot::Ack => self.config.tunnelling_ack_timeout,
        }
    }
}

fn encode_connect(request: &ConnectRequest) -> Vec<u8> {
    let mut frame = [0u8; ConnectRequest::SIZE];
    let len = request.encode(&mut frame).unwrap_or(0);
    frame[..len].to_vec()
}
