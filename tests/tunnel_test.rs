//! End-to-end tunnel scenarios over mock transports.
//!
//! Each test plays the server side of the protocol through a pair of
//! [`MockHandle`]s while the tunnel task runs for real. The tokio clock
//! starts paused, so heartbeat intervals and retransmission timeouts are
//! exercised with `tokio::time::advance` instead of wall-clock waits.

use knx_tunnel::net::{MockHandle, MockTransport};
use knx_tunnel::protocol::constants::StatusCode;
use knx_tunnel::protocol::frame::{Hpai, TunnelCrd};
use knx_tunnel::protocol::services::{
    ConnectResponse, ConnectionHeader, ConnectionstateResponse, DisconnectRequest,
    DisconnectResponse, ServiceFrame, TunnellingAck, TunnellingRequest,
};
use knx_tunnel::tunnel::{
    DisconnectReason, ErrorInfo, HandlerOutcome, Reconnect, Tunnel, TunnelConfig, TunnelHandle,
    TunnelHandler,
};
use std::net::SocketAddrV4;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::advance;

const CHANNEL: u8 = 21;

fn server_control() -> SocketAddrV4 {
    SocketAddrV4::new([192, 168, 1, 10].into(), 3671)
}

fn server_data() -> SocketAddrV4 {
    SocketAddrV4::new([192, 168, 1, 10].into(), 3672)
}

fn test_config() -> TunnelConfig {
    TunnelConfig {
        server_ip: [192, 168, 1, 10].into(),
        ..TunnelConfig::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Connected,
    Disconnected(DisconnectReason),
    Telegram(Vec<u8>),
    Ack,
}

/// Handler that records every callback and executes cast outcomes
struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    backoff: Reconnect,
}

impl TunnelHandler for Recorder {
    type Message = HandlerOutcome;

    fn on_connect(&mut self) -> HandlerOutcome {
        self.events.lock().unwrap().push(Event::Connected);
        HandlerOutcome::Continue
    }

    fn on_disconnect(&mut self, reason: &DisconnectReason) -> Reconnect {
        self.events.lock().unwrap().push(Event::Disconnected(*reason));
        self.backoff
    }

    fn on_telegram(&mut self, cemi: &[u8]) -> HandlerOutcome {
        self.events.lock().unwrap().push(Event::Telegram(cemi.to_vec()));
        HandlerOutcome::Continue
    }

    fn on_telegram_ack(&mut self) -> HandlerOutcome {
        self.events.lock().unwrap().push(Event::Ack);
        HandlerOutcome::Continue
    }

    fn on_message(&mut self, message: HandlerOutcome) -> HandlerOutcome {
        message
    }
}

struct Harness {
    tunnel: TunnelHandle<HandlerOutcome>,
    control: MockHandle,
    data: MockHandle,
    events: Arc<Mutex<Vec<Event>>>,
}

impl Harness {
    fn start(backoff: Reconnect) -> Self {
        let (control, control_handle) =
            MockTransport::new(SocketAddrV4::new([127, 0, 0, 1].into(), 50001));
        let (data, data_handle) =
            MockTransport::new(SocketAddrV4::new([127, 0, 0, 1].into(), 50002));

        let events = Arc::new(Mutex::new(Vec::new()));
        let recorder = Recorder {
            events: events.clone(),
            backoff,
        };

        let tunnel =
            Tunnel::start_with_transports(recorder, test_config(), control, data).unwrap();

        Self {
            tunnel,
            control: control_handle,
            data: data_handle,
            events,
        }
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Answer the pending CONNECT_REQUEST and wait for CONNECTED
    async fn accept_connection(&self) {
        self.control.wait_for_sent(1).await;
        let (request, dest) = self.control.next_sent().unwrap();
        assert_eq!(dest, server_control());
        assert_connect_request(&request);

        self.control.inject(&connect_response_ok(), server_control());
        settle().await;
        assert!(self.events().contains(&Event::Connected));
    }
}

/// Let the tunnel task process everything already queued
async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

fn encode_frame(frame: &ServiceFrame<'_>) -> Vec<u8> {
    let mut buf = [0u8; 512];
    let len = frame.encode(&mut buf).unwrap();
    buf[..len].to_vec()
}

fn connect_response_ok() -> Vec<u8> {
    encode_frame(&ServiceFrame::ConnectResponse(ConnectResponse::ok(
        CHANNEL,
        Hpai::from(server_data()),
        TunnelCrd::new("1.1.100".parse().unwrap()),
    )))
}

fn tunnelling_request(seq: u8, cemi: &[u8]) -> Vec<u8> {
    encode_frame(&ServiceFrame::TunnellingRequest(TunnellingRequest::new(
        ConnectionHeader::new(CHANNEL, seq),
        cemi,
    )))
}

fn tunnelling_ack(seq: u8) -> Vec<u8> {
    encode_frame(&ServiceFrame::TunnellingAck(TunnellingAck::new(
        ConnectionHeader::new(CHANNEL, seq),
        StatusCode::NoError,
    )))
}

fn service_of(frame: &[u8]) -> u16 {
    u16::from_be_bytes([frame[2], frame[3]])
}

fn assert_connect_request(frame: &[u8]) {
    assert_eq!(service_of(frame), 0x0205);
    // Control HPAI advertises 127.0.0.1:50001, data HPAI 127.0.0.1:50002
    assert_eq!(&frame[6..14], &[0x08, 0x01, 127, 0, 0, 1, 0xC3, 0x51]);
    assert_eq!(&frame[14..22], &[0x08, 0x01, 127, 0, 0, 1, 0xC3, 0x52]);
    // Tunnel CRI, link layer
    assert_eq!(&frame[22..26], &[0x04, 0x04, 0x02, 0x00]);
}

fn sample_cemi(value: u8) -> Vec<u8> {
    vec![
        0x29, 0x00, 0xBC, 0xE0, 0x11, 0x01, 0x0A, 0x03, 0x01, 0x00, 0x80 | (value & 0x3F),
    ]
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_connect_handshake() {
    let harness = Harness::start(Reconnect::After(Duration::ZERO));
    harness.accept_connection().await;
    assert_eq!(harness.events(), vec![Event::Connected]);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_exchange_keeps_connection() {
    let harness = Harness::start(Reconnect::After(Duration::ZERO));
    harness.accept_connection().await;

    for _ in 0..2 {
        // The heartbeat goes out once the 60 s interval elapses
        advance(Duration::from_secs(61)).await;
        settle().await;
        let (heartbeat, _) = harness.control.next_sent().unwrap();
        assert_eq!(service_of(&heartbeat), 0x0207);
        assert_eq!(heartbeat[6], CHANNEL);

        harness.control.inject(
            &encode_frame(&ServiceFrame::ConnectionstateResponse(
                ConnectionstateResponse::new(CHANNEL, StatusCode::NoError),
            )),
            server_control(),
        );
        settle().await;
    }

    // Still connected, no disconnects reported
    assert_eq!(harness.events(), vec![Event::Connected]);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_timeouts_force_reconnect() {
    let harness = Harness::start(Reconnect::After(Duration::ZERO));
    harness.accept_connection().await;

    // Heartbeat fires, then three unanswered CONNECTIONSTATE_REQUESTs
    advance(Duration::from_secs(61)).await;
    settle().await;
    for _ in 0..2 {
        advance(Duration::from_secs(10)).await;
        settle().await;
    }
    for _ in 0..3 {
        let (frame, _) = harness.control.next_sent().unwrap();
        assert_eq!(service_of(&frame), 0x0207);
    }

    // The third timeout gives up and tears the channel down
    advance(Duration::from_secs(10)).await;
    settle().await;
    let (disconnect, _) = harness.control.next_sent().unwrap();
    assert_eq!(service_of(&disconnect), 0x0209);

    harness.control.inject(
        &encode_frame(&ServiceFrame::DisconnectResponse(DisconnectResponse::new(
            CHANNEL,
            StatusCode::NoError,
        ))),
        server_control(),
    );
    settle().await;

    assert!(harness.events().contains(&Event::Disconnected(
        DisconnectReason::ConnectionstateResponse(ErrorInfo::Timeout)
    )));

    // Zero backoff: the reconnect attempt follows immediately
    settle().await;
    let (reconnect, _) = harness.control.next_sent().unwrap();
    assert_eq!(service_of(&reconnect), 0x0205);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_telegram_acked_once_delivered_once() {
    let harness = Harness::start(Reconnect::After(Duration::ZERO));
    harness.accept_connection().await;

    let cemi = sample_cemi(1);
    harness.data.inject(&tunnelling_request(0, &cemi), server_data());
    harness.data.inject(&tunnelling_request(0, &cemi), server_data());
    harness.data.wait_for_sent(2).await;

    // Two acks went out, both for sequence 0
    for _ in 0..2 {
        let (ack, dest) = harness.data.next_sent().unwrap();
        assert_eq!(service_of(&ack), 0x0421);
        assert_eq!(ack[8], 0);
        assert_eq!(ack[10], 0x00);
        assert_eq!(dest, server_data());
    }

    // But the handler saw the telegram exactly once
    let telegrams: Vec<_> = harness
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::Telegram(_)))
        .collect();
    assert_eq!(telegrams, vec![Event::Telegram(cemi)]);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_telegram_not_acked() {
    let harness = Harness::start(Reconnect::After(Duration::ZERO));
    harness.accept_connection().await;

    harness
        .data
        .inject(&tunnelling_request(4, &sample_cemi(9)), server_data());
    settle().await;

    assert_eq!(harness.data.sent_count(), 0);
    assert_eq!(harness.events(), vec![Event::Connected]);

    // The expected sequence still flows afterwards
    let cemi = sample_cemi(2);
    harness.data.inject(&tunnelling_request(0, &cemi), server_data());
    harness.data.wait_for_sent(1).await;
    assert!(harness.events().contains(&Event::Telegram(cemi)));
}

#[tokio::test(start_paused = true)]
async fn test_single_request_in_flight() {
    let harness = Harness::start(Reconnect::After(Duration::ZERO));
    harness.accept_connection().await;

    harness
        .tunnel
        .cast(HandlerOutcome::SendTelegram(sample_cemi(1)))
        .unwrap();
    harness
        .tunnel
        .cast(HandlerOutcome::SendTelegram(sample_cemi(2)))
        .unwrap();
    settle().await;

    // The second telegram was dropped: one request, sequence 0
    assert_eq!(harness.data.sent_count(), 1);
    let (request, _) = harness.data.next_sent().unwrap();
    assert_eq!(service_of(&request), 0x0420);
    assert_eq!(request[8], 0);

    // Ack it; the next send uses sequence 1
    harness.data.inject(&tunnelling_ack(0), server_data());
    settle().await;
    assert!(harness.events().contains(&Event::Ack));

    harness
        .tunnel
        .cast(HandlerOutcome::SendTelegram(sample_cemi(3)))
        .unwrap();
    harness.data.wait_for_sent(2).await;
    let (request, _) = harness.data.next_sent().unwrap();
    assert_eq!(request[8], 1);
}

#[tokio::test(start_paused = true)]
async fn test_ack_timeout_resends_then_disconnects() {
    let harness = Harness::start(Reconnect::After(Duration::ZERO));
    harness.accept_connection().await;

    harness
        .tunnel
        .cast(HandlerOutcome::SendTelegram(sample_cemi(1)))
        .unwrap();
    harness.data.wait_for_sent(1).await;
    let (original, _) = harness.data.next_sent().unwrap();

    // First ack timeout: identical retransmission
    advance(Duration::from_secs(2)).await;
    settle().await;
    let (resend, _) = harness.data.next_sent().unwrap();
    assert_eq!(resend, original);

    // Second ack timeout: one more resend, then DISCONNECT_REQUEST
    advance(Duration::from_secs(2)).await;
    settle().await;
    let (resend, _) = harness.data.next_sent().unwrap();
    assert_eq!(resend, original);

    harness.control.next_sent().unwrap(); // the CONNECT_REQUEST
    let (disconnect, _) = harness.control.next_sent().unwrap();
    assert_eq!(service_of(&disconnect), 0x0209);

    harness.control.inject(
        &encode_frame(&ServiceFrame::DisconnectResponse(DisconnectResponse::new(
            CHANNEL,
            StatusCode::NoError,
        ))),
        server_control(),
    );
    settle().await;

    assert!(harness.events().contains(&Event::Disconnected(
        DisconnectReason::TunnellingAck(ErrorInfo::Timeout)
    )));
}

#[tokio::test(start_paused = true)]
async fn test_server_disconnect_triggers_backoff_reconnect() {
    let harness = Harness::start(Reconnect::After(Duration::from_secs(2)));
    harness.accept_connection().await;

    harness.control.inject(
        &encode_frame(&ServiceFrame::DisconnectRequest(DisconnectRequest::new(
            CHANNEL,
            Hpai::from(server_control()),
        ))),
        server_control(),
    );
    settle().await;

    // The client confirmed the teardown
    let (response, _) = harness.control.next_sent().unwrap();
    assert_eq!(service_of(&response), 0x020A);
    assert_eq!(&response[6..8], &[CHANNEL, 0x00]);
    assert!(harness
        .events()
        .contains(&Event::Disconnected(DisconnectReason::Requested)));

    // No reconnect before the backoff elapses
    advance(Duration::from_millis(1500)).await;
    settle().await;
    assert!(harness.control.next_sent().is_none());

    // After it, a fresh CONNECT_REQUEST
    advance(Duration::from_millis(600)).await;
    settle().await;
    let (reconnect, _) = harness.control.next_sent().unwrap();
    assert_eq!(service_of(&reconnect), 0x0205);
}

#[tokio::test(start_paused = true)]
async fn test_connect_refusal_reported_with_status() {
    let harness = Harness::start(Reconnect::Stop);
    harness.control.wait_for_sent(1).await;

    harness.control.inject(
        &encode_frame(&ServiceFrame::ConnectResponse(ConnectResponse::error(
            StatusCode::NoMoreConnections,
        ))),
        server_control(),
    );
    settle().await;

    assert_eq!(
        harness.events(),
        vec![Event::Disconnected(DisconnectReason::ConnectResponse(
            ErrorInfo::Status(StatusCode::NoMoreConnections)
        ))]
    );

    // Reconnect::Stop ended the task
    settle().await;
    assert!(harness.tunnel.stop().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_connect_timeout_reported() {
    let harness = Harness::start(Reconnect::Stop);
    harness.control.wait_for_sent(1).await;

    // Nobody answers within the 10 s window
    advance(Duration::from_secs(11)).await;
    settle().await;

    assert_eq!(
        harness.events(),
        vec![Event::Disconnected(DisconnectReason::ConnectResponse(
            ErrorInfo::Timeout
        ))]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_runs_disconnect_exchange() {
    let harness = Harness::start(Reconnect::After(Duration::ZERO));
    harness.accept_connection().await;

    harness.tunnel.stop().unwrap();
    settle().await;

    let (disconnect, _) = harness.control.next_sent().unwrap();
    assert_eq!(service_of(&disconnect), 0x0209);

    harness.control.inject(
        &encode_frame(&ServiceFrame::DisconnectResponse(DisconnectResponse::new(
            CHANNEL,
            StatusCode::NoError,
        ))),
        server_control(),
    );
    settle().await;

    // Task gone: the handle is dead, and no disconnect callback fired
    assert!(harness.tunnel.stop().is_err());
    assert_eq!(harness.events(), vec![Event::Connected]);
}

#[tokio::test(start_paused = true)]
async fn test_telegram_roundtrip_through_handler() {
    let harness = Harness::start(Reconnect::After(Duration::ZERO));
    harness.accept_connection().await;

    // Server pushes an indication; the client acks and surfaces it
    let cemi = sample_cemi(1);
    harness.data.inject(&tunnelling_request(0, &cemi), server_data());
    harness.data.wait_for_sent(1).await;

    // The surfaced bytes decode with the telegram codec
    let Event::Telegram(bytes) = harness
        .events()
        .into_iter()
        .find(|e| matches!(e, Event::Telegram(_)))
        .unwrap()
    else {
        unreachable!()
    };
    let telegram = knx_tunnel::protocol::cemi::Telegram::decode(&bytes).unwrap();
    assert_eq!(telegram.destination.to_string(), "1/2/3");
}
