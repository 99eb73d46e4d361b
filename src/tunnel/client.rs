//! The tunnel driver: sockets, timers and callback dispatch.
//!
//! One tokio task per tunnel serializes every event (datagrams on either
//! socket, timer expiries, reconnect backoff, user commands) through a
//! single `select!` loop, feeds it to the [`TunnelMachine`], then executes
//! the machine's actions: transmitting frames, re-arming timer deadlines
//! and invoking the [`TunnelHandler`] callbacks.
//!
//! ## Example
//!
//! ```rust,no_run
//! use knx_tunnel::tunnel::{HandlerOutcome, Tunnel, TunnelConfig, TunnelHandler};
//!
//! struct Printer;
//!
//! impl TunnelHandler for Printer {
//!     type Message = ();
//!
//!     fn on_telegram(&mut self, cemi: &[u8]) -> HandlerOutcome {
//!         println!("telegram: {:02X?}", cemi);
//!         HandlerOutcome::Continue
//!     }
//! }
//!
//! # async fn run() -> knx_tunnel::Result<()> {
//! let config = TunnelConfig {
//!     server_ip: [192, 168, 1, 10].into(),
//!     ..TunnelConfig::default()
//! };
//! let handle = Tunnel::start(Printer, config).await?;
//! // ... later:
//! handle.stop()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{KnxError, Result, TransportErrorKind};
use crate::net::{Transport, UdpTransport};
use crate::protocol::constants::MAX_FRAME_SIZE;
use crate::tunnel::config::TunnelConfig;
use crate::tunnel::handler::{HandlerOutcome, Reconnect, TunnelHandler};
use crate::tunnel::machine::{Action, TimerSlot, TunnelMachine};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Commands a [`TunnelHandle`] feeds into the driver
enum Command<M> {
    Cast(M),
    Stop,
}

/// Handle to a running tunnel.
///
/// Cloneable; dropping every handle leaves the tunnel running (it can
/// still be torn down by the server or a `Stop` outcome from a callback).
pub struct TunnelHandle<M> {
    tx: mpsc::UnboundedSender<Command<M>>,
}

impl<M> Clone for TunnelHandle<M> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<M> TunnelHandle<M> {
    /// Deliver a message to the handler's `on_message` callback.
    ///
    /// # Errors
    ///
    /// Returns a transport-closed error if the tunnel task has exited.
    pub fn cast(&self, message: M) -> Result<()> {
        self.tx
            .send(Command::Cast(message))
            .map_err(|_| KnxError::transport_closed())
    }

    /// Stop the tunnel: run the disconnect exchange, close the sockets
    /// and end the task.
    ///
    /// # Errors
    ///
    /// Returns a transport-closed error if the tunnel task has exited.
    pub fn stop(&self) -> Result<()> {
        self.tx
            .send(Command::Stop)
            .map_err(|_| KnxError::transport_closed())
    }
}

/// Entry points for running a tunnel
pub struct Tunnel;

impl Tunnel {
    /// Bind the control and data sockets and start the tunnel task.
    ///
    /// The handler's `init` runs synchronously here; its failure aborts
    /// the start. The returned handle feeds `cast`/`stop` into the
    /// running tunnel.
    ///
    /// # Errors
    ///
    /// Returns bind errors and whatever `init` reports.
    pub async fn start<H>(handler: H, config: TunnelConfig) -> Result<TunnelHandle<H::Message>>
    where
        H: TunnelHandler,
    {
        let control = UdpTransport::bind(config.local_ip, config.control_port).await?;
        let data = UdpTransport::bind(config.local_ip, config.data_port).await?;
        Self::start_with_transports(handler, config, control, data)
    }

    /// Start the tunnel task over caller-provided transports.
    ///
    /// This is the seam tests use to drive the tunnel over
    /// [`MockTransport`](crate::net::MockTransport)s; production code
    /// normally calls [`Tunnel::start`].
    ///
    /// # Errors
    ///
    /// Returns whatever the handler's `init` reports.
    pub fn start_with_transports<H, T>(
        mut handler: H,
        config: TunnelConfig,
        control: T,
        data: T,
    ) -> Result<TunnelHandle<H::Message>>
    where
        H: TunnelHandler,
        T: Transport + Send + 'static,
    {
        handler.init()?;

        let machine = TunnelMachine::new(config.clone(), control.local_addr()?, data.local_addr()?);
        let (tx, rx) = mpsc::unbounded_channel();

        let driver = Driver {
            config,
            machine,
            handler,
            control,
            data,
            commands: rx,
            commands_open: true,
            timers: [None; TimerSlot::COUNT],
            reconnect_at: None,
            stopping: false,
        };
        tokio::spawn(driver.run());

        Ok(TunnelHandle { tx })
    }
}

/// An armed timer deadline in the driver
type Deadline = (u32, Instant);

struct Driver<H: TunnelHandler, T: Transport> {
    config: TunnelConfig,
    machine: TunnelMachine,
    handler: H,
    control: T,
    data: T,
    commands: mpsc::UnboundedReceiver<Command<H::Message>>,
    commands_open: bool,
    timers: [Option<Deadline>; TimerSlot::COUNT],
    reconnect_at: Option<Instant>,
    stopping: bool,
}

impl<H, T> Driver<H, T>
where
    H: TunnelHandler,
    T: Transport + Send + 'static,
{
    async fn run(mut self) {
        let mut control_buf = [0u8; MAX_FRAME_SIZE];
        let mut data_buf = [0u8; MAX_FRAME_SIZE];
        let mut pending = Vec::new();

        self.machine.connect(&mut pending);
        if !self.execute(&mut pending).await {
            return;
        }

        loop {
            let timer = self.next_timer();
            let timer_at = timer.map_or_else(far_future, |(_, _, at)| at);
            let reconnect_at = self.reconnect_at.unwrap_or_else(far_future);

            tokio::select! {
                received = self.control.recv_from(&mut control_buf) => {
                    match received {
                        Ok((len, from)) => {
                            log::trace!("control datagram from {} ({} bytes)", from, len);
                            self.machine.handle_datagram(&control_buf[..len], &mut pending);
                        }
                        Err(err) => {
                            if !self.recoverable(err) {
                                return;
                            }
                        }
                    }
                }
                received = self.data.recv_from(&mut data_buf) => {
                    match received {
                        Ok((len, from)) => {
                            log::trace!("data datagram from {} ({} bytes)", from, len);
                            self.machine.handle_datagram(&data_buf[..len], &mut pending);
                        }
                        Err(err) => {
                            if !self.recoverable(err) {
                                return;
                            }
                        }
                    }
                }
                _ = tokio::time::sleep_until(timer_at), if timer.is_some() => {
                    let (slot, token, _) = timer.unwrap();
                    self.timers[slot as usize] = None;
                    self.machine.handle_timeout(slot, token, &mut pending);
                }
                _ = tokio::time::sleep_until(reconnect_at), if self.reconnect_at.is_some() => {
                    self.reconnect_at = None;
                    self.machine.connect(&mut pending);
                }
                command = self.commands.recv(), if self.commands_open => {
                    match command {
                        Some(Command::Cast(message)) => {
                            let outcome = self.handler.on_message(message);
                            self.apply_outcome(outcome, &mut pending);
                        }
                        Some(Command::Stop) => {
                            self.stopping = true;
                            self.reconnect_at = None;
                            self.machine.shutdown(&mut pending);
                        }
                        None => {
                            // Every handle dropped; keep the tunnel alive
                            self.commands_open = false;
                        }
                    }
                }
            }

            if !self.execute(&mut pending).await {
                return;
            }
        }
    }

    /// The earliest armed timer, if any
    fn next_timer(&self) -> Option<(TimerSlot, u32, Instant)> {
        const SLOTS: [TimerSlot; TimerSlot::COUNT] = [
            TimerSlot::Heartbeat,
            TimerSlot::ConnectResponse,
            TimerSlot::ConnectionstateResponse,
            TimerSlot::DisconnectResponse,
            TimerSlot::Ack,
        ];

        SLOTS
            .iter()
            .filter_map(|slot| {
                self.timers[*slot as usize].map(|(token, at)| (*slot, token, at))
            })
            .min_by_key(|(_, _, at)| *at)
    }

    /// Run the machine's queued actions. Returns `false` when the driver
    /// must exit.
    async fn execute(&mut self, pending: &mut Vec<Action>) -> bool {
        let mut queue: VecDeque<Action> = pending.drain(..).collect();

        while let Some(action) = queue.pop_front() {
            let mut produced = Vec::new();

            match action {
                Action::SendControl(bytes) => {
                    let dest = self.config.server_control_addr();
                    if let Err(err) = self.control.send_to(&bytes, dest).await {
                        log::error!("fatal control-socket send error: {}", err);
                        return false;
                    }
                }
                Action::SendData(bytes) => {
                    let dest = self.machine.data_destination();
                    if let Err(err) = self.data.send_to(&bytes, dest).await {
                        log::error!("fatal data-socket send error: {}", err);
                        return false;
                    }
                }
                Action::Arm { slot, token, duration } => {
                    self.timers[slot as usize] = Some((token, Instant::now() + duration));
                }
                Action::Cancel(slot) => {
                    self.timers[slot as usize] = None;
                }
                Action::Connected => {
                    let outcome = self.handler.on_connect();
                    self.apply_outcome(outcome, &mut produced);
                }
                Action::Disconnected(reason) => {
                    if self.stopping {
                        log::debug!("connection lost while stopping, exiting");
                        return false;
                    }
                    match self.handler.on_disconnect(&reason) {
                        Reconnect::After(backoff) => {
                            log::debug!("reconnecting in {:?}", backoff);
                            self.reconnect_at = Some(Instant::now() + backoff);
                        }
                        Reconnect::Stop => return false,
                    }
                }
                Action::Telegram(cemi) => {
                    let outcome = self.handler.on_telegram(&cemi);
                    self.apply_outcome(outcome, &mut produced);
                }
                Action::TelegramAck => {
                    let outcome = self.handler.on_telegram_ack();
                    self.apply_outcome(outcome, &mut produced);
                }
                Action::Stopped => {
                    log::info!("tunnel stopped");
                    return false;
                }
            }

            // Actions a callback produced run after the ones in flight
            queue.extend(produced);
        }

        true
    }

    /// Route a callback outcome back into the machine
    fn apply_outcome(&mut self, outcome: HandlerOutcome, pending: &mut Vec<Action>) {
        match outcome {
            HandlerOutcome::Continue => {}
            HandlerOutcome::SendTelegram(cemi) => {
                self.machine.send_telegram(&cemi, pending);
            }
            HandlerOutcome::Stop => {
                self.stopping = true;
                self.reconnect_at = None;
                self.machine.shutdown(pending);
            }
        }
    }

    /// Whether the driver can keep running after a receive error
    fn recoverable(&self, err: KnxError) -> bool {
        match err {
            KnxError::Transport(e) if e.kind() == TransportErrorKind::Closed => {
                log::error!("transport closed, exiting tunnel task");
                false
            }
            other => {
                log::warn!("receive error, continuing: {}", other);
                true
            }
        }
    }
}

/// A deadline that never wakes the select loop
fn far_future() -> Instant {
    // ~30 years; effectively never, without risking Instant overflow
    Instant::now() + std::time::Duration::from_secs(86400 * 365 * 30)
}
