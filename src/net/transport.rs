//! Network transport abstraction for KNXnet/IP communication.
//!
//! The [`Transport`] trait decouples the tunnel from the underlying
//! datagram mechanism:
//! - the tunnel driver depends only on this abstraction
//! - production code plugs in [`UdpTransport`](crate::net::UdpTransport)
//! - tests plug in [`MockTransport`](crate::net::MockTransport) and drive
//!   the protocol without touching the network
//!
//! A tunnel owns two transports, one for the control channel and one for
//! the data channel, exactly mirroring the two UDP sockets the protocol
//! prescribes.
//!
//! The methods are declared with explicit `impl Future + Send` return
//! types (rather than `async fn`) so the tunnel task stays spawnable on a
//! multi-threaded runtime when it is generic over the transport;
//! implementations still just write `async fn`.

use crate::error::Result;
use std::future::Future;
use std::net::SocketAddrV4;

/// Asynchronous datagram transport.
///
/// Implementations send and receive UDP-like datagrams. Sends are
/// best-effort and must not block; receives pend until a datagram
/// arrives.
pub trait Transport {
    /// Send a datagram to the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the datagram cannot be handed to the
    /// network.
    fn send_to(
        &mut self,
        data: &[u8],
        addr: SocketAddrV4,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Receive a datagram.
    ///
    /// Pends until a datagram is available, then returns the byte count
    /// and the source endpoint.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the socket failed or was closed.
    fn recv_from(
        &mut self,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<(usize, SocketAddrV4)>> + Send;

    /// The locally bound endpoint.
    ///
    /// This is the address advertised in HPAIs, so it must reflect the
    /// real bound port when an ephemeral port (0) was requested.
    fn local_addr(&self) -> Result<SocketAddrV4>;
}
