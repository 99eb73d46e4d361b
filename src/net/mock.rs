//! Mock transport for testing.
//!
//! Simulates one side of a datagram socket without a network. The
//! [`MockTransport`] is handed to the tunnel; the paired [`MockHandle`]
//! stays with the test to play the server role:
//! - `inject` queues a datagram the tunnel will receive
//! - `sent` / `next_sent` expose what the tunnel transmitted
//!
//! Receives pend on a channel instead of erroring when nothing is queued,
//! so a select loop over a mock behaves like one over a real socket.
//!
//! ## Example
//!
//! ```
//! use knx_tunnel::net::{MockTransport, Transport};
//! use std::net::SocketAddrV4;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let server = SocketAddrV4::new([192, 168, 1, 10].into(), 3671);
//! let (mut transport, handle) = MockTransport::new(SocketAddrV4::new([127, 0, 0, 1].into(), 50001));
//!
//! handle.inject(&[0x06, 0x10], server);
//! let mut buf = [0u8; 32];
//! let (len, from) = transport.recv_from(&mut buf).await.unwrap();
//! assert_eq!(&buf[..len], &[0x06, 0x10]);
//! assert_eq!(from, server);
//!
//! transport.send_to(&[0xAA], server).await.unwrap();
//! assert_eq!(handle.next_sent().unwrap().0, vec![0xAA]);
//! # }
//! ```

use crate::error::{KnxError, Result};
use crate::net::transport::Transport;
use std::net::SocketAddrV4;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// One recorded or injected datagram
type Datagram = (Vec<u8>, SocketAddrV4);

/// Mock [`Transport`] for protocol tests
pub struct MockTransport {
    local: SocketAddrV4,
    inbound: mpsc::UnboundedReceiver<Datagram>,
    sent: Arc<Mutex<Vec<Datagram>>>,
}

/// Test-side handle paired with a [`MockTransport`]
#[derive(Clone)]
pub struct MockHandle {
    inbound: mpsc::UnboundedSender<Datagram>,
    sent: Arc<Mutex<Vec<Datagram>>>,
    cursor: Arc<Mutex<usize>>,
}

impl MockTransport {
    /// Create a transport/handle pair reporting the given local address
    pub fn new(local: SocketAddrV4) -> (Self, MockHandle) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));

        let transport = Self {
            local,
            inbound: inbound_rx,
            sent: sent.clone(),
        };
        let handle = MockHandle {
            inbound: inbound_tx,
            sent,
            cursor: Arc::new(Mutex::new(0)),
        };

        (transport, handle)
    }
}

impl Transport for MockTransport {
    async fn send_to(&mut self, data: &[u8], addr: SocketAddrV4) -> Result<()> {
        self.sent.lock().unwrap().push((data.to_vec(), addr));
        Ok(())
    }

    async fn recv_from(&mut self, buf: &mut [u8]) -> Result<(usize, SocketAddrV4)> {
        let (data, from) = self
            .inbound
            .recv()
            .await
            .ok_or_else(KnxError::transport_closed)?;
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok((len, from))
    }

    fn local_addr(&self) -> Result<SocketAddrV4> {
        Ok(self.local)
    }
}

impl MockHandle {
    /// Queue a datagram for the transport to receive
    pub fn inject(&self, data: &[u8], from: SocketAddrV4) {
        // Send only fails when the transport is dropped; tests that already
        // shut the tunnel down may still inject harmlessly
        let _ = self.inbound.send((data.to_vec(), from));
    }

    /// All datagrams sent through the transport so far
    pub fn sent(&self) -> Vec<Datagram> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of datagrams sent through the transport
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// The next sent datagram not yet consumed by this handle.
    ///
    /// Each call advances an internal cursor, so a test can walk the
    /// transmission log in order.
    pub fn next_sent(&self) -> Option<Datagram> {
        let sent = self.sent.lock().unwrap();
        let mut cursor = self.cursor.lock().unwrap();
        let datagram = sent.get(*cursor).cloned()?;
        *cursor += 1;
        Some(datagram)
    }

    /// Wait until the transport has sent at least `count` datagrams.
    ///
    /// Sleeps between polls so a paused tokio clock keeps auto-advancing;
    /// panics instead of hanging if the datagrams never appear.
    pub async fn wait_for_sent(&self, count: usize) {
        for _ in 0..10_000 {
            if self.sent_count() >= count {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        panic!(
            "transport sent {} datagrams, expected at least {}",
            self.sent_count(),
            count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> SocketAddrV4 {
        SocketAddrV4::new([127, 0, 0, 1].into(), 50001)
    }

    fn server() -> SocketAddrV4 {
        SocketAddrV4::new([192, 168, 1, 10].into(), 3671)
    }

    #[tokio::test]
    async fn test_send_records() {
        let (mut transport, handle) = MockTransport::new(local());

        transport.send_to(&[0xAA, 0xBB], server()).await.unwrap();
        transport.send_to(&[0xCC], server()).await.unwrap();

        assert_eq!(handle.sent_count(), 2);
        assert_eq!(handle.next_sent().unwrap().0, vec![0xAA, 0xBB]);
        assert_eq!(handle.next_sent().unwrap().0, vec![0xCC]);
        assert!(handle.next_sent().is_none());
    }

    #[tokio::test]
    async fn test_inject_receives_in_order() {
        let (mut transport, handle) = MockTransport::new(local());

        handle.inject(&[0x01], server());
        handle.inject(&[0x02], server());

        let mut buf = [0u8; 16];
        let (len, from) = transport.recv_from(&mut buf).await.unwrap();
        assert_eq!((len, from), (1, server()));
        assert_eq!(buf[0], 0x01);

        let (len, _) = transport.recv_from(&mut buf).await.unwrap();
        assert_eq!(len, 1);
        assert_eq!(buf[0], 0x02);
    }

    #[tokio::test]
    async fn test_recv_pends_until_injected() {
        let (mut transport, handle) = MockTransport::new(local());

        let recv = tokio::spawn(async move {
            let mut buf = [0u8; 16];
            transport.recv_from(&mut buf).await.map(|(len, _)| buf[..len].to_vec())
        });

        tokio::task::yield_now().await;
        handle.inject(&[0x42], server());

        assert_eq!(recv.await.unwrap().unwrap(), vec![0x42]);
    }

    #[tokio::test]
    async fn test_local_addr() {
        let (transport, _handle) = MockTransport::new(local());
        assert_eq!(transport.local_addr().unwrap(), local());
    }
}
