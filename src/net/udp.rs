//! UDP transport backed by a tokio socket.

use crate::error::{KnxError, Result};
use crate::net::transport::Transport;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::UdpSocket;

/// [`Transport`] implementation over a tokio [`UdpSocket`].
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind a UDP socket on the given local address.
    ///
    /// Port 0 requests an ephemeral port; [`Transport::local_addr`]
    /// reports the port actually bound.
    ///
    /// # Errors
    ///
    /// Returns a bind error if the address is unavailable.
    pub async fn bind(ip: Ipv4Addr, port: u16) -> Result<Self> {
        let socket = UdpSocket::bind(SocketAddrV4::new(ip, port))
            .await
            .map_err(|e| {
                log::error!("failed to bind UDP socket on {}:{}: {}", ip, port, e);
                KnxError::bind_failed()
            })?;

        Ok(Self { socket })
    }
}

impl Transport for UdpTransport {
    async fn send_to(&mut self, data: &[u8], addr: SocketAddrV4) -> Result<()> {
        self.socket
            .send_to(data, SocketAddr::V4(addr))
            .await
            .map_err(|e| {
                log::error!("UDP send to {} failed: {}", addr, e);
                KnxError::send_failed()
            })?;
        Ok(())
    }

    async fn recv_from(&mut self, buf: &mut [u8]) -> Result<(usize, SocketAddrV4)> {
        loop {
            let (len, addr) = self
                .socket
                .recv_from(buf)
                .await
                .map_err(|_| KnxError::receive_failed())?;

            match addr {
                SocketAddr::V4(addr) => return Ok((len, addr)),
                SocketAddr::V6(addr) => {
                    log::debug!("ignoring datagram from non-IPv4 source {}", addr);
                }
            }
        }
    }

    fn local_addr(&self) -> Result<SocketAddrV4> {
        match self.socket.local_addr() {
            Ok(SocketAddr::V4(addr)) => Ok(addr),
            _ => Err(KnxError::transport_closed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_reports_real_port() {
        let transport = UdpTransport::bind(Ipv4Addr::LOCALHOST, 0).await.unwrap();
        let addr = transport.local_addr().unwrap();
        assert_eq!(*addr.ip(), Ipv4Addr::LOCALHOST);
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_send_and_receive() {
        let mut a = UdpTransport::bind(Ipv4Addr::LOCALHOST, 0).await.unwrap();
        let mut b = UdpTransport::bind(Ipv4Addr::LOCALHOST, 0).await.unwrap();
        let addr_b = b.local_addr().unwrap();

        a.send_to(&[0x06, 0x10, 0xAA], addr_b).await.unwrap();

        let mut buf = [0u8; 32];
        let (len, from) = b.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], &[0x06, 0x10, 0xAA]);
        assert_eq!(from, a.local_addr().unwrap());
    }
}
