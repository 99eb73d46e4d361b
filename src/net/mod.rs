//! Network transport layer.
//!
//! The tunnel talks to its sockets through the [`Transport`] trait so the
//! protocol logic never depends on a concrete socket type:
//! - [`UdpTransport`] wraps a tokio UDP socket for production use
//! - [`MockTransport`] simulates the network for tests

pub mod mock;
pub mod transport;
pub mod udp;

#[doc(inline)]
pub use mock::{MockHandle, MockTransport};
#[doc(inline)]
pub use transport::Transport;
#[doc(inline)]
pub use udp::UdpTransport;
