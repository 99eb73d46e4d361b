//! KNXnet/IP tunnelling connection management.
//!
//! - [`TunnelConfig`] - endpoints and protocol timeouts
//! - [`TunnelHandler`] - the callback trait user code implements
//! - [`Tunnel`] / [`TunnelHandle`] - starting and commanding a tunnel
//!
//! The protocol rules themselves live in the private `machine` module; the
//! `client` module drives that machine over sockets and timers.

pub mod client;
pub mod config;
pub mod handler;
mod machine;

#[doc(inline)]
pub use client::{Tunnel, TunnelHandle};
#[doc(inline)]
pub use config::TunnelConfig;
#[doc(inline)]
pub use handler::{DisconnectReason, ErrorInfo, HandlerOutcome, Reconnect, TunnelHandler};
