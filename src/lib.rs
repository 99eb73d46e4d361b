#![doc = include_str!("../README.md")]
//!
//! ## Module map
//!
//! - [`addressing`] - individual and group addresses
//! - [`dpt`] - datapoint value codec
//! - [`protocol`] - KNXnet/IP frames and cEMI telegrams
//! - [`net`] - transport seam (UDP and mock)
//! - [`tunnel`] - the tunnelling client itself

pub mod addressing;
pub mod dpt;
pub mod error;
pub mod net;
pub mod protocol;
pub mod tunnel;

// Re-export commonly used types
#[doc(inline)]
pub use addressing::{GroupAddress, IndividualAddress};
#[doc(inline)]
pub use dpt::{DptType, DptValue};
#[doc(inline)]
pub use error::{KnxError, Result};
#[doc(inline)]
pub use tunnel::{Tunnel, TunnelConfig, TunnelHandle, TunnelHandler};
