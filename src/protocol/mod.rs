//! KNXnet/IP protocol implementation.
//!
//! - `constants` - service ids, status codes and the symbolic registries
//! - `frame` - KNXnet/IP header, HPAI and CRI/CRD substructures
//! - `services` - per-service frame builders/parsers and the
//!   [`ServiceFrame`](services::ServiceFrame) sum type
//! - `cemi` - the [`Telegram`](cemi::Telegram) codec

pub mod cemi;
pub mod constants;
pub mod frame;
pub mod services;
