//! DPT 14.xxx - 32-bit IEEE 754 float
//!
//! Physical quantities needing more range or precision than the 2-byte
//! float offers.
//!
//! ```text
//! Encoding: binary32, big-endian
//! ```

use crate::error::{KnxError, Result};

/// Encode a float as binary32
pub fn encode(value: f64) -> [u8; 4] {
    (value as f32).to_be_bytes()
}

/// Decode a binary32 float
pub fn decode(data: &[u8]) -> Result<f64> {
    match data {
        [a, b, c, d] => Ok(f64::from(f32::from_be_bytes([*a, *b, *c, *d]))),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}
