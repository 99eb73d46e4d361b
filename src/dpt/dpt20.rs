//! DPT 20.xxx - 8-bit enumeration
//!
//! HVAC modes, priorities and the other 1-byte enumerated types. The
//! enumerant is carried as its raw value; interpreting it is up to the
//! application.
//!
//! ```text
//! Encoding: EEEEEEEE
//! ```

use crate::error::{KnxError, Result};

/// Encode an enumerant.
///
/// # Errors
///
/// Returns a range error above 255.
pub fn encode(value: u32) -> Result<[u8; 1]> {
    let value = u8::try_from(value).map_err(|_| KnxError::dpt_value_out_of_range())?;
    Ok([value])
}

/// Decode an enumerant
pub fn decode(data: &[u8]) -> Result<u32> {
    match data {
        [byte] => Ok(u32::from(*byte)),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}
