//! DPT 4.xxx - Character (8 bits)
//!
//! - **4.001** - ASCII character (high bit zero)
//! - **4.002** - ISO 8859-1 (Latin-1) character, surfaced as a Rust `char`

use crate::error::{KnxError, Result};

/// Encode an ASCII character (DPT 4.001).
///
/// # Errors
///
/// Returns a charset error for non-ASCII characters.
pub fn encode_ascii(value: char) -> Result<[u8; 1]> {
    if !value.is_ascii() {
        return Err(KnxError::dpt_charset_violation());
    }
    Ok([value as u8])
}

/// Encode a Latin-1 character (DPT 4.002).
///
/// # Errors
///
/// Returns a charset error for characters outside the Latin-1 range.
pub fn encode_latin1(value: char) -> Result<[u8; 1]> {
    let code = u32::from(value);
    if code > 0xFF {
        return Err(KnxError::dpt_charset_violation());
    }
    Ok([code as u8])
}

/// Decode an ASCII character (DPT 4.001).
///
/// # Errors
///
/// Returns a charset error if the high bit is set, an invalid-data error
/// for wrong input length.
pub fn decode_ascii(data: &[u8]) -> Result<char> {
    match data {
        [byte] if byte.is_ascii() => Ok(*byte as char),
        [_] => Err(KnxError::dpt_charset_violation()),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Decode a Latin-1 character (DPT 4.002).
///
/// Every byte is a valid Latin-1 code point, mapping 1:1 onto the first
/// Unicode block.
pub fn decode_latin1(data: &[u8]) -> Result<char> {
    match data {
        [byte] => Ok(char::from(*byte)),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}
