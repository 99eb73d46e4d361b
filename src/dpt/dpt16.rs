//! DPT 16.xxx - Character string (14 bytes)
//!
//! Fixed 14-byte field, zero-padded on the right.
//!
//! - **16.000** - ASCII
//! - **16.001** - ISO 8859-1 (Latin-1), surfaced as UTF-8

use crate::error::{KnxError, Result};

/// Wire size of a DPT 16 string
pub const SIZE: usize = 14;

/// Encode an ASCII string (DPT 16.000).
///
/// # Errors
///
/// Returns a charset error for non-ASCII characters and a too-long error
/// above 14 bytes.
pub fn encode_ascii(value: &str) -> Result<[u8; SIZE]> {
    if !value.is_ascii() {
        return Err(KnxError::dpt_charset_violation());
    }
    pad(value.as_bytes())
}

/// Encode a string as Latin-1 (DPT 16.001).
///
/// # Errors
///
/// Returns a charset error for characters outside Latin-1 and a too-long
/// error if the converted form exceeds 14 bytes.
pub fn encode_latin1(value: &str) -> Result<[u8; SIZE]> {
    let mut bytes = Vec::with_capacity(value.len());
    for ch in value.chars() {
        let code = u32::from(ch);
        if code > 0xFF {
            return Err(KnxError::dpt_charset_violation());
        }
        bytes.push(code as u8);
    }
    pad(&bytes)
}

/// Decode an ASCII string (DPT 16.000), stripping the zero padding.
///
/// # Errors
///
/// Returns a charset error for bytes with the high bit set and an
/// invalid-data error for over-long input.
pub fn decode_ascii(data: &[u8]) -> Result<String> {
    let content = unpad(data)?;
    if !content.is_ascii() {
        return Err(KnxError::dpt_charset_violation());
    }
    Ok(String::from_utf8_lossy(content).into_owned())
}

/// Decode a Latin-1 string (DPT 16.001) into UTF-8, stripping the zero
/// padding.
pub fn decode_latin1(data: &[u8]) -> Result<String> {
    let content = unpad(data)?;
    Ok(content.iter().map(|b| char::from(*b)).collect())
}

fn pad(bytes: &[u8]) -> Result<[u8; SIZE]> {
    if bytes.len() > SIZE {
        return Err(KnxError::dpt_string_too_long());
    }
    let mut out = [0u8; SIZE];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

fn unpad(data: &[u8]) -> Result<&[u8]> {
    if data.len() > SIZE {
        return Err(KnxError::invalid_dpt_data());
    }
    let end = data
        .iter()
        .rposition(|b| *b != 0)
        .map_or(0, |pos| pos + 1);
    Ok(&data[..end])
}
