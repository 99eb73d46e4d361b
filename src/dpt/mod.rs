//! KNX Datapoint Types (DPT)
//!
//! Encoding and decoding of typed KNX values. A [`DptType`] descriptor
//! string such as `"9.001"` (or `"9.*"` when only the main group matters)
//! selects the wire scheme; [`DptValue`] is the value-space sum type.
//!
//! ## Supported main groups
//!
//! | Main | Value | Width |
//! |------|-------|-------|
//! | 1 | boolean | 1 bit |
//! | 2 | control + value | 2 bits |
//! | 3 | control + step code | 4 bits |
//! | 4 | character (ASCII / Latin-1) | 1 byte |
//! | 5 | unsigned | 1 byte |
//! | 6 | signed, or status+mode (6.020) | 1 byte |
//! | 7 | unsigned | 2 bytes |
//! | 8 | signed | 2 bytes |
//! | 9 | custom float | 2 bytes |
//! | 10 | time of day | 3 bytes |
//! | 11 | date | 3 bytes |
//! | 12 | unsigned | 4 bytes |
//! | 13 | signed | 4 bytes |
//! | 14 | IEEE 754 float | 4 bytes |
//! | 15 | access data | 4 bytes |
//! | 16 | string (ASCII / Latin-1) | 14 bytes |
//! | 18 | scene control | 1 byte |
//! | 20 | enumeration | 1 byte |
//!
//! ## Usage
//!
//! ```
//! use knx_tunnel::dpt::{self, DptType, DptValue};
//!
//! let dpt: DptType = "9.001".parse().unwrap();
//! let bytes = dpt::encode(&DptValue::Float(30.0), &dpt).unwrap();
//! assert_eq!(bytes, [0x0D, 0xDC]);
//!
//! let value = dpt::decode(&bytes, &dpt).unwrap();
//! assert_eq!(value, DptValue::Float(30.0));
//! ```

use crate::error::{KnxError, Result};
use core::fmt;

pub mod dpt1;
pub mod dpt2;
pub mod dpt3;
pub mod dpt4;
pub mod dpt5;
pub mod dpt6;
pub mod dpt7;
pub mod dpt8;
pub mod dpt9;
pub mod dpt10;
pub mod dpt11;
pub mod dpt12;
pub mod dpt13;
pub mod dpt14;
pub mod dpt15;
pub mod dpt16;
pub mod dpt18;
pub mod dpt20;

#[doc(inline)]
pub use dpt10::TimeOfDay;
#[doc(inline)]
pub use dpt11::Date;
#[doc(inline)]
pub use dpt15::AccessData;

/// Main groups this codec implements
const SUPPORTED_MAIN_GROUPS: [u8; 18] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 18, 20];

/// A datapoint-type descriptor.
///
/// Parsed from `"<main>.<sub>"` or `"<main>.*"`. The subtype only changes
/// behavior where the standard defines distinct encodings (4.001/4.002,
/// 6.020, 16.000/16.001); elsewhere any subtype selects the main group's
/// scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DptType {
    main: u8,
    sub: Option<u16>,
}

impl DptType {
    /// Create a descriptor from main group and subtype.
    ///
    /// # Errors
    ///
    /// Returns an unsupported-type error for main groups outside the
    /// implemented set.
    pub fn new(main: u8, sub: Option<u16>) -> Result<Self> {
        if !SUPPORTED_MAIN_GROUPS.contains(&main) {
            return Err(KnxError::unsupported_dpt());
        }
        Ok(Self { main, sub })
    }

    /// The main group number
    pub const fn main(&self) -> u8 {
        self.main
    }

    /// The subtype number, `None` for a `"*"` wildcard
    pub const fn sub(&self) -> Option<u16> {
        self.sub
    }

    fn is_sub(&self, sub: u16) -> bool {
        self.sub == Some(sub)
    }
}

impl core::str::FromStr for DptType {
    type Err = KnxError;

    fn from_str(s: &str) -> Result<Self> {
        let (main, sub) = s.split_once('.').ok_or_else(KnxError::unsupported_dpt)?;

        let main = main
            .parse::<u8>()
            .map_err(|_| KnxError::unsupported_dpt())?;

        let sub = if sub == "*" {
            None
        } else {
            Some(sub.parse::<u16>().map_err(|_| KnxError::unsupported_dpt())?)
        };

        Self::new(main, sub)
    }
}

impl fmt::Display for DptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub {
            Some(sub) => write!(f, "{}.{:03}", self.main, sub),
            None => write!(f, "{}.*", self.main),
        }
    }
}

/// A decoded KNX datapoint value.
///
/// The variant space is shared across main groups: `Unsigned` serves
/// groups 5, 7, 12 and 20; `Signed` serves 6, 8 and 13; `Float` serves
/// 9 and 14.
#[derive(Debug, Clone, PartialEq)]
pub enum DptValue {
    /// DPT 1 boolean
    Bool(bool),
    /// DPT 2 control + value
    Control { control: bool, value: bool },
    /// DPT 3 control + step code
    Dimming { control: bool, step_code: u8 },
    /// DPT 4 character
    Char(char),
    /// DPT 5/7/12/20 unsigned integer
    Unsigned(u32),
    /// DPT 6/8/13 signed integer
    Signed(i32),
    /// DPT 9/14 float
    Float(f64),
    /// DPT 10 time of day
    Time(TimeOfDay),
    /// DPT 11 date
    Date(Date),
    /// DPT 15 access data
    Access(AccessData),
    /// DPT 16 string
    String(String),
    /// DPT 18 scene control
    SceneControl { control: bool, scene: u8 },
    /// DPT 6.020 status bits + mode
    StatusWithMode { status: [bool; 5], mode: u8 },
}

/// Encode a value according to a datapoint descriptor.
///
/// # Errors
///
/// Returns a value-mismatch error when the variant does not fit the
/// descriptor, and the module-specific range/charset errors otherwise.
pub fn encode(value: &DptValue, dpt: &DptType) -> Result<Vec<u8>> {
    match (dpt.main, value) {
        (1, DptValue::Bool(b)) => Ok(dpt1::encode(*b).to_vec()),
        (2, DptValue::Control { control, value }) => Ok(dpt2::encode(*control, *value).to_vec()),
        (3, DptValue::Dimming { control, step_code }) => {
            Ok(dpt3::encode(*control, *step_code)?.to_vec())
        }
        (4, DptValue::Char(c)) => match dpt.sub {
            Some(1) | None => Ok(dpt4::encode_ascii(*c)?.to_vec()),
            Some(2) => Ok(dpt4::encode_latin1(*c)?.to_vec()),
            Some(_) => Err(KnxError::unsupported_dpt()),
        },
        (5, DptValue::Unsigned(v)) => Ok(dpt5::encode(*v)?.to_vec()),
        (6, DptValue::StatusWithMode { status, mode }) if dpt.is_sub(20) => {
            Ok(dpt6::encode_status(*status, *mode)?.to_vec())
        }
        (6, DptValue::Signed(v)) if !dpt.is_sub(20) => Ok(dpt6::encode(*v)?.to_vec()),
        (7, DptValue::Unsigned(v)) => Ok(dpt7::encode(*v)?.to_vec()),
        (8, DptValue::Signed(v)) => Ok(dpt8::encode(*v)?.to_vec()),
        (9, DptValue::Float(v)) => Ok(dpt9::encode(*v).to_vec()),
        (10, DptValue::Time(t)) => Ok(dpt10::encode(*t)?.to_vec()),
        (11, DptValue::Date(d)) => Ok(dpt11::encode(*d)?.to_vec()),
        (12, DptValue::Unsigned(v)) => Ok(dpt12::encode(*v).to_vec()),
        (13, DptValue::Signed(v)) => Ok(dpt13::encode(*v).to_vec()),
        (14, DptValue::Float(v)) => Ok(dpt14::encode(*v).to_vec()),
        (15, DptValue::Access(a)) => Ok(dpt15::encode(*a)?.to_vec()),
        (16, DptValue::String(s)) => match dpt.sub {
            Some(0) | None => Ok(dpt16::encode_ascii(s)?.to_vec()),
            Some(1) => Ok(dpt16::encode_latin1(s)?.to_vec()),
            Some(_) => Err(KnxError::unsupported_dpt()),
        },
        (18, DptValue::SceneControl { control, scene }) => {
            Ok(dpt18::encode(*control, *scene)?.to_vec())
        }
        (20, DptValue::Unsigned(v)) => Ok(dpt20::encode(*v)?.to_vec()),
        _ => Err(KnxError::dpt_value_mismatch()),
    }
}

/// Decode bytes according to a datapoint descriptor.
///
/// A single zero byte (the 6-bit inline zero a telegram can carry)
/// decodes to zero for the numeric groups wider than one byte, and the
/// string group tolerates short input, so a zero-width telegram value
/// never fails against those types.
///
/// # Errors
///
/// Returns the module-specific invalid-data/charset errors, or an
/// unsupported-type error for subtypes without a defined scheme.
pub fn decode(data: &[u8], dpt: &DptType) -> Result<DptValue> {
    // Inline zero against a wider numeric type
    if data == [0x00] && matches!(dpt.main, 8 | 9 | 12 | 13 | 14) {
        return Ok(match dpt.main {
            9 | 14 => DptValue::Float(0.0),
            12 => DptValue::Unsigned(0),
            _ => DptValue::Signed(0),
        });
    }

    match dpt.main {
        1 => Ok(DptValue::Bool(dpt1::decode(data)?)),
        2 => {
            let (control, value) = dpt2::decode(data)?;
            Ok(DptValue::Control { control, value })
        }
        3 => {
            let (control, step_code) = dpt3::decode(data)?;
            Ok(DptValue::Dimming { control, step_code })
        }
        4 => match dpt.sub {
            Some(1) | None => Ok(DptValue::Char(dpt4::decode_ascii(data)?)),
            Some(2) => Ok(DptValue::Char(dpt4::decode_latin1(data)?)),
            Some(_) => Err(KnxError::unsupported_dpt()),
        },
        5 => Ok(DptValue::Unsigned(dpt5::decode(data)?)),
        6 if dpt.is_sub(20) => {
            let (status, mode) = dpt6::decode_status(data)?;
            Ok(DptValue::StatusWithMode { status, mode })
        }
        6 => Ok(DptValue::Signed(dpt6::decode(data)?)),
        7 => Ok(DptValue::Unsigned(dpt7::decode(data)?)),
        8 => Ok(DptValue::Signed(dpt8::decode(data)?)),
        9 => Ok(DptValue::Float(dpt9::decode(data)?)),
        10 => Ok(DptValue::Time(dpt10::decode(data)?)),
        11 => Ok(DptValue::Date(dpt11::decode(data)?)),
        12 => Ok(DptValue::Unsigned(dpt12::decode(data)?)),
        13 => Ok(DptValue::Signed(dpt13::decode(data)?)),
        14 => Ok(DptValue::Float(dpt14::decode(data)?)),
        15 => Ok(DptValue::Access(dpt15::decode(data)?)),
        16 => match dpt.sub {
            Some(0) | None => Ok(DptValue::String(dpt16::decode_ascii(data)?)),
            Some(1) => Ok(DptValue::String(dpt16::decode_latin1(data)?)),
            Some(_) => Err(KnxError::unsupported_dpt()),
        },
        18 => {
            let (control, scene) = dpt18::decode(data)?;
            Ok(DptValue::SceneControl { control, scene })
        }
        20 => Ok(DptValue::Unsigned(dpt20::decode(data)?)),
        _ => Err(KnxError::unsupported_dpt()),
    }
}
