//! DPT 10.001 - Time of day (3 bytes)
//!
//! Weekday plus hour/minute/second. Day 0 means "no day".
//!
//! ```text
//! Byte 0: DDDHHHHH  (day 0-7, hour 0-23)
//! Byte 1: 00MMMMMM  (minutes 0-59)
//! Byte 2: 00SSSSSS  (seconds 0-59)
//! ```

use crate::error::{KnxError, Result};

/// A time-of-day value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    /// Weekday, 0 = none, 1 = Monday .. 7 = Sunday
    pub day: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Seconds (0-59)
    pub seconds: u8,
}

/// Encode a time of day.
///
/// # Errors
///
/// Returns a range error if any component exceeds its bounds.
pub fn encode(time: TimeOfDay) -> Result<[u8; 3]> {
    if time.day > 7 || time.hour > 23 || time.minutes > 59 || time.seconds > 59 {
        return Err(KnxError::dpt_value_out_of_range());
    }
    Ok([(time.day << 5) | time.hour, time.minutes, time.seconds])
}

/// Decode a time of day.
///
/// # Errors
///
/// Returns an invalid-data error for wrong length or out-of-range fields.
pub fn decode(data: &[u8]) -> Result<TimeOfDay> {
    let [b0, b1, b2] = data else {
        return Err(KnxError::invalid_dpt_data());
    };

    let time = TimeOfDay {
        day: b0 >> 5,
        hour: b0 & 0x1F,
        minutes: b1 & 0x3F,
        seconds: b2 & 0x3F,
    };

    if time.hour > 23 || time.minutes > 59 || time.seconds > 59 {
        return Err(KnxError::invalid_dpt_data());
    }

    Ok(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        // Wednesday 14:32:05
        let time = TimeOfDay {
            day: 3,
            hour: 14,
            minutes: 32,
            seconds: 5,
        };
        assert_eq!(encode(time).unwrap(), [0x6E, 0x20, 0x05]);
    }

    #[test]
    fn test_encode_no_day() {
        let time = TimeOfDay {
            day: 0,
            hour: 0,
            minutes: 0,
            seconds: 0,
        };
        assert_eq!(encode(time).unwrap(), [0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_encode_out_of_range() {
        let time = TimeOfDay {
            day: 8,
            hour: 0,
            minutes: 0,
            seconds: 0,
        };
        assert!(encode(time).is_err());

        let time = TimeOfDay {
            day: 0,
            hour: 24,
            minutes: 0,
            seconds: 0,
        };
        assert!(encode(time).is_err());

        let time = TimeOfDay {
            day: 0,
            hour: 0,
            minutes: 60,
            seconds: 0,
        };
        assert!(encode(time).is_err());
    }

    #[test]
    fn test_round_trip() {
        let time = TimeOfDay {
            day: 7,
            hour: 23,
            minutes: 59,
            seconds: 59,
        };
        let bytes = encode(time).unwrap();
        assert_eq!(decode(&bytes).unwrap(), time);
    }

    #[test]
    fn test_decode_invalid() {
        assert!(decode(&[0x00, 0x00]).is_err());
        // Hour 25
        assert!(decode(&[0x19, 0x00, 0x00]).is_err());
    }
}
