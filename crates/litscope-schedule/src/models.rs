//! Schedule data types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// One activity of the project schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub activity: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub phase: String,
}

impl ScheduleEntry {
    /// Length in days, counting both ends.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ScheduleError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ScheduleError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ScheduleError::InvalidColor(hex.to_string()))
        };
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colors() {
        assert_eq!(Rgb::from_hex("#173F5F").unwrap(), Rgb(0x17, 0x3F, 0x5F));
        assert_eq!(Rgb::from_hex("ed553b").unwrap(), Rgb(0xED, 0x55, 0x3B));
        assert!(matches!(Rgb::from_hex("#12345"), Err(ScheduleError::InvalidColor(_))));
        assert!(Rgb::from_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_duration_counts_both_ends() {
        let e = ScheduleEntry {
            activity: "Fieldwork".into(),
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            phase: "Data".into(),
        };
        assert_eq!(e.duration_days(), 1);
    }
}
