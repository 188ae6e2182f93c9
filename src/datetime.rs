//! Calendar date-time value type and its packed wire encoding.
//!
//! Wire format (one `u32` payload word on the message bus):
//! ```text
//! ┌───────────┬────────┬────────┬────────┬────────┬────────┐
//! │ 31…26     │ 25…22  │ 21…17  │ 16…12  │ 11…6   │ 5…0    │
//! │ year−2000 │ month  │ day    │ hour   │ minute │ second │
//! │ (0–63)    │ (1–12) │ (1–31) │ (0–23) │ (0–59) │ (0–59) │
//! └───────────┴────────┴────────┴────────┴────────┴────────┘
//! ```
//!
//! The all-zero [`DateTime`] is the explicit "unset" sentinel — it means no
//! NTP sync has ever produced a reading.  It packs to word `0`; no valid
//! date-time packs to `0` because the month field is at least 1.

use crate::error::{DecodeError, EncodeError, ParseError};

/// First year representable by the 6-bit packed year field.
pub const YEAR_BASE: u16 = 2000;

/// Last year representable by the 6-bit packed year field.
pub const YEAR_MAX: u16 = YEAR_BASE + 63;

const SECOND_SHIFT: u32 = 0;
const MINUTE_SHIFT: u32 = 6;
const HOUR_SHIFT: u32 = 12;
const DAY_SHIFT: u32 = 17;
const MONTH_SHIFT: u32 = 22;
const YEAR_SHIFT: u32 = 26;

/// A civil calendar point in time, second resolution, no timezone identity.
///
/// Compared field-wise.  `DateTime::default()` is the unset sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// The "no sync has ever occurred" sentinel (all fields zero).
    pub const fn unset() -> Self {
        Self::new(0, 0, 0, 0, 0, 0)
    }

    pub fn is_unset(&self) -> bool {
        *self == Self::unset()
    }

    /// Minute-resolution comparison used by the notification debounce:
    /// only hour and minute participate, seconds never trigger a change.
    pub fn same_minute(&self, other: &Self) -> bool {
        self.hour == other.hour && self.minute == other.minute
    }

    /// Pack into the 32-bit wire word.
    ///
    /// Fails rather than truncating: a year outside 2000–2063 or any field
    /// outside its calendar range is reported as [`EncodeError`].
    pub fn encode(&self) -> Result<u32, EncodeError> {
        if self.is_unset() {
            return Ok(0);
        }
        if self.year < YEAR_BASE || self.year > YEAR_MAX {
            return Err(EncodeError::YearOutOfRange(self.year));
        }
        if self.month < 1 || self.month > 12 {
            return Err(EncodeError::FieldOutOfRange("month"));
        }
        if self.day < 1 || self.day > 31 {
            return Err(EncodeError::FieldOutOfRange("day"));
        }
        if self.hour > 23 {
            return Err(EncodeError::FieldOutOfRange("hour"));
        }
        if self.minute > 59 {
            return Err(EncodeError::FieldOutOfRange("minute"));
        }
        if self.second > 59 {
            return Err(EncodeError::FieldOutOfRange("second"));
        }

        Ok((u32::from(self.year - YEAR_BASE) << YEAR_SHIFT)
            | (u32::from(self.month) << MONTH_SHIFT)
            | (u32::from(self.day) << DAY_SHIFT)
            | (u32::from(self.hour) << HOUR_SHIFT)
            | (u32::from(self.minute) << MINUTE_SHIFT)
            | (u32::from(self.second) << SECOND_SHIFT))
    }

    /// Unpack a wire word.  Word `0` decodes to the unset sentinel.
    pub fn decode(word: u32) -> Result<Self, DecodeError> {
        if word == 0 {
            return Ok(Self::unset());
        }

        let dt = Self {
            year: YEAR_BASE + ((word >> YEAR_SHIFT) & 0x3F) as u16,
            month: ((word >> MONTH_SHIFT) & 0x0F) as u8,
            day: ((word >> DAY_SHIFT) & 0x1F) as u8,
            hour: ((word >> HOUR_SHIFT) & 0x1F) as u8,
            minute: ((word >> MINUTE_SHIFT) & 0x3F) as u8,
            second: ((word >> SECOND_SHIFT) & 0x3F) as u8,
        };

        if dt.month < 1 || dt.month > 12 {
            return Err(DecodeError::FieldOutOfRange("month"));
        }
        if dt.day < 1 {
            return Err(DecodeError::FieldOutOfRange("day"));
        }
        if dt.hour > 23 {
            return Err(DecodeError::FieldOutOfRange("hour"));
        }
        if dt.minute > 59 {
            return Err(DecodeError::FieldOutOfRange("minute"));
        }
        if dt.second > 59 {
            return Err(DecodeError::FieldOutOfRange("second"));
        }

        Ok(dt)
    }
}

impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02}/{:02}/{:04} {:02}:{:02}:{:02}",
            self.day, self.month, self.year, self.hour, self.minute, self.second
        )
    }
}

// ───────────────────────────────────────────────────────────────
// NTP client text parsing
// ───────────────────────────────────────────────────────────────
//
// The NTP client reports its last reading as two text fields:
// time 'HH:MM:SS' (e.g. "00:23:56") and date 'DD/MM/YYYY'
// (e.g. "25/12/2023").  A missing or non-numeric field is a parse
// error — never a partially-filled value.

fn split3(s: &str, sep: char) -> Option<(&str, &str, &str)> {
    let mut it = s.trim().splitn(3, sep);
    let a = it.next()?;
    let b = it.next()?;
    let c = it.next()?;
    Some((a, b, c))
}

/// Parse the NTP client's 'HH:MM:SS' representation into
/// (hour, minute, second).
pub fn parse_time_text(text: &str) -> Result<(u8, u8, u8), ParseError> {
    let (h, m, s) = split3(text, ':').ok_or(ParseError::MalformedTimeText)?;
    let hour: u8 = h.parse().map_err(|_| ParseError::MalformedTimeText)?;
    let minute: u8 = m.parse().map_err(|_| ParseError::MalformedTimeText)?;
    let second: u8 = s.parse().map_err(|_| ParseError::MalformedTimeText)?;
    if hour > 23 || minute > 59 || second > 59 {
        return Err(ParseError::MalformedTimeText);
    }
    Ok((hour, minute, second))
}

/// Parse the NTP client's 'DD/MM/YYYY' representation into
/// (day, month, year).
pub fn parse_date_text(text: &str) -> Result<(u8, u8, u16), ParseError> {
    let (d, m, y) = split3(text, '/').ok_or(ParseError::MalformedDateText)?;
    let day: u8 = d.parse().map_err(|_| ParseError::MalformedDateText)?;
    let month: u8 = m.parse().map_err(|_| ParseError::MalformedDateText)?;
    let year: u16 = y.parse().map_err(|_| ParseError::MalformedDateText)?;
    if day < 1 || day > 31 || month < 1 || month > 12 {
        return Err(ParseError::MalformedDateText);
    }
    Ok((day, month, year))
}
