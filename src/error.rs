//! Unified error types for the clocksync component.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! event loop's error handling uniform.  All variants are `Copy` so they can
//! be passed around without allocation.  No error here is fatal — the
//! worst case on any failure is "no time update delivered this cycle",
//! which self-heals on the next periodic tick or sync event.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level component error
// ---------------------------------------------------------------------------

/// Every fallible operation in the component funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A date-time could not be packed for the wire.
    Encode(EncodeError),
    /// A wire word could not be unpacked into a valid date-time.
    Decode(DecodeError),
    /// The NTP client's time/date text could not be parsed.
    Parse(ParseError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
    /// Subsystem initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "encode: {e}"),
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire encoding errors
// ---------------------------------------------------------------------------

/// A date-time cannot be represented in the packed 32-bit word.
/// Locally recoverable: drop the message, the next tick retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Year is outside the 2000–2063 window of the 6-bit year field.
    YearOutOfRange(u16),
    /// A calendar field is outside its valid range.
    FieldOutOfRange(&'static str),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YearOutOfRange(y) => write!(f, "year {y} not representable"),
            Self::FieldOutOfRange(field) => write!(f, "{field} out of range"),
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

// ---------------------------------------------------------------------------
// Wire decoding errors
// ---------------------------------------------------------------------------

/// A received wire word does not decode to a valid date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A calendar field unpacked to an out-of-range value.
    FieldOutOfRange(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldOutOfRange(field) => write!(f, "{field} out of range"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// NTP text parse errors
// ---------------------------------------------------------------------------

/// The NTP client's textual time/date representation is malformed.
/// Treated as "no sync data available", never propagated as a crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// 'HH:MM:SS' field missing, non-numeric, or out of range.
    MalformedTimeText,
    /// 'DD/MM/YYYY' field missing, non-numeric, or out of range.
    MalformedDateText,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTimeText => write!(f, "malformed time text"),
            Self::MalformedDateText => write!(f, "malformed date text"),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Component-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
