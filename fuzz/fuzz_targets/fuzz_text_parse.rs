//! Fuzz target: NTP client text parsers
//!
//! Feeds arbitrary byte strings to `parse_time_text` / `parse_date_text`
//! and asserts they never panic and never accept out-of-range fields.
//!
//! cargo fuzz run fuzz_text_parse

#![no_main]

use clocksync::datetime::{parse_date_text, parse_time_text};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok((hour, minute, second)) = parse_time_text(text) {
        assert!(hour <= 23 && minute <= 59 && second <= 59);
    }
    if let Ok((day, month, _year)) = parse_date_text(text) {
        assert!((1..=31).contains(&day) && (1..=12).contains(&month));
    }
});
