//! Fuzz target: `DateTime::decode`
//!
//! Drives arbitrary 32-bit words through the packed time decoder and
//! asserts that it never panics and that every accepted word re-encodes
//! to exactly the same word.
//!
//! cargo fuzz run fuzz_packed_decode

#![no_main]

use clocksync::datetime::DateTime;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|word: u32| {
    if let Ok(dt) = DateTime::decode(word) {
        if word == 0 {
            assert!(dt.is_unset(), "word 0 must decode to the unset sentinel");
        }
        let again = dt.encode().expect("accepted word must re-encode");
        assert_eq!(again, word, "decode/encode must be inverse on valid words");
    }
});
