//! Synchronization configuration.
//!
//! Two bounded-integer settings sourced from the settings store: which NTP
//! server to use and which timezone rule to apply.  Both resolve through
//! fixed lookup tables compiled into the firmware.  Values can be changed at
//! runtime through the settings UI, which announces the change with a
//! `ConfigurationChanged` bus message.

use log::warn;
use serde::{Deserialize, Serialize};

/// Selectable NTP servers, indexed by `SyncConfig::server_index`.
pub const NTP_SERVERS: [&str; 4] = [
    "pool.ntp.org",
    "time.nist.gov",
    "time.google.com",
    "time.cloudflare.com",
];

/// Selectable timezone rules (POSIX TZ strings with DST transitions),
/// indexed by `SyncConfig::timezone_index`.
pub const TIMEZONES: [&str; 6] = [
    "CET-1CEST,M3.5.0,M10.5.0/3",      // Central Europe
    "GMT0BST,M3.5.0/1,M10.5.0",        // UK / Ireland
    "EET-2EEST,M3.5.0/3,M10.5.0/4",    // Eastern Europe
    "EST5EDT,M3.2.0,M11.1.0",          // US Eastern
    "PST8PDT,M3.2.0,M11.1.0",          // US Pacific
    "UTC0",                            // UTC, no DST
];

/// How often the NTP client re-synchronizes on its own (seconds).
pub const NTP_SYNC_PERIOD_SECS: u16 = 600;

/// Per-request NTP response timeout (milliseconds).
pub const NTP_TIMEOUT_MS: u16 = 5000;

/// Period of the manager's local tick timer (milliseconds).
pub const TICK_PERIOD_MS: u32 = 1000;

/// Server and timezone selection.
///
/// Both indices must be valid lookups into the fixed tables above; an
/// out-of-range index is a settings-store contract violation and falls
/// back to entry 0 with a diagnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Index into [`NTP_SERVERS`].
    pub server_index: u8,
    /// Index into [`TIMEZONES`].
    pub timezone_index: u8,
}

impl SyncConfig {
    /// Resolve the configured NTP server address.
    pub fn server(&self) -> &'static str {
        lookup(&NTP_SERVERS, self.server_index, "server_index")
    }

    /// Resolve the configured timezone rule string.
    pub fn timezone(&self) -> &'static str {
        lookup(&TIMEZONES, self.timezone_index, "timezone_index")
    }
}

fn lookup(table: &[&'static str], index: u8, what: &str) -> &'static str {
    table.get(index as usize).copied().unwrap_or_else(|| {
        warn!("config: {what}={index} out of range, using default entry");
        table[0]
    })
}
