//! Port traits — the hexagonal boundary between the manager and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TimeSyncService (domain)
//! ```
//!
//! Driven adapters (wall-clock, NTP client, settings store, message bus)
//! implement these traits.  The [`TimeSyncService`](super::service::TimeSyncService)
//! consumes them via generics, so the domain core never touches the global
//! process clock or the network stack directly.

use crate::config::SyncConfig;
use crate::datetime::{parse_date_text, parse_time_text, DateTime};

use super::messages::Message;

// ───────────────────────────────────────────────────────────────
// Wall-clock port (driven adapter: domain ↔ OS clock)
// ───────────────────────────────────────────────────────────────

/// Sole interface to the device wall-clock.
///
/// The clock is process-wide singleton state; isolating it behind this port
/// lets the manager run against an in-memory clock in tests.
pub trait ClockPort {
    /// Current local time, civil calendar fields (timezone/DST already
    /// applied by the underlying OS clock).
    fn read_local(&self) -> DateTime;

    /// Set the wall-clock's date and time fields.
    ///
    /// Implementations overlay the calendar fields on a freshly read
    /// local-time snapshot so the OS's own DST bookkeeping survives a
    /// partial external time source.  Not atomic with respect to unrelated
    /// clock readers outside this component.
    fn write_local(&mut self, dt: DateTime);
}

// ───────────────────────────────────────────────────────────────
// NTP client port (driven adapter: domain ↔ network time client)
// ───────────────────────────────────────────────────────────────

/// Boundary to the opaque NTP client.  Protocol details (DNS, UDP
/// exchange, retry) live behind this trait.
pub trait NetTimePort {
    /// Start (or restart) the client against `server`.
    /// `reset_first` discards any in-flight exchange before starting.
    fn start(&mut self, server: &str, reset_first: bool);

    /// Point the client at a different server without restarting it;
    /// takes effect on the next scheduled sync.
    fn set_server(&mut self, server: &str);

    /// Apply a POSIX TZ rule; affects how the client renders local time.
    fn set_timezone(&mut self, rule: &str);

    /// How often the client re-syncs on its own (seconds).
    fn set_sync_interval(&mut self, secs: u16);

    /// Per-request response timeout (milliseconds).
    fn set_timeout(&mut self, ms: u16);

    /// Unix epoch of the last completed sync, `0` if none ever completed.
    fn last_sync_epoch(&self) -> i64;

    /// Last reading's time as 'HH:MM:SS' text.
    fn time_text(&self) -> heapless::String<16>;

    /// Last reading's date as 'DD/MM/YYYY' text.
    fn date_text(&self) -> heapless::String<16>;

    /// Most recent network time, or the unset sentinel if no sync has ever
    /// completed or the client's text could not be parsed.
    ///
    /// A parse failure yields unset rather than a partially-filled value.
    fn read_network_time(&self) -> DateTime {
        if self.last_sync_epoch() == 0 {
            return DateTime::unset();
        }
        let time = self.time_text();
        let date = self.date_text();
        match (parse_time_text(&time), parse_date_text(&date)) {
            (Ok((hour, minute, second)), Ok((day, month, year))) => {
                DateTime::new(year, month, day, hour, minute, second)
            }
            _ => {
                log::warn!("ntp: unparseable reading '{date}' '{time}'");
                DateTime::unset()
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Settings port (driven adapter: domain ↔ persistent settings)
// ───────────────────────────────────────────────────────────────

/// Read side of the settings store.  This component never writes settings;
/// the settings task owns the write path and announces changes with a
/// `ConfigurationChanged` bus message.
pub trait ConfigPort {
    /// Load the sync configuration.
    /// Returns [`SyncConfig::default()`] if nothing is stored yet.
    fn load(&self) -> Result<SyncConfig, ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Message sink port (driven adapter: domain → message bus)
// ───────────────────────────────────────────────────────────────

/// Outbound side of the message bus.  The manager emits
/// [`Message`]s through this port; the adapter hands them to the
/// communication layer (or just logs them in simulation).
pub trait MessageSink {
    fn send(&mut self, message: &Message);
}
