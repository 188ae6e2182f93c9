//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                       |
//! |------------|---------------|-----------------------------------|
//! | `clock`    | ClockPort     | ESP-IDF newlib wall-clock         |
//! | `ntp`      | NetTimePort   | ESP-IDF SNTP client               |
//! | `settings` | ConfigPort    | NVS / in-memory settings store    |
//! | `log_sink` | MessageSink   | Serial log output                 |
//!
//! Each adapter carries a host-simulation fallback under
//! `#[cfg(not(target_os = "espidf"))]` so the whole stack runs in
//! host-target tests.

pub mod clock;
pub mod log_sink;
pub mod ntp;
pub mod settings;
