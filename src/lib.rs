//! ClockSync firmware library.
//!
//! Keeps the device wall-clock in sync with an NTP source and notifies the
//! rest of the system when the displayed minute changes.  Exposes the
//! pure-logic modules for integration testing and external inspection.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod bridge;
pub mod config;
pub mod datetime;
pub mod events;

pub mod error;

// Adapters compile on every target; the actual ESP-IDF implementations are
// guarded by cfg attributes inside.
pub mod adapters;
