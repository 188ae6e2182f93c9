//! Application core — pure time-synchronization logic, zero I/O.
//!
//! This module contains the manager state machine and the message types it
//! exchanges with the rest of the system.  All interaction with the device
//! wall-clock, the NTP client, and the settings store happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real hardware or network.

pub mod messages;
pub mod ports;
pub mod service;
