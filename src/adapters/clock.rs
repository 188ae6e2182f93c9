//! Device wall-clock adapter.
//!
//! Implements [`ClockPort`] against the process-wide clock.
//!
//! - **`target_os = "espidf"`** — newlib `time`/`localtime_r` for reads and
//!   `mktime`/`settimeofday` for writes.  The write path patches calendar
//!   fields into a freshly read `tm` snapshot so the DST bookkeeping the OS
//!   tracks (`tm_isdst`) is not clobbered by a date/time-only time source.
//! - **all other targets** — an in-memory clock for host tests and
//!   simulation.

use crate::app::ports::ClockPort;
use crate::datetime::DateTime;

/// Wall-clock adapter for the ESP32 platform.
pub struct EspClockAdapter {
    #[cfg(not(target_os = "espidf"))]
    now: DateTime,
}

impl EspClockAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            now: DateTime::unset(),
        }
    }
}

impl Default for EspClockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF backend
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl ClockPort for EspClockAdapter {
    fn read_local(&self) -> DateTime {
        use esp_idf_svc::sys::{localtime_r, time, time_t, tm};

        let mut now: time_t = 0;
        // SAFETY: plain newlib calls with stack-local out parameters.
        unsafe {
            time(&mut now);
        }
        let mut local: tm = unsafe { core::mem::zeroed() };
        if unsafe { localtime_r(&now, &mut local) }.is_null() {
            return DateTime::unset();
        }

        DateTime {
            year: (local.tm_year + 1900) as u16,
            month: (local.tm_mon + 1) as u8,
            day: local.tm_mday as u8,
            hour: local.tm_hour as u8,
            minute: local.tm_min as u8,
            second: local.tm_sec as u8,
        }
    }

    fn write_local(&mut self, dt: DateTime) {
        use esp_idf_svc::sys::{localtime_r, mktime, settimeofday, time, time_t, timeval, tm};

        // Read a fresh snapshot first: tm_isdst (and anything else newlib
        // tracks) must survive the field overlay.
        let mut now: time_t = 0;
        unsafe {
            time(&mut now);
        }
        let mut local: tm = unsafe { core::mem::zeroed() };
        if unsafe { localtime_r(&now, &mut local) }.is_null() {
            log::warn!("clock: localtime_r failed, write skipped");
            return;
        }

        local.tm_mday = i32::from(dt.day);
        local.tm_mon = i32::from(dt.month) - 1;
        local.tm_year = i32::from(dt.year) - 1900;
        local.tm_hour = i32::from(dt.hour);
        local.tm_min = i32::from(dt.minute);
        local.tm_sec = i32::from(dt.second);

        let new_time = unsafe { mktime(&mut local) };
        let tv = timeval {
            tv_sec: new_time,
            tv_usec: 0,
        };
        // Not atomic with respect to unrelated clock readers; the manager
        // only guarantees single ownership of its own state.
        if unsafe { settimeofday(&tv, core::ptr::null()) } != 0 {
            log::warn!("clock: settimeofday failed");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host-simulation backend
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl ClockPort for EspClockAdapter {
    fn read_local(&self) -> DateTime {
        self.now
    }

    fn write_local(&mut self, dt: DateTime) {
        self.now = dt;
    }
}
