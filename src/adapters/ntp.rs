//! SNTP client adapter.
//!
//! Implements [`NetTimePort`] over the ESP-IDF SNTP service.  The protocol
//! itself (DNS resolution, UDP exchange, retry) is the client's concern;
//! this adapter only configures it and renders its last reading.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_sntp_*` calls plus `setenv`/`tzset`
//!   for the timezone rule.
//! - **all other targets**: a scriptable simulation used by host tests —
//!   `sim_complete_sync` plants a reading the way a real sync would.

use log::info;

use crate::app::ports::NetTimePort;

/// NTP client adapter for the ESP32 platform.
pub struct EspNtpAdapter {
    started: bool,
    server: heapless::String<64>,
    timezone: heapless::String<48>,
    sync_interval_secs: u16,
    timeout_ms: u16,
    /// Unix epoch of the last completed sync, 0 = never.
    last_sync: i64,
    #[cfg(not(target_os = "espidf"))]
    sim_time_text: heapless::String<16>,
    #[cfg(not(target_os = "espidf"))]
    sim_date_text: heapless::String<16>,
    #[cfg(target_os = "espidf")]
    server_cstr: Option<std::ffi::CString>,
}

impl EspNtpAdapter {
    pub fn new() -> Self {
        Self {
            started: false,
            server: heapless::String::new(),
            timezone: heapless::String::new(),
            sync_interval_secs: 0,
            timeout_ms: 0,
            last_sync: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_time_text: heapless::String::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_date_text: heapless::String::new(),
            #[cfg(target_os = "espidf")]
            server_cstr: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn sync_interval_secs(&self) -> u16 {
        self.sync_interval_secs
    }

    pub fn timeout_ms(&self) -> u16 {
        self.timeout_ms
    }

    /// Record a completed sync.  On the device this is called from the SNTP
    /// time-sync notification before the bridge runs.
    pub fn note_sync(&mut self, epoch: i64) {
        self.last_sync = epoch;
    }

    // ── Simulation controls (host only) ──────────────────────

    /// Plant a sync reading, as if the client had just completed a sync.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_complete_sync(&mut self, epoch: i64, time_text: &str, date_text: &str) {
        self.last_sync = epoch;
        self.sim_time_text = time_text.try_into().unwrap_or_default();
        self.sim_date_text = date_text.try_into().unwrap_or_default();
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) {
        use esp_idf_svc::sys::{
            esp_sntp_init, esp_sntp_restart, esp_sntp_setoperatingmode, esp_sntp_setservername,
            esp_sntp_operatingmode_t_ESP_SNTP_OPMODE_POLL,
        };

        // esp_sntp_setservername keeps the pointer; the CString must
        // outlive the client, hence the owned field.
        let cstr = std::ffi::CString::new(self.server.as_str()).unwrap_or_default();
        // SAFETY: single-threaded configuration from the manager's context;
        // the server string is owned by self and replaced, never freed early.
        unsafe {
            esp_sntp_setoperatingmode(esp_sntp_operatingmode_t_ESP_SNTP_OPMODE_POLL);
            esp_sntp_setservername(0, cstr.as_ptr());
            if self.started {
                esp_sntp_restart();
            } else {
                esp_sntp_init();
            }
        }
        self.server_cstr = Some(cstr);
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) {
        info!("ntp(sim): client started against '{}'", self.server);
    }

    #[cfg(target_os = "espidf")]
    fn platform_set_server(&mut self) {
        use esp_idf_svc::sys::esp_sntp_setservername;

        let cstr = std::ffi::CString::new(self.server.as_str()).unwrap_or_default();
        // SAFETY: the owned CString replaces the previous one only after
        // the client has been repointed at the new buffer.
        unsafe {
            esp_sntp_setservername(0, cstr.as_ptr());
        }
        self.server_cstr = Some(cstr);
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_set_server(&mut self) {
        info!("ntp(sim): server renamed to '{}'", self.server);
    }

    #[cfg(target_os = "espidf")]
    fn platform_apply_timezone(&self) {
        use esp_idf_svc::sys::{setenv, tzset};

        let name = std::ffi::CString::new("TZ").unwrap_or_default();
        let rule = std::ffi::CString::new(self.timezone.as_str()).unwrap_or_default();
        // SAFETY: newlib setenv copies both strings.
        unsafe {
            setenv(name.as_ptr(), rule.as_ptr(), 1);
            tzset();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_apply_timezone(&self) {
        info!("ntp(sim): timezone rule '{}'", self.timezone);
    }
}

impl Default for EspNtpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl NetTimePort for EspNtpAdapter {
    fn start(&mut self, server: &str, reset_first: bool) {
        if reset_first {
            self.last_sync = 0;
        }
        self.server = server.try_into().unwrap_or_default();
        self.platform_start();
        self.started = true;
        info!("ntp: started, server='{}'", self.server);
    }

    fn set_server(&mut self, server: &str) {
        self.server = server.try_into().unwrap_or_default();
        // Name only — the running client picks it up on its next scheduled
        // sync rather than being restarted here.
        self.platform_set_server();
        info!("ntp: server name set to '{}'", self.server);
    }

    fn set_timezone(&mut self, rule: &str) {
        self.timezone = rule.try_into().unwrap_or_default();
        self.platform_apply_timezone();
    }

    fn set_sync_interval(&mut self, secs: u16) {
        self.sync_interval_secs = secs;
        #[cfg(target_os = "espidf")]
        // SAFETY: plain configuration call.
        unsafe {
            esp_idf_svc::sys::sntp_set_sync_interval(u32::from(secs) * 1000);
        }
    }

    fn set_timeout(&mut self, ms: u16) {
        // The IDF client has no per-request timeout knob; kept for the
        // port contract and surfaced in diagnostics.
        self.timeout_ms = ms;
    }

    fn last_sync_epoch(&self) -> i64 {
        self.last_sync
    }

    #[cfg(target_os = "espidf")]
    fn time_text(&self) -> heapless::String<16> {
        // The client steps the system clock on sync, so its "last reading"
        // is the current local time rendered under the active TZ rule.
        local_time_text()
    }

    #[cfg(not(target_os = "espidf"))]
    fn time_text(&self) -> heapless::String<16> {
        self.sim_time_text.clone()
    }

    #[cfg(target_os = "espidf")]
    fn date_text(&self) -> heapless::String<16> {
        local_date_text()
    }

    #[cfg(not(target_os = "espidf"))]
    fn date_text(&self) -> heapless::String<16> {
        self.sim_date_text.clone()
    }
}

/// Current local time as 'HH:MM:SS', rendered under the active TZ rule.
/// Shared with the SNTP notification path in the binary.
#[cfg(target_os = "espidf")]
pub fn local_time_text() -> heapless::String<16> {
    render_local(TextField::Time)
}

/// Current local date as 'DD/MM/YYYY'.
#[cfg(target_os = "espidf")]
pub fn local_date_text() -> heapless::String<16> {
    render_local(TextField::Date)
}

#[cfg(target_os = "espidf")]
#[derive(Clone, Copy)]
enum TextField {
    Time,
    Date,
}

#[cfg(target_os = "espidf")]
fn render_local(field: TextField) -> heapless::String<16> {
    use core::fmt::Write;
    use esp_idf_svc::sys::{localtime_r, time, time_t, tm};

    let mut now: time_t = 0;
    // SAFETY: newlib calls with stack-local out parameters.
    unsafe {
        time(&mut now);
    }
    let mut local: tm = unsafe { core::mem::zeroed() };
    if unsafe { localtime_r(&now, &mut local) }.is_null() {
        return heapless::String::new();
    }

    let mut out = heapless::String::new();
    let _ = match field {
        TextField::Date => write!(
            out,
            "{:02}/{:02}/{:04}",
            local.tm_mday,
            local.tm_mon + 1,
            local.tm_year + 1900
        ),
        TextField::Time => write!(
            out,
            "{:02}:{:02}:{:02}",
            local.tm_hour, local.tm_min, local.tm_sec
        ),
    };
    out
}
