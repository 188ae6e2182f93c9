//! ClockSync firmware — main entry point.
//!
//! Hexagonal architecture with a single sequential event stream.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                   │
//! │                                                            │
//! │  EspClockAdapter  EspNtpAdapter  SettingsAdapter           │
//! │  (ClockPort)      (NetTimePort)  (ConfigPort)              │
//! │  LogMessageSink   SyncEventBridge (SNTP callback)          │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ──────────────────    │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │        TimeSyncService (pure logic)              │      │
//! │  │  Unsynced/Synced · minute debounce · config      │      │
//! │  └──────────────────────────────────────────────────┘      │
//! │                                                            │
//! │  EventQueue (tick + bus messages, one consumer)            │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use clocksync::adapters::clock::EspClockAdapter;
use clocksync::adapters::log_sink::LogMessageSink;
use clocksync::adapters::ntp::EspNtpAdapter;
use clocksync::adapters::settings::SettingsAdapter;
use clocksync::app::ports::ConfigPort;
use clocksync::app::service::TimeSyncService;
use clocksync::config::{SyncConfig, TICK_PERIOD_MS};
use clocksync::events::{Event, EventQueue};

/// The manager's sequential event stream.  Static so the SNTP callback
/// (foreign execution context) can post into it.
static EVENTS: EventQueue = EventQueue::new();

// ── SNTP sync notification ────────────────────────────────────
//
// The SNTP client invokes its notification callback from the lwIP
// context, never from the manager's loop.  The trampoline below is the
// one piece of code that runs there: it records the sync epoch and lets
// the bridge post a self-addressed NetworkSyncCompleted event.  Manager
// state is never touched from here.

#[cfg(target_os = "espidf")]
mod sync_callback {
    use core::sync::atomic::{AtomicI64, Ordering};

    use clocksync::adapters::ntp::{local_date_text, local_time_text};
    use clocksync::app::ports::NetTimePort;
    use clocksync::bridge::{SyncEventBridge, SyncOutcome};
    use esp_idf_svc::sys::{esp_sntp_set_time_sync_notification_cb, timeval};

    static LAST_SYNC: AtomicI64 = AtomicI64::new(0);

    pub fn register() {
        // SAFETY: registering a plain function pointer; the callback only
        // touches atomics and the event queue.
        unsafe {
            esp_sntp_set_time_sync_notification_cb(Some(on_time_sync));
        }
    }

    pub fn last_sync_epoch() -> i64 {
        LAST_SYNC.load(Ordering::Relaxed)
    }

    /// Read-only view of the just-synced clock for the bridge.  By the
    /// time the notification fires the client has already stepped the
    /// system clock, so rendering local time is rendering the reading.
    struct SntpView;

    impl NetTimePort for SntpView {
        fn start(&mut self, _server: &str, _reset_first: bool) {}
        fn set_server(&mut self, _server: &str) {}
        fn set_timezone(&mut self, _rule: &str) {}
        fn set_sync_interval(&mut self, _secs: u16) {}
        fn set_timeout(&mut self, _ms: u16) {}

        fn last_sync_epoch(&self) -> i64 {
            LAST_SYNC.load(Ordering::Relaxed)
        }

        fn time_text(&self) -> heapless::String<16> {
            local_time_text()
        }

        fn date_text(&self) -> heapless::String<16> {
            local_date_text()
        }
    }

    unsafe extern "C" fn on_time_sync(tv: *mut timeval) {
        let epoch = if tv.is_null() {
            0
        } else {
            // SAFETY: the client hands a valid timeval for the sync instant.
            unsafe { (*tv).tv_sec as i64 }
        };
        LAST_SYNC.store(epoch, Ordering::Relaxed);

        SyncEventBridge::new(&super::EVENTS).on_sync_outcome(SyncOutcome::FullSync, &SntpView);
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    info!("clocksync v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Load sync configuration from the settings store ────
    let settings = SettingsAdapter::new()
        .map_err(|e| anyhow::anyhow!("settings store initialisation failed: {e}"))?;
    let config = match settings.load() {
        Ok(cfg) => {
            info!("Config loaded (server_index={}, timezone_index={})", cfg.server_index, cfg.timezone_index);
            cfg
        }
        Err(e) => {
            warn!("Config load failed ({e}), using defaults");
            SyncConfig::default()
        }
    };

    // ── 3. Construct adapters ─────────────────────────────────
    let mut clock = EspClockAdapter::new();
    let mut ntp = EspNtpAdapter::new();
    let mut sink = LogMessageSink::new();

    // ── 4. Construct the manager and tune the NTP client ──────
    let mut manager = TimeSyncService::new(config, &clock);
    manager.init(&mut ntp);
    info!(
        "NTP tuning: interval={}s timeout={}ms",
        ntp.sync_interval_secs(),
        ntp.timeout_ms()
    );

    // ── 5. Wire the foreign-context sync callback ─────────────
    #[cfg(target_os = "espidf")]
    sync_callback::register();

    // Inbound routing note: the communication manager delivers
    // ConnectivityEstablished and ConfigurationChanged to this task by
    // posting Event::Bus(..) into EVENTS; registration of this task's
    // address lives with the router, not here.

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        std::thread::sleep(Duration::from_millis(u64::from(TICK_PERIOD_MS)));
        if !EVENTS.post(Event::Tick) {
            warn!("Tick dropped, event queue full");
        }

        // Mirror the callback-recorded sync epoch into the adapter so the
        // timezone-change path can re-read the network time.
        #[cfg(target_os = "espidf")]
        ntp.note_sync(sync_callback::last_sync_epoch());

        EVENTS.drain(|event| match event {
            Event::Tick => manager.handle_tick(&clock, &mut sink),
            Event::Bus(message) => {
                manager.handle_message(&message, &mut clock, &mut ntp, &settings, &mut sink);
            }
        });
    }
}
