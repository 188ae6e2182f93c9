//! Time synchronization service — the hexagonal core.
//!
//! [`TimeSyncService`] owns the sync state machine: sync status, the
//! server/timezone configuration and the debounced minute-change detection.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!   ClockPort ◀──┐ ┌────────────────────────┐ ──▶ MessageSink
//!                ├─│    TimeSyncService      │
//! NetTimePort ◀──┘ │  Unsynced ──▶ Synced    │
//!                  └────────────────────────┘
//!                          ▲ ConfigPort
//! ```
//!
//! The service is driven exclusively from the sequential event stream:
//! one call to [`handle_tick`](TimeSyncService::handle_tick) or
//! [`handle_message`](TimeSyncService::handle_message) per event, never
//! concurrently.

use log::{debug, info, warn};

use crate::config::{SyncConfig, NTP_SYNC_PERIOD_SECS, NTP_TIMEOUT_MS};
use crate::datetime::DateTime;

use super::messages::{Message, MessageKind};
use super::ports::{ClockPort, ConfigPort, MessageSink, NetTimePort};

/// Synchronization status.  `Unsynced` is initial; `Synced` is absorbing —
/// no event sequence returns the service to `Unsynced` (there is no
/// "sync lost" signal in this design).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unsynced,
    Synced,
}

/// The manager state machine.  Single logical owner of all mutable
/// time-sync state.
pub struct TimeSyncService {
    state: SyncState,
    /// Last time value sent downstream, minute-debounce reference.
    last_notified: DateTime,
    config: SyncConfig,
}

impl TimeSyncService {
    /// Construct the service.  `last_notified` starts at the current
    /// wall-clock reading so a boot inside an already-correct minute does
    /// not produce a spurious notification.
    pub fn new(config: SyncConfig, clock: &impl ClockPort) -> Self {
        Self {
            state: SyncState::Unsynced,
            last_notified: clock.read_local(),
            config,
        }
    }

    /// Push initial parameters into the NTP client: timezone rule from
    /// config, client-side re-sync period and response timeout.
    pub fn init(&self, net: &mut impl NetTimePort) {
        net.set_timezone(self.config.timezone());
        net.set_sync_interval(NTP_SYNC_PERIOD_SECS);
        net.set_timeout(NTP_TIMEOUT_MS);
        info!(
            "timesync: init server='{}' tz='{}'",
            self.config.server(),
            self.config.timezone()
        );
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_synced(&self) -> bool {
        self.state == SyncState::Synced
    }

    pub fn last_notified(&self) -> DateTime {
        self.last_notified
    }

    pub fn config(&self) -> SyncConfig {
        self.config
    }

    // ── Event handlers (sequential stream only) ───────────────

    /// Periodic tick: emit a `LocalTimeChanged` notification when the
    /// wall-clock hour or minute differs from the last notified value.
    ///
    /// Nothing is emitted before the first sync, and repeated ticks inside
    /// the same minute emit nothing — downstream traffic is bounded to one
    /// message per calendar minute.
    pub fn handle_tick(&mut self, clock: &impl ClockPort, sink: &mut impl MessageSink) {
        if self.state != SyncState::Synced {
            return;
        }

        let now = clock.read_local();
        if now.same_minute(&self.last_notified) {
            return;
        }

        match now.encode() {
            Ok(word) => {
                debug!("timesync: minute changed, notifying {now}");
                sink.send(&Message::local_time_changed(word));
                self.last_notified = now;
            }
            Err(e) => {
                // No partial message; last_notified stays put so the next
                // tick retries.
                warn!("timesync: notification dropped, {e}");
            }
        }
    }

    /// Process one inbound bus message.
    pub fn handle_message(
        &mut self,
        message: &Message,
        clock: &mut impl ClockPort,
        net: &mut impl NetTimePort,
        settings: &impl ConfigPort,
        sink: &mut impl MessageSink,
    ) {
        match message.kind {
            MessageKind::ConnectivityEstablished => {
                info!("timesync: link up, starting NTP against '{}'", self.config.server());
                net.start(self.config.server(), false);
            }

            MessageKind::NetworkSyncCompleted { encoded_time } => {
                self.on_sync_completed(encoded_time, clock);
            }

            MessageKind::ConfigurationChanged => {
                self.on_config_changed(clock, net, settings, sink);
            }

            other => {
                debug!("timesync: ignoring unexpected message {other:?}");
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Sync event from the bridge: latch `Synced` and apply the carried
    /// network time to the wall-clock.
    fn on_sync_completed(&mut self, encoded_time: u32, clock: &mut impl ClockPort) {
        if self.state != SyncState::Synced {
            info!("timesync: first NTP sync completed");
            self.state = SyncState::Synced;
        }

        match DateTime::decode(encoded_time) {
            Ok(dt) if !dt.is_unset() => {
                debug!("timesync: applying network time {dt}");
                clock.write_local(dt);
            }
            Ok(_) => {
                // Unset sentinel: the client's reading failed to parse
                // upstream. Keep the clock and last_notified untouched.
                debug!("timesync: sync event carried no usable time");
            }
            Err(e) => {
                warn!("timesync: sync payload rejected, {e}");
            }
        }
    }

    /// Settings changed: re-read the configuration and apply the delta.
    ///
    /// Server change only renames the client's server; the client picks it
    /// up on its next scheduled sync — no restart, timezone not re-pushed.
    /// Timezone-only change re-applies the network time immediately so the
    /// display does not wait out the current minute under the old zone.
    fn on_config_changed(
        &mut self,
        clock: &mut impl ClockPort,
        net: &mut impl NetTimePort,
        settings: &impl ConfigPort,
        sink: &mut impl MessageSink,
    ) {
        let new = match settings.load() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("timesync: settings reload failed, {e}");
                return;
            }
        };

        if new.server_index != self.config.server_index {
            self.config = new;
            info!("timesync: NTP server changed to '{}'", self.config.server());
            net.set_server(self.config.server());
        } else if new.timezone_index != self.config.timezone_index {
            self.config = new;
            info!("timesync: timezone changed to '{}'", self.config.timezone());
            net.set_timezone(self.config.timezone());

            if self.state == SyncState::Synced {
                let reading = net.read_network_time();
                if reading.is_unset() {
                    warn!("timesync: no network time to re-apply after tz change");
                } else {
                    clock.write_local(reading);
                }
                // Re-evaluate immediately instead of waiting for the next
                // tick; the debounce still applies.
                self.handle_tick(clock, sink);
            }
        }
    }
}
