//! Integration tests for the TimeSyncService event handling.
//!
//! These drive the manager exactly the way the event loop does — one
//! handler call per event — and assert on the recorded port interactions.

use crate::mock_ports::{MockClock, MockNtp, MockSettings, NtpCall, RecordingSink};

use clocksync::app::messages::{Address, Message, MessageKind};
use clocksync::app::ports::ClockPort;
use clocksync::app::service::{SyncState, TimeSyncService};
use clocksync::config::{SyncConfig, NTP_SERVERS, TIMEZONES};
use clocksync::datetime::DateTime;

fn dt(hour: u8, minute: u8, second: u8) -> DateTime {
    DateTime::new(2025, 8, 23, hour, minute, second)
}

fn synced_manager(clock: &MockClock) -> TimeSyncService {
    let mut manager = TimeSyncService::new(SyncConfig::default(), clock);
    let mut scratch_clock = MockClock::at(clock.read_local());
    let word = clock.read_local().encode().unwrap();
    let mut ntp = MockNtp::new();
    let settings = MockSettings::with(SyncConfig::default());
    let mut sink = RecordingSink::new();
    manager.handle_message(
        &Message::network_sync_completed(word),
        &mut scratch_clock,
        &mut ntp,
        &settings,
        &mut sink,
    );
    assert_eq!(manager.state(), SyncState::Synced);
    manager
}

// ── Unsynced behaviour ────────────────────────────────────────

#[test]
fn never_notifies_before_first_sync() {
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = TimeSyncService::new(SyncConfig::default(), &clock);
    let mut sink = RecordingSink::new();

    for minute in 16..30 {
        clock.now = dt(10, minute, 1);
        manager.handle_tick(&clock, &mut sink);
    }

    assert_eq!(manager.state(), SyncState::Unsynced);
    assert!(sink.sent.is_empty());
}

#[test]
fn connectivity_starts_client_with_configured_server() {
    let clock = MockClock::at(dt(9, 0, 0));
    let config = SyncConfig {
        server_index: 1,
        timezone_index: 0,
    };
    let mut manager = TimeSyncService::new(config, &clock);
    let mut clock = clock;
    let mut ntp = MockNtp::new();
    let settings = MockSettings::with(config);
    let mut sink = RecordingSink::new();

    manager.handle_message(
        &Message::connectivity_established(),
        &mut clock,
        &mut ntp,
        &settings,
        &mut sink,
    );

    assert_eq!(
        ntp.calls,
        vec![NtpCall::Start {
            server: NTP_SERVERS[1].to_owned(),
            reset_first: false,
        }]
    );
}

#[test]
fn connectivity_restart_is_idempotent_when_synced() {
    let clock = MockClock::at(dt(9, 0, 0));
    let mut manager = synced_manager(&clock);
    let mut clock = clock;
    let mut ntp = MockNtp::new();
    let settings = MockSettings::with(SyncConfig::default());
    let mut sink = RecordingSink::new();

    manager.handle_message(
        &Message::connectivity_established(),
        &mut clock,
        &mut ntp,
        &settings,
        &mut sink,
    );
    manager.handle_message(
        &Message::connectivity_established(),
        &mut clock,
        &mut ntp,
        &settings,
        &mut sink,
    );

    assert_eq!(ntp.start_calls(), 2);
    assert_eq!(manager.state(), SyncState::Synced);
}

// ── Sync-completed handling ───────────────────────────────────

#[test]
fn first_sync_latches_synced_and_sets_clock() {
    let mut clock = MockClock::at(dt(0, 0, 5));
    let mut manager = TimeSyncService::new(SyncConfig::default(), &clock);
    let mut ntp = MockNtp::new();
    let settings = MockSettings::with(SyncConfig::default());
    let mut sink = RecordingSink::new();

    let network_time = DateTime::new(2023, 12, 25, 0, 23, 56);
    let word = network_time.encode().unwrap();
    manager.handle_message(
        &Message::network_sync_completed(word),
        &mut clock,
        &mut ntp,
        &settings,
        &mut sink,
    );

    assert_eq!(manager.state(), SyncState::Synced);
    assert_eq!(clock.writes, vec![network_time]);
}

#[test]
fn synced_is_permanent_across_any_event_sequence() {
    let mut clock = MockClock::at(dt(12, 0, 0));
    let mut manager = synced_manager(&clock);
    let mut ntp = MockNtp::new();
    let settings = MockSettings::with(SyncConfig::default());
    let mut sink = RecordingSink::new();

    // Unset sync payload, config churn, connectivity flaps: none of it
    // may return the manager to Unsynced.
    let events = [
        Message::network_sync_completed(0),
        Message::configuration_changed(),
        Message::connectivity_established(),
        Message::configuration_changed(),
    ];
    for message in &events {
        manager.handle_message(message, &mut clock, &mut ntp, &settings, &mut sink);
        assert_eq!(manager.state(), SyncState::Synced);
    }
}

#[test]
fn unset_sync_payload_does_not_touch_clock_or_debounce() {
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = synced_manager(&clock);
    let last = manager.last_notified();
    let mut ntp = MockNtp::new();
    let settings = MockSettings::with(SyncConfig::default());
    let mut sink = RecordingSink::new();

    manager.handle_message(
        &Message::network_sync_completed(0),
        &mut clock,
        &mut ntp,
        &settings,
        &mut sink,
    );

    assert!(clock.writes.is_empty());
    assert_eq!(manager.last_notified(), last);
    assert!(sink.sent.is_empty());
}

// ── Minute debounce ───────────────────────────────────────────

#[test]
fn same_minute_ticks_emit_nothing() {
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = synced_manager(&clock);
    let mut sink = RecordingSink::new();

    clock.now = dt(10, 15, 59);
    manager.handle_tick(&clock, &mut sink);
    assert!(sink.sent.is_empty());
    assert_eq!(manager.last_notified(), dt(10, 15, 0));
}

#[test]
fn minute_rollover_emits_exactly_one_notification() {
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = synced_manager(&clock);
    let mut sink = RecordingSink::new();

    clock.now = dt(10, 16, 1);
    manager.handle_tick(&clock, &mut sink);
    // Further ticks inside 10:16 stay quiet.
    clock.now = dt(10, 16, 2);
    manager.handle_tick(&clock, &mut sink);
    clock.now = dt(10, 16, 59);
    manager.handle_tick(&clock, &mut sink);

    assert_eq!(sink.time_changes(), vec![dt(10, 16, 1)]);
    assert_eq!(manager.last_notified(), dt(10, 16, 1));
}

#[test]
fn notification_goes_to_the_display_task() {
    let mut clock = MockClock::at(dt(7, 59, 30));
    let mut manager = synced_manager(&clock);
    let mut sink = RecordingSink::new();

    clock.now = dt(8, 0, 0);
    manager.handle_tick(&clock, &mut sink);

    let message = sink.sent[0];
    assert_eq!(message.source, Address::TimeManager);
    assert_eq!(message.destination, Address::DisplayManager);
    assert!(matches!(message.kind, MessageKind::LocalTimeChanged { .. }));
}

#[test]
fn hour_change_alone_triggers_notification() {
    // 10:15 → 11:15: minute field equal, hour differs.
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = synced_manager(&clock);
    let mut sink = RecordingSink::new();

    clock.now = dt(11, 15, 0);
    manager.handle_tick(&clock, &mut sink);
    assert_eq!(sink.time_changes(), vec![dt(11, 15, 0)]);
}

#[test]
fn encode_failure_drops_notification_and_retries_next_tick() {
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = synced_manager(&clock);
    let mut sink = RecordingSink::new();

    // A year outside the packed range cannot be notified.
    clock.now = DateTime::new(2095, 8, 23, 10, 16, 0);
    manager.handle_tick(&clock, &mut sink);
    assert!(sink.sent.is_empty());
    assert_eq!(manager.last_notified(), dt(10, 15, 0));

    // Clock healed: the very next tick delivers the update.
    clock.now = dt(10, 16, 30);
    manager.handle_tick(&clock, &mut sink);
    assert_eq!(sink.time_changes(), vec![dt(10, 16, 30)]);
}

// ── Configuration changes ─────────────────────────────────────

#[test]
fn server_change_renames_client_without_restart() {
    let mut clock = MockClock::at(dt(10, 0, 0));
    let mut manager = synced_manager(&clock);
    let settings = MockSettings::with(SyncConfig::default());
    let mut ntp = MockNtp::new();
    let mut sink = RecordingSink::new();

    settings.update(SyncConfig {
        server_index: 2,
        timezone_index: 0,
    });
    manager.handle_message(
        &Message::configuration_changed(),
        &mut clock,
        &mut ntp,
        &settings,
        &mut sink,
    );

    assert_eq!(ntp.calls, vec![NtpCall::SetServer(NTP_SERVERS[2].to_owned())]);
    assert!(clock.writes.is_empty());
    assert!(sink.sent.is_empty());
    assert_eq!(manager.config().server_index, 2);
}

#[test]
fn timezone_change_while_synced_reapplies_time_immediately() {
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = synced_manager(&clock);
    let settings = MockSettings::with(SyncConfig::default());
    let mut ntp = MockNtp::new();
    let mut sink = RecordingSink::new();

    // Client re-renders its reading under the new rule: one hour later.
    ntp.complete_sync(1_755_943_200, "11:16:40", "23/08/2025");

    settings.update(SyncConfig {
        server_index: 0,
        timezone_index: 2,
    });
    manager.handle_message(
        &Message::configuration_changed(),
        &mut clock,
        &mut ntp,
        &settings,
        &mut sink,
    );

    assert!(ntp
        .calls
        .contains(&NtpCall::SetTimezone(TIMEZONES[2].to_owned())));
    let shifted = DateTime::new(2025, 8, 23, 11, 16, 40);
    assert_eq!(clock.writes, vec![shifted]);
    // Notification fires without waiting for the next periodic tick.
    assert_eq!(sink.time_changes(), vec![shifted]);
    assert_eq!(manager.last_notified(), shifted);
}

#[test]
fn timezone_change_while_unsynced_only_reconfigures_client() {
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = TimeSyncService::new(SyncConfig::default(), &clock);
    let settings = MockSettings::with(SyncConfig::default());
    let mut ntp = MockNtp::new();
    let mut sink = RecordingSink::new();

    settings.update(SyncConfig {
        server_index: 0,
        timezone_index: 3,
    });
    manager.handle_message(
        &Message::configuration_changed(),
        &mut clock,
        &mut ntp,
        &settings,
        &mut sink,
    );

    assert_eq!(
        ntp.calls,
        vec![NtpCall::SetTimezone(TIMEZONES[3].to_owned())]
    );
    assert!(clock.writes.is_empty());
    assert!(sink.sent.is_empty());
}

#[test]
fn unchanged_config_is_a_noop() {
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = synced_manager(&clock);
    let settings = MockSettings::with(SyncConfig::default());
    let mut ntp = MockNtp::new();
    let mut sink = RecordingSink::new();

    manager.handle_message(
        &Message::configuration_changed(),
        &mut clock,
        &mut ntp,
        &settings,
        &mut sink,
    );

    assert!(ntp.calls.is_empty());
    assert!(sink.sent.is_empty());
}

#[test]
fn unexpected_inbound_message_is_ignored() {
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = synced_manager(&clock);
    let settings = MockSettings::with(SyncConfig::default());
    let mut ntp = MockNtp::new();
    let mut sink = RecordingSink::new();

    // A LocalTimeChanged routed here by mistake is not something this task
    // consumes; it must be dropped without touching any port or state.
    let stray = Message::local_time_changed(dt(9, 0, 0).encode().unwrap());
    manager.handle_message(&stray, &mut clock, &mut ntp, &settings, &mut sink);

    assert_eq!(manager.state(), SyncState::Synced);
    assert_eq!(manager.last_notified(), dt(10, 15, 0));
    assert!(clock.writes.is_empty());
    assert!(ntp.calls.is_empty());
    assert!(sink.sent.is_empty());
}

#[test]
fn settings_load_failure_keeps_previous_config() {
    let mut clock = MockClock::at(dt(10, 15, 0));
    let mut manager = synced_manager(&clock);
    let settings = MockSettings::with(SyncConfig::default());
    let mut ntp = MockNtp::new();
    let mut sink = RecordingSink::new();

    settings.fail_next_load();
    manager.handle_message(
        &Message::configuration_changed(),
        &mut clock,
        &mut ntp,
        &settings,
        &mut sink,
    );

    assert!(ntp.calls.is_empty());
    assert_eq!(manager.config(), SyncConfig::default());
}
