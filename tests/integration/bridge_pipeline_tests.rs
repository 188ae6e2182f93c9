//! End-to-end pipeline tests: NTP callback → bridge → event queue →
//! manager, the same path events take on the device.

use crate::mock_ports::{MockClock, MockNtp, MockSettings, RecordingSink};

use clocksync::app::service::{SyncState, TimeSyncService};
use clocksync::bridge::{SyncEventBridge, SyncOutcome};
use clocksync::config::SyncConfig;
use clocksync::datetime::DateTime;
use clocksync::events::{Event, EventQueue};

fn drain_into(
    queue: &EventQueue,
    manager: &mut TimeSyncService,
    clock: &mut MockClock,
    ntp: &mut MockNtp,
    settings: &MockSettings,
    sink: &mut RecordingSink,
) {
    queue.drain(|event| match event {
        Event::Tick => manager.handle_tick(clock, sink),
        Event::Bus(message) => manager.handle_message(&message, clock, ntp, settings, sink),
    });
}

#[test]
fn callback_outcome_reaches_manager_through_the_queue() {
    let queue = EventQueue::new();
    let mut clock = MockClock::at(DateTime::new(2025, 8, 23, 0, 0, 10));
    let mut ntp = MockNtp::new();
    let settings = MockSettings::with(SyncConfig::default());
    let mut sink = RecordingSink::new();
    let mut manager = TimeSyncService::new(SyncConfig::default(), &clock);

    // Foreign-context callback fires after a completed exchange.
    ntp.complete_sync(1_703_462_636, "00:23:56", "25/12/2023");
    SyncEventBridge::new(&queue).on_sync_outcome(SyncOutcome::FullSync, &ntp);

    // Nothing happened yet — the manager hasn't consumed its stream.
    assert_eq!(manager.state(), SyncState::Unsynced);

    drain_into(&queue, &mut manager, &mut clock, &mut ntp, &settings, &mut sink);

    assert_eq!(manager.state(), SyncState::Synced);
    assert_eq!(clock.writes, vec![DateTime::new(2023, 12, 25, 0, 23, 56)]);
}

#[test]
fn malformed_client_text_cannot_corrupt_the_manager() {
    let queue = EventQueue::new();
    let boot = DateTime::new(2025, 8, 23, 10, 15, 0);
    let mut clock = MockClock::at(boot);
    let mut ntp = MockNtp::new();
    let settings = MockSettings::with(SyncConfig::default());
    let mut sink = RecordingSink::new();
    let mut manager = TimeSyncService::new(SyncConfig::default(), &clock);

    // The client answered but its text is truncated: the reading parses to
    // unset and travels as word 0.
    ntp.complete_sync(1_755_943_200, "10:15", "23/08/2025");
    SyncEventBridge::new(&queue).on_sync_outcome(SyncOutcome::PartialSync, &ntp);

    drain_into(&queue, &mut manager, &mut clock, &mut ntp, &settings, &mut sink);

    // Synced latched, but no garbage written anywhere.
    assert_eq!(manager.state(), SyncState::Synced);
    assert!(clock.writes.is_empty());
    assert_eq!(manager.last_notified(), boot);
    assert!(sink.sent.is_empty());
}

#[test]
fn interleaved_ticks_and_sync_events_process_in_fifo_order() {
    let queue = EventQueue::new();
    let mut clock = MockClock::at(DateTime::new(2025, 8, 23, 10, 15, 0));
    let mut ntp = MockNtp::new();
    let settings = MockSettings::with(SyncConfig::default());
    let mut sink = RecordingSink::new();
    let mut manager = TimeSyncService::new(SyncConfig::default(), &clock);

    // Tick arrives first (while unsynced), then the sync event, then
    // another tick after the minute rolled over.
    queue.post(Event::Tick);
    ntp.complete_sync(1_755_943_200, "10:15:30", "23/08/2025");
    SyncEventBridge::new(&queue).on_sync_outcome(SyncOutcome::FullSync, &ntp);
    queue.post(Event::Tick);

    drain_into(&queue, &mut manager, &mut clock, &mut ntp, &settings, &mut sink);

    // First tick: still unsynced, no emission. Sync: clock stepped to
    // 10:15:30 (same minute as boot reading, debounce holds). Second
    // tick: same minute, still quiet.
    assert_eq!(manager.state(), SyncState::Synced);
    assert!(sink.sent.is_empty());

    clock.now = DateTime::new(2025, 8, 23, 10, 16, 0);
    queue.post(Event::Tick);
    drain_into(&queue, &mut manager, &mut clock, &mut ntp, &settings, &mut sink);
    assert_eq!(
        sink.time_changes(),
        vec![DateTime::new(2025, 8, 23, 10, 16, 0)]
    );
}

#[test]
fn concurrent_producers_never_lose_events() {
    // The tick timer and the bridge post from different threads; every
    // event must come out of the single consumer side exactly once.
    let queue = EventQueue::new();
    let ntp = {
        let mut n = MockNtp::new();
        n.complete_sync(1_755_943_200, "10:15:30", "23/08/2025");
        n
    };

    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..5 {
                assert!(queue.post(Event::Tick));
            }
        });
        s.spawn(|| {
            let bridge = SyncEventBridge::new(&queue);
            for _ in 0..5 {
                bridge.on_sync_outcome(SyncOutcome::FullSync, &ntp);
            }
        });
    });

    let mut ticks = 0;
    let mut syncs = 0;
    queue.drain(|event| match event {
        Event::Tick => ticks += 1,
        Event::Bus(_) => syncs += 1,
    });
    assert_eq!((ticks, syncs), (5, 5));
}
