//! The manager's sequential event stream.
//!
//! Every input reaches the manager through one FIFO queue: the periodic
//! tick and all inbound bus messages.  A single consumer (the manager's
//! event loop) drains it one event at a time, so manager state never sees
//! concurrent access.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Tick timer   │────▶│              │     │              │
//! │ Bridge (NTP  │────▶│  EventQueue  │────▶│  Event loop  │
//! │  callback)   │     │  (MPSC)      │     │  (consumer)  │
//! │ Message bus  │────▶│              │     │              │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Producers may run on foreign execution contexts — the NTP client invokes
//! its sync callback from network-stack internals — so the queue is an
//! `embassy-sync` channel over a critical-section mutex: `post` is safe
//! from any context and never blocks.  A full queue drops the event; the
//! next periodic tick self-heals any missed time update.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::messages::Message;

/// Maximum number of pending events.  Steady state holds at most one tick
/// plus a handful of bus messages.
const EVENT_QUEUE_CAP: usize = 16;

/// One unit of work for the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Periodic timer fired (1 s interval).
    Tick,
    /// A bus message arrived (from the router or self-posted by the bridge).
    Bus(Message),
}

/// Multi-producer, single-consumer FIFO event queue.
///
/// Held in a `static` by the binary so timer callbacks and the bridge can
/// post to it; tests construct their own instances.
pub struct EventQueue {
    channel: Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_CAP>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue an event.  Safe to call from any execution context.
    /// Returns `false` if the queue is full (event dropped).
    pub fn post(&self, event: Event) -> bool {
        self.channel.try_send(event).is_ok()
    }

    /// Dequeue the next event, `None` if the queue is empty.
    /// Called only by the single consumer.
    pub fn try_next(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// Drain all pending events into a handler, in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.try_next() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
