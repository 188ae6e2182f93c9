//! Sync event bridge — marshals NTP client callbacks onto the event stream.
//!
//! The NTP client delivers sync-completion notifications via a callback
//! that may run inside network-stack internals, on an execution context the
//! manager does not own.  To preserve the single-writer rule on manager
//! state, the bridge never calls into the manager: it reads the completed
//! network time, packs it, and posts a self-addressed
//! `NetworkSyncCompleted` message onto the [`EventQueue`].  The manager
//! picks it up later on its own sequential stream.
//!
//! Only successful outcomes cross the bridge.  No-response, bad-server and
//! similar failures are dropped: downstream observers cannot distinguish
//! "never synced" from "sync failed after having succeeded once", and that
//! asymmetry is intentional — the last-known time stays good.

use log::{debug, warn};

use crate::app::messages::Message;
use crate::app::ports::NetTimePort;
use crate::events::{Event, EventQueue};

/// Outcome reported by the NTP client's sync callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Full sync against the server.
    FullSync,
    /// Sync completed outside the accuracy threshold.
    PartialSync,
    /// Request sent, no answer within the timeout.
    NoResponse,
    /// Server name did not resolve.
    InvalidServer,
    /// Server answered with an invalid address.
    InvalidAddress,
    /// Request dispatched, result pending.
    RequestSent,
}

/// Bridges foreign-context NTP callbacks into the manager's event stream.
pub struct SyncEventBridge<'q> {
    events: &'q EventQueue,
}

impl<'q> SyncEventBridge<'q> {
    pub fn new(events: &'q EventQueue) -> Self {
        Self { events }
    }

    /// NTP sync callback entry point.  May run on a foreign execution
    /// context; touches nothing but the event queue.
    pub fn on_sync_outcome(&self, outcome: SyncOutcome, net: &impl NetTimePort) {
        match outcome {
            SyncOutcome::FullSync | SyncOutcome::PartialSync => {
                let reading = net.read_network_time();
                let word = match reading.encode() {
                    Ok(word) => word,
                    Err(e) => {
                        warn!("bridge: dropping sync event, {e}");
                        return;
                    }
                };
                if !self
                    .events
                    .post(Event::Bus(Message::network_sync_completed(word)))
                {
                    warn!("bridge: event queue full, sync event dropped");
                }
            }
            other => {
                debug!("bridge: ignoring sync outcome {other:?}");
            }
        }
    }
}
