//! Message-bus types consumed and produced by the time-sync manager.
//!
//! The surrounding firmware routes messages between tasks by address.  This
//! component consumes `ConnectivityEstablished`, `NetworkSyncCompleted` and
//! `ConfigurationChanged`, and produces `LocalTimeChanged` for the display
//! task plus a self-addressed `NetworkSyncCompleted` posted by the
//! [`SyncEventBridge`](crate::bridge::SyncEventBridge).

/// Task addresses on the firmware message bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    TimeManager,
    DisplayManager,
    WifiManager,
    SettingsManager,
}

/// Message payloads.  Time values travel as the packed 32-bit word
/// (see [`DateTime::encode`](crate::datetime::DateTime::encode)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// The network link came up; the NTP client can be started.
    ConnectivityEstablished,
    /// An NTP sync completed; payload is the packed network time.
    NetworkSyncCompleted { encoded_time: u32 },
    /// Server/timezone settings changed in the settings store.
    ConfigurationChanged,
    /// The wall-clock minute changed; payload is the packed local time.
    LocalTimeChanged { encoded_time: u32 },
}

/// One routed bus message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub source: Address,
    pub destination: Address,
    pub kind: MessageKind,
}

impl Message {
    /// Minute-change notification addressed to the display task.
    pub fn local_time_changed(encoded_time: u32) -> Self {
        Self {
            source: Address::TimeManager,
            destination: Address::DisplayManager,
            kind: MessageKind::LocalTimeChanged { encoded_time },
        }
    }

    /// Self-addressed sync-completed event, posted by the bridge so the
    /// manager handles it on its own sequential stream.
    pub fn network_sync_completed(encoded_time: u32) -> Self {
        Self {
            source: Address::TimeManager,
            destination: Address::TimeManager,
            kind: MessageKind::NetworkSyncCompleted { encoded_time },
        }
    }

    /// Connectivity-up status, as the WiFi task would send it.
    pub fn connectivity_established() -> Self {
        Self {
            source: Address::WifiManager,
            destination: Address::TimeManager,
            kind: MessageKind::ConnectivityEstablished,
        }
    }

    /// Settings-changed broadcast, as the settings task would send it.
    pub fn configuration_changed() -> Self {
        Self {
            source: Address::SettingsManager,
            destination: Address::TimeManager,
            kind: MessageKind::ConfigurationChanged,
        }
    }
}
