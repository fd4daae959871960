//! Inbound signals and the events carried on the sync bus
//!
//! Inbound signals arrive already typed from the host as JSON:
//!
//! ```json
//! {"type": "accountSwitch"}
//! {"type": "event", "accountId": "...", "data": {"type": "PLAYER_STATE_CHANGED", "event": {"state": {...}}}}
//! {"type": "event", "accountId": "...", "data": {"type": "DEVICE_STATE_CHANGED", "event": {"devices": [...]}}}
//! {"type": "ready"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use spotify_modal_client::{lenient_snapshot, Device, PlaybackSnapshot};

use crate::bus::BusEvent;
use crate::store::PlaybackState;

/// Topics of the sync bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A new [`PlaybackState`] was stored
    State,
    /// The active account changed
    ActiveAccount,
    /// The player view should be shown or hidden
    ShowUpdate,
    /// Raw inbound player event
    Event,
    /// Host finished its initial handshake
    Ready,
    /// Host switched or re-logged accounts
    AccountSwitch,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::ActiveAccount => "activeAccount",
            Self::ShowUpdate => "showUpdate",
            Self::Event => "event",
            Self::Ready => "ready",
            Self::AccountSwitch => "accountSwitch",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundSignal {
    AccountSwitch,
    Event {
        #[serde(rename = "accountId")]
        account_id: String,
        data: PlayerEventData,
    },
    Ready,
}

impl InboundSignal {
    /// A `PLAYER_STATE_CHANGED` event for `account_id`
    pub fn player_state(account_id: impl Into<String>, state: Option<PlaybackSnapshot>) -> Self {
        Self::Event {
            account_id: account_id.into(),
            data: PlayerEventData::PlayerStateChanged {
                event: PlayerStatePayload { state },
            },
        }
    }

    /// A `DEVICE_STATE_CHANGED` event for `account_id`
    pub fn device_state(account_id: impl Into<String>, devices: Vec<Device>) -> Self {
        Self::Event {
            account_id: account_id.into(),
            data: PlayerEventData::DeviceStateChanged {
                event: DeviceStatePayload { devices },
            },
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            Self::AccountSwitch => Topic::AccountSwitch,
            Self::Event { .. } => Topic::Event,
            Self::Ready => Topic::Ready,
        }
    }
}

/// Payload of an inbound player event
///
/// Kinds this engine does not know deserialize to `Unknown` instead of
/// failing the whole signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerEventData {
    PlayerStateChanged {
        #[serde(default)]
        event: PlayerStatePayload,
    },
    DeviceStateChanged {
        #[serde(default)]
        event: DeviceStatePayload,
    },
    #[serde(other)]
    Unknown,
}

impl PlayerEventData {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlayerStateChanged { .. } => "PLAYER_STATE_CHANGED",
            Self::DeviceStateChanged { .. } => "DEVICE_STATE_CHANGED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatePayload {
    /// `None` when the remote sent nothing usable
    #[serde(default, deserialize_with = "lenient_snapshot")]
    pub state: Option<PlaybackSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatePayload {
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// Everything that travels over the sync bus
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    State(PlaybackState),
    /// `None` when cleared
    ActiveAccount(Option<String>),
    ShowUpdate(bool),
    /// Pass-through of a host signal
    Inbound(InboundSignal),
}

impl BusEvent for SyncEvent {
    type Topic = Topic;

    fn topic(&self) -> Topic {
        match self {
            Self::State(_) => Topic::State,
            Self::ActiveAccount(_) => Topic::ActiveAccount,
            Self::ShowUpdate(_) => Topic::ShowUpdate,
            Self::Inbound(signal) => signal.topic(),
        }
    }
}

impl From<InboundSignal> for SyncEvent {
    fn from(signal: InboundSignal) -> Self {
        Self::Inbound(signal)
    }
}
