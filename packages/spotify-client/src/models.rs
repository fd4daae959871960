//! Spotify Web API player models
//!
//! These mirror the JSON the remote player publishes (both the "current
//! playback" response and the `PLAYER_STATE_CHANGED` socket payload). Every
//! field is optional or defaulted: the remote omits whole objects when
//! nothing is playing.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A full player snapshot as published by the remote
///
/// Fields other than `item` fall back to their defaults when null or
/// mistyped; only the item decides whether anything is playing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Currently playing item, absent when nothing is loaded
    #[serde(default)]
    pub item: Option<TrackItem>,
    #[serde(default, deserialize_with = "default_on_invalid")]
    pub is_playing: bool,
    #[serde(default, deserialize_with = "default_on_invalid")]
    pub progress_ms: Option<u64>,
    #[serde(default, deserialize_with = "default_on_invalid")]
    pub repeat_state: RepeatMode,
    #[serde(default, deserialize_with = "default_on_invalid")]
    pub shuffle_state: bool,
    #[serde(default, deserialize_with = "default_on_invalid")]
    pub device: Option<Device>,
    /// Producer-side wall clock (ms) at which this snapshot was valid
    #[serde(default, deserialize_with = "default_on_invalid")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "default_on_invalid")]
    pub actions: Option<Actions>,
}

impl PlaybackSnapshot {
    /// Copy of this snapshot re-stamped with a new producer timestamp
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// The track (or episode) inside a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub name: String,
}

/// A playback device of the account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub volume_percent: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actions {
    #[serde(default)]
    pub disallows: Disallows,
}

/// Actions the remote currently refuses.
///
/// The remote sends an object whose keys are present (and `true`) only for
/// disallowed actions; missing keys mean allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Disallows {
    pub resuming: bool,
    pub pausing: bool,
    pub seeking: bool,
    pub skipping_next: bool,
    pub skipping_prev: bool,
    pub toggling_shuffle: bool,
    pub toggling_repeat_context: bool,
    pub toggling_repeat_track: bool,
}

impl Disallows {
    /// Every action disallowed except pausing
    pub fn placeholder() -> Self {
        Self {
            resuming: true,
            pausing: false,
            seeking: true,
            skipping_next: true,
            skipping_prev: true,
            toggling_shuffle: true,
            toggling_repeat_context: true,
            toggling_repeat_track: true,
        }
    }

    /// Whether `action` is currently disallowed
    pub fn contains(&self, action: PlayerAction) -> bool {
        match action {
            PlayerAction::Resuming => self.resuming,
            PlayerAction::Pausing => self.pausing,
            PlayerAction::Seeking => self.seeking,
            PlayerAction::SkippingNext => self.skipping_next,
            PlayerAction::SkippingPrev => self.skipping_prev,
            PlayerAction::TogglingShuffle => self.toggling_shuffle,
            PlayerAction::TogglingRepeatContext => self.toggling_repeat_context,
            PlayerAction::TogglingRepeatTrack => self.toggling_repeat_track,
        }
    }

    /// The disallowed actions, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = PlayerAction> + '_ {
        PlayerAction::ALL
            .into_iter()
            .filter(move |action| self.contains(*action))
    }
}

/// A player action that the remote may disallow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Resuming,
    Pausing,
    Seeking,
    SkippingNext,
    SkippingPrev,
    TogglingShuffle,
    TogglingRepeatContext,
    TogglingRepeatTrack,
}

impl PlayerAction {
    pub const ALL: [PlayerAction; 8] = [
        PlayerAction::Resuming,
        PlayerAction::Pausing,
        PlayerAction::Seeking,
        PlayerAction::SkippingNext,
        PlayerAction::SkippingPrev,
        PlayerAction::TogglingShuffle,
        PlayerAction::TogglingRepeatContext,
        PlayerAction::TogglingRepeatTrack,
    ];
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resuming => "resuming",
            Self::Pausing => "pausing",
            Self::Seeking => "seeking",
            Self::SkippingNext => "skipping_next",
            Self::SkippingPrev => "skipping_prev",
            Self::TogglingShuffle => "toggling_shuffle",
            Self::TogglingRepeatContext => "toggling_repeat_context",
            Self::TogglingRepeatTrack => "toggling_repeat_track",
        };
        f.write_str(name)
    }
}

/// Repeat mode options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    Context,
    Track,
}

impl RepeatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Context => "context",
            Self::Track => "track",
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "context" => Ok(Self::Context),
            "track" => Ok(Self::Track),
            other => Err(format!("unknown repeat mode: {}", other)),
        }
    }
}

/// Deserialize a field, falling back to its default when the value is null
/// or does not have the expected shape
fn default_on_invalid<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize an optional snapshot, mapping anything that does not have
/// the snapshot shape to `None` instead of failing the surrounding message.
pub fn lenient_snapshot<'de, D>(deserializer: D) -> Result<Option<PlaybackSnapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_full_parse() {
        let snapshot: PlaybackSnapshot = serde_json::from_value(json!({
            "item": {
                "name": "Song",
                "artists": [{"name": "Artist"}, {"name": "Feature"}],
                "album": {"name": "Album"},
                "duration_ms": 200000
            },
            "is_playing": true,
            "progress_ms": 1000,
            "repeat_state": "context",
            "shuffle_state": true,
            "device": {"id": "abc", "volume_percent": 50},
            "timestamp": 1000,
            "actions": {"disallows": {"resuming": true}}
        }))
        .unwrap();

        let item = snapshot.item.unwrap();
        assert_eq!(item.name, "Song");
        assert_eq!(item.artists.len(), 2);
        assert_eq!(item.album.unwrap().name, "Album");
        assert_eq!(snapshot.repeat_state, RepeatMode::Context);
        assert_eq!(snapshot.device.unwrap().volume_percent, Some(50));
        let disallows = snapshot.actions.unwrap().disallows;
        assert!(disallows.resuming);
        assert!(!disallows.pausing);
    }

    #[test]
    fn test_snapshot_missing_objects_default() {
        let snapshot: PlaybackSnapshot = serde_json::from_value(json!({})).unwrap();
        assert!(snapshot.item.is_none());
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.repeat_state, RepeatMode::Off);
    }

    #[test]
    fn test_snapshot_null_and_mistyped_fields_default() {
        let snapshot: PlaybackSnapshot = serde_json::from_value(json!({
            "item": {"name": "Song", "artists": [{"name": "Artist"}], "duration_ms": 1000},
            "is_playing": null,
            "progress_ms": "soon",
            "repeat_state": null,
            "shuffle_state": null,
            "device": 42,
            "timestamp": null,
            "actions": null
        }))
        .unwrap();

        assert_eq!(snapshot.item.unwrap().name, "Song");
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.progress_ms, None);
        assert_eq!(snapshot.repeat_state, RepeatMode::Off);
        assert!(!snapshot.shuffle_state);
        assert!(snapshot.device.is_none());
        assert_eq!(snapshot.timestamp, 0);
        assert!(snapshot.actions.is_none());
    }

    #[test]
    fn test_disallows_iter_and_placeholder() {
        let disallows = Disallows::placeholder();
        assert!(!disallows.contains(PlayerAction::Pausing));
        assert_eq!(disallows.iter().count(), 7);
        assert_eq!(Disallows::default().iter().count(), 0);
    }

    #[test]
    fn test_repeat_mode_round_trip_str() {
        for mode in [RepeatMode::Off, RepeatMode::Context, RepeatMode::Track] {
            assert_eq!(mode.as_str().parse::<RepeatMode>().unwrap(), mode);
        }
        assert!("all".parse::<RepeatMode>().is_err());
    }

    #[test]
    fn test_lenient_snapshot() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(default, deserialize_with = "lenient_snapshot")]
            state: Option<PlaybackSnapshot>,
        }

        let parsed: Wrapper = serde_json::from_value(json!({"state": "garbage"})).unwrap();
        assert!(parsed.state.is_none());

        let parsed: Wrapper = serde_json::from_value(json!({"state": null})).unwrap();
        assert!(parsed.state.is_none());

        let parsed: Wrapper = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.state.is_none());

        let parsed: Wrapper =
            serde_json::from_value(json!({"state": {"is_playing": true}})).unwrap();
        assert!(parsed.state.unwrap().is_playing);
    }
}
