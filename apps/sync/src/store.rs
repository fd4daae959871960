//! Playback state store
//!
//! Holds the one current [`PlaybackState`]. Every write replaces it wholesale
//! and emits [`SyncEvent::State`], even when nothing changed; derived views
//! are recomputed from the full state on each emit.

use std::sync::{Arc, Mutex, RwLock};

use serde::Serialize;
use spotify_modal_client::{Disallows, PlaybackSnapshot, PlayerAction, RepeatMode};
use tracing::debug;

use crate::bus::{EventBus, Subscription};
use crate::events::{SyncEvent, Topic};

/// The track part of a [`PlaybackState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    pub name: String,
    pub artists: Vec<String>,
    pub album_name: Option<String>,
}

/// Local view of the remote player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    /// True when nothing is known about the remote player
    pub is_placeholder: bool,
    pub track: Option<Track>,
    pub is_playing: bool,
    pub progress_ms: u64,
    pub duration_ms: u64,
    pub repeat_mode: RepeatMode,
    pub shuffle: bool,
    /// 0..=100
    pub volume_percent: u8,
    /// Producer-side timestamp of the snapshot (ms)
    pub timestamp_ms: i64,
    pub disallows: Disallows,
}

impl PlaybackState {
    /// State shown while nothing is known: no track, stopped, and every
    /// action disallowed except pausing
    pub fn placeholder() -> Self {
        Self {
            is_placeholder: true,
            track: None,
            is_playing: false,
            progress_ms: 0,
            duration_ms: 0,
            repeat_mode: RepeatMode::Off,
            shuffle: false,
            volume_percent: 0,
            timestamp_ms: 0,
            disallows: Disallows::placeholder(),
        }
    }

    /// Map a remote snapshot; snapshots without a track item map to the
    /// placeholder
    pub fn from_snapshot(snapshot: Option<&PlaybackSnapshot>) -> Self {
        let Some((snapshot, item)) =
            snapshot.and_then(|snapshot| snapshot.item.as_ref().map(|item| (snapshot, item)))
        else {
            return Self::placeholder();
        };

        Self {
            is_placeholder: false,
            track: Some(Track {
                name: item.name.clone(),
                artists: item.artists.iter().map(|artist| artist.name.clone()).collect(),
                album_name: item.album.as_ref().map(|album| album.name.clone()),
            }),
            is_playing: snapshot.is_playing,
            progress_ms: snapshot.progress_ms.unwrap_or(0),
            duration_ms: item.duration_ms,
            repeat_mode: snapshot.repeat_state,
            shuffle: snapshot.shuffle_state,
            volume_percent: snapshot
                .device
                .as_ref()
                .and_then(|device| device.volume_percent)
                .unwrap_or(0)
                .min(100),
            timestamp_ms: snapshot.timestamp,
            disallows: snapshot
                .actions
                .as_ref()
                .map(|actions| actions.disallows)
                .unwrap_or_default(),
        }
    }

    pub fn is_disallowed(&self, action: PlayerAction) -> bool {
        self.disallows.contains(action)
    }

    /// The slice the player controls render from
    pub fn control_states(&self) -> PlayerControlStates {
        PlayerControlStates {
            duration_ms: self.duration_ms,
            is_playing: self.is_playing,
            progress_ms: self.progress_ms,
            repeat_mode: self.repeat_mode,
            shuffle: self.shuffle,
            volume_percent: self.volume_percent,
            disallows: self.disallows,
            timestamp_ms: self.timestamp_ms,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Per-field view used by the player controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerControlStates {
    pub duration_ms: u64,
    pub is_playing: bool,
    pub progress_ms: u64,
    pub repeat_mode: RepeatMode,
    pub shuffle: bool,
    pub volume_percent: u8,
    pub disallows: Disallows,
    pub timestamp_ms: i64,
}

/// Authoritative in-process playback state
#[derive(Debug, Clone)]
pub struct PlaybackStore {
    bus: EventBus<SyncEvent>,
    current: Arc<RwLock<PlaybackState>>,
    writer: Arc<Mutex<()>>,
}

impl PlaybackStore {
    pub fn new(bus: EventBus<SyncEvent>) -> Self {
        Self {
            bus,
            current: Arc::new(RwLock::new(PlaybackState::placeholder())),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Replace the current state from a remote snapshot and emit it
    ///
    /// Concurrent writers are serialized so the last emitted state is always
    /// the stored one. State handlers may read the store but not write it.
    pub fn set_state(&self, snapshot: Option<&PlaybackSnapshot>) {
        let state = PlaybackState::from_snapshot(snapshot);

        debug!(
            placeholder = state.is_placeholder,
            playing = state.is_playing,
            progress_ms = state.progress_ms,
            track = state.track.as_ref().map(|track| track.name.as_str()),
            "new state"
        );

        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        {
            let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
            *current = state.clone();
        }

        self.bus.emit(SyncEvent::State(state));
    }

    /// Reset to the placeholder
    pub fn reset(&self) {
        self.set_state(None);
    }

    pub fn get_state(&self) -> PlaybackState {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Call `handler` with every newly stored state
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&PlaybackState) + Send + Sync + 'static,
    {
        self.bus.on(Topic::State, move |event| {
            if let SyncEvent::State(state) = event {
                handler(state);
            }
        })
    }

    /// Call `handler` with `select` applied to every newly stored state
    pub fn watch<T, S, F>(&self, select: S, handler: F) -> Subscription
    where
        S: Fn(&PlaybackState) -> T + Send + Sync + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(move |state| handler(select(state)))
    }

    /// Call `handler` with the control slice of every newly stored state
    pub fn on_control_states<F>(&self, handler: F) -> Subscription
    where
        F: Fn(PlayerControlStates) + Send + Sync + 'static,
    {
        self.watch(PlaybackState::control_states, handler)
    }
}
