//! Player JSON fixtures
//!
//! Shapes follow what the remote publishes for the "current playback"
//! response and the player socket events.

use serde_json::{json, Value};

/// A playing track: "Song" by "Artist", 1s into 200s, volume 50
pub fn playing_snapshot() -> Value {
    snapshot("Song", "Artist")
}

/// A playing snapshot with the given track and artist name
pub fn snapshot(track: &str, artist: &str) -> Value {
    json!({
        "item": {
            "name": track,
            "artists": [{"name": artist}],
            "album": {"name": "Album"},
            "duration_ms": 200000
        },
        "is_playing": true,
        "progress_ms": 1000,
        "repeat_state": "off",
        "shuffle_state": false,
        "device": {"id": "device-1", "name": "Desktop", "volume_percent": 50},
        "timestamp": 1000,
        "actions": {"disallows": {}}
    })
}

/// A snapshot with no item (nothing loaded on the device)
pub fn idle_snapshot() -> Value {
    json!({
        "is_playing": false,
        "progress_ms": 0,
        "repeat_state": "off",
        "shuffle_state": false,
        "timestamp": 1000,
        "actions": {"disallows": {"resuming": true}}
    })
}

/// Inbound `PLAYER_STATE_CHANGED` signal for `account_id`
pub fn player_state_event(account_id: &str, state: Value) -> Value {
    json!({
        "type": "event",
        "accountId": account_id,
        "data": {
            "type": "PLAYER_STATE_CHANGED",
            "event": {"state": state}
        }
    })
}

/// Inbound `DEVICE_STATE_CHANGED` signal with `device_count` devices
pub fn device_state_event(account_id: &str, device_count: usize) -> Value {
    let devices: Vec<Value> = (0..device_count)
        .map(|i| json!({"id": format!("device-{}", i), "name": "Desktop", "type": "Computer"}))
        .collect();

    json!({
        "type": "event",
        "accountId": account_id,
        "data": {
            "type": "DEVICE_STATE_CHANGED",
            "event": {"devices": devices}
        }
    })
}
