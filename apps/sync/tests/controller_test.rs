//! Integration tests for the sync controller
//!
//! Drives the controller through the bus with host signals and checks the
//! store, the registry and the emitted events.

mod common;

use std::time::Duration;

use common::{snapshot, Harness};
use serde_json::json;
use spotify_modal_client::ConnectedAccount;
use spotify_modal_sync::{InboundSignal, PlaybackState, SyncEvent, Topic};
use spotify_modal_test_utils::fixtures;

// ============================================================================
// Inbound events
// ============================================================================

#[tokio::test]
async fn test_player_state_with_track_is_stored() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;

    harness.dispatch_json(fixtures::player_state_event("a", fixtures::playing_snapshot()));

    let state = harness.ctx.store().get_state();
    assert_eq!(
        state,
        PlaybackState::from_snapshot(Some(&snapshot(fixtures::playing_snapshot())))
    );
    assert!(!state.is_placeholder);
    assert_eq!(harness.ctx.registry().get_active().as_deref(), Some("a"));
}

#[tokio::test]
async fn test_player_state_without_track_is_placeholder() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;

    harness.dispatch_json(fixtures::player_state_event("a", fixtures::playing_snapshot()));
    harness.dispatch_json(fixtures::player_state_event("a", fixtures::idle_snapshot()));

    assert_eq!(harness.ctx.store().get_state(), PlaybackState::placeholder());
}

#[tokio::test]
async fn test_garbage_state_is_placeholder() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;

    harness.dispatch_json(fixtures::player_state_event("a", json!("not a snapshot")));

    assert_eq!(harness.ctx.store().get_state(), PlaybackState::placeholder());
    assert_eq!(harness.emitted(Topic::State).len(), 1);
}

#[tokio::test]
async fn test_track_with_null_fields_is_not_placeholder() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;

    harness.dispatch_json(fixtures::player_state_event(
        "a",
        json!({
            "item": {"name": "Song", "artists": [{"name": "Artist"}], "duration_ms": 1000},
            "is_playing": null,
            "repeat_state": null,
            "shuffle_state": null,
            "timestamp": null
        }),
    ));

    let state = harness.ctx.store().get_state();
    assert!(!state.is_placeholder);
    assert_eq!(state.track.unwrap().name, "Song");
    assert!(!state.is_playing);
    assert!(!state.shuffle);
}

#[tokio::test]
async fn test_same_state_twice_notifies_twice() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;
    let event = fixtures::player_state_event("a", fixtures::playing_snapshot());

    harness.dispatch_json(event.clone());
    let first = harness.ctx.store().get_state();
    harness.dispatch_json(event);
    let second = harness.ctx.store().get_state();

    assert_eq!(first, second);
    let states = harness.emitted(Topic::State);
    assert_eq!(states.len(), 2);
    assert_eq!(states[0], states[1]);
}

#[tokio::test]
async fn test_first_account_wins() {
    let harness = Harness::with_accounts(&[("a", "token-a"), ("b", "token-b")]).await;

    harness.dispatch_json(fixtures::player_state_event("a", fixtures::snapshot("From A", "X")));
    harness.dispatch_json(fixtures::player_state_event("b", fixtures::snapshot("From B", "Y")));

    assert_eq!(harness.ctx.registry().get_active().as_deref(), Some("a"));
    let track = harness.ctx.store().get_state().track.unwrap();
    assert_eq!(track.name, "From A");

    // Events from B are ignored entirely, device changes included
    harness.dispatch_json(fixtures::device_state_event("b", 0));
    assert!(harness.show_updates().is_empty());
    assert_eq!(harness.ctx.registry().get_active().as_deref(), Some("a"));
}

#[tokio::test]
async fn test_second_account_adopted_after_clear() {
    let harness = Harness::with_accounts(&[("a", "token-a"), ("b", "token-b")]).await;

    harness.dispatch_json(fixtures::player_state_event("a", fixtures::playing_snapshot()));
    harness.dispatch_json(json!({"type": "accountSwitch"}));
    harness.dispatch_json(fixtures::player_state_event("b", fixtures::snapshot("From B", "Y")));

    assert_eq!(harness.ctx.registry().get_active().as_deref(), Some("b"));
    assert_eq!(
        harness.ctx.store().get_state().track.unwrap().name,
        "From B"
    );
}

#[tokio::test]
async fn test_account_switch_resets_everything() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;
    harness.dispatch_json(fixtures::player_state_event("a", fixtures::playing_snapshot()));
    harness.clear_events();

    harness.dispatch_json(json!({"type": "accountSwitch"}));

    assert_eq!(harness.ctx.registry().get_active(), None);
    assert_eq!(harness.ctx.store().get_state(), PlaybackState::placeholder());
    assert_eq!(harness.show_updates(), vec![false]);
    assert_eq!(
        harness.emitted(Topic::ActiveAccount),
        vec![SyncEvent::ActiveAccount(None)]
    );
    assert_eq!(harness.emitted(Topic::AccountSwitch).len(), 1);
}

#[tokio::test]
async fn test_devices_present_shows_player() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;

    harness.dispatch_json(fixtures::device_state_event("a", 2));

    assert_eq!(harness.show_updates(), vec![true]);
    assert_eq!(harness.ctx.registry().get_active().as_deref(), Some("a"));
}

#[tokio::test]
async fn test_no_devices_hides_player_and_clears_account() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;
    harness.dispatch_json(fixtures::player_state_event("a", fixtures::playing_snapshot()));

    harness.dispatch_json(fixtures::device_state_event("a", 0));

    assert_eq!(harness.show_updates(), vec![false]);
    assert_eq!(harness.ctx.registry().get_active(), None);
    assert!(harness.ctx.store().get_state().is_placeholder);
}

#[tokio::test]
async fn test_unknown_event_kind_is_ignored() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;
    harness.dispatch_json(fixtures::player_state_event("a", fixtures::playing_snapshot()));
    let before = harness.ctx.store().get_state();

    harness.dispatch_json(json!({
        "type": "event",
        "accountId": "a",
        "data": {"type": "PLAYER_QUEUE_CHANGED", "event": {"queue": []}}
    }));

    assert_eq!(harness.ctx.store().get_state(), before);
    assert!(harness.show_updates().is_empty());
    assert_eq!(harness.emitted(Topic::Event).len(), 2);
}

// ============================================================================
// Suppression
// ============================================================================

#[tokio::test]
async fn test_device_change_during_command_is_suppressed_once() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;
    harness
        .server
        .mock_command_delayed("PUT", "player/pause", 204, Duration::from_millis(300))
        .await;
    harness.dispatch_json(fixtures::player_state_event("a", fixtures::playing_snapshot()));

    let client = harness.ctx.client().clone();
    let command = tokio::spawn(async move { client.set_playing("a", false).await });
    harness.wait_for_suppression().await;

    harness.dispatch_json(fixtures::device_state_event("a", 0));

    assert!(harness.show_updates().is_empty());
    assert_eq!(harness.ctx.registry().get_active().as_deref(), Some("a"));
    assert!(!harness.ctx.suppression().is_set());
    assert!(!harness.ctx.store().get_state().is_placeholder);

    // The next one is taken at face value
    harness.dispatch_json(fixtures::device_state_event("a", 0));
    assert_eq!(harness.show_updates(), vec![false]);
    assert_eq!(harness.ctx.registry().get_active(), None);

    command.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_overlapping_commands_share_one_flag() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;
    harness
        .server
        .mock_command_delayed("PUT", "player/pause", 204, Duration::from_millis(100))
        .await;
    harness
        .server
        .mock_command_delayed("POST", "player/next", 204, Duration::from_millis(1000))
        .await;
    harness.dispatch_json(fixtures::player_state_event("a", fixtures::playing_snapshot()));

    let client = harness.ctx.client().clone();
    let slow = tokio::spawn(async move { client.skip("a", true).await });
    harness.wait_for_suppression().await;

    // The shorter command finishing clears the flag for both
    harness.ctx.client().set_playing("a", false).await.unwrap();
    assert!(!harness.ctx.suppression().is_set());
    assert!(!slow.is_finished());

    harness.dispatch_json(fixtures::device_state_event("a", 0));
    assert_eq!(harness.show_updates(), vec![false]);
    assert_eq!(harness.ctx.registry().get_active(), None);

    slow.await.unwrap().unwrap();
}

// ============================================================================
// Initial poll
// ============================================================================

#[tokio::test]
async fn test_poll_stops_at_first_answer() {
    let harness =
        Harness::with_accounts(&[("a", "token-a"), ("b", "token-b"), ("c", "token-c")]).await;
    harness
        .server
        .mock_playback_raw_for_token("token-a", 500, "upstream error")
        .await;
    harness
        .server
        .mock_playback_for_token("token-b", fixtures::snapshot("From B", "Y"))
        .await;
    harness.server.expect_no_requests_for_token("token-c").await;

    let answered = harness.controller.poll_initial_state().await;

    assert_eq!(answered.as_deref(), Some("b"));
    assert_eq!(harness.server.request_count().await, 2);
    harness.server.verify().await;

    assert_eq!(harness.ctx.registry().get_active().as_deref(), Some("b"));
    let state = harness.ctx.store().get_state();
    assert_eq!(state.track.unwrap().name, "From B");
    assert!(state.timestamp_ms > 1000);
}

#[tokio::test]
async fn test_poll_skips_malformed_answer() {
    let harness = Harness::with_accounts(&[("a", "token-a"), ("b", "token-b")]).await;
    harness
        .server
        .mock_playback_raw_for_token("token-a", 200, "{not json")
        .await;
    harness
        .server
        .mock_playback_for_token("token-b", fixtures::playing_snapshot())
        .await;

    let answered = harness.controller.poll_initial_state().await;

    assert_eq!(answered.as_deref(), Some("b"));
    assert!(!harness.ctx.store().get_state().is_placeholder);
}

#[tokio::test]
async fn test_poll_all_failing_keeps_placeholder() {
    let harness = Harness::with_accounts(&[("a", "token-a"), ("b", "token-b")]).await;
    harness
        .server
        .mock_playback_raw_for_token("token-a", 503, "")
        .await;
    harness
        .server
        .mock_playback_raw_for_token("token-b", 500, "")
        .await;

    let answered = harness.controller.poll_initial_state().await;

    assert_eq!(answered, None);
    assert_eq!(harness.server.request_count().await, 2);
    assert!(harness.emitted(Topic::State).is_empty());
    assert_eq!(harness.ctx.registry().get_active(), None);
}

#[tokio::test]
async fn test_poll_nothing_playing_injects_placeholder() {
    let harness = Harness::with_accounts(&[("a", "token-a"), ("b", "token-b")]).await;
    harness
        .server
        .mock_playback_raw_for_token("token-a", 204, "")
        .await;
    harness.server.expect_no_requests_for_token("token-b").await;

    let answered = harness.controller.poll_initial_state().await;

    assert_eq!(answered.as_deref(), Some("a"));
    assert_eq!(harness.emitted(Topic::State).len(), 1);
    assert!(harness.ctx.store().get_state().is_placeholder);
    harness.server.verify().await;
}

#[tokio::test]
async fn test_poll_only_pollable_accounts() {
    let mut hidden = ConnectedAccount::spotify("hidden", Some("token-hidden"));
    hidden.show_activity = false;
    let mut other = ConnectedAccount::spotify("other", Some("token-other"));
    other.account_type = "github".to_string();

    let harness = Harness::with_connected(vec![
        hidden,
        other,
        ConnectedAccount::spotify("a", Some("token-a")),
    ])
    .await;
    harness.server.expect_no_requests_for_token("token-hidden").await;
    harness.server.expect_no_requests_for_token("token-other").await;
    harness
        .server
        .mock_playback_for_token("token-a", fixtures::playing_snapshot())
        .await;

    let answered = harness.controller.poll_initial_state().await;

    assert_eq!(answered.as_deref(), Some("a"));
    assert_eq!(harness.server.request_count().await, 1);
    harness.server.verify().await;
}

#[tokio::test]
async fn test_poll_skipped_when_activity_hidden() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;
    harness.directory.set_should_show_activity(false);

    let answered = harness.controller.poll_initial_state().await;

    assert_eq!(answered, None);
    assert_eq!(harness.server.request_count().await, 0);
}

#[tokio::test]
async fn test_ready_signal_polls_in_background() {
    let harness = Harness::with_accounts(&[("a", "token-a")]).await;
    harness
        .server
        .mock_playback_for_token("token-a", fixtures::playing_snapshot())
        .await;

    harness.ctx.dispatch(InboundSignal::Ready);
    harness.wait_for_state().await;

    assert_eq!(harness.ctx.registry().get_active().as_deref(), Some("a"));
    assert_eq!(harness.emitted(Topic::Ready).len(), 1);
}

#[tokio::test]
async fn test_poll_refreshes_expired_token() {
    let harness = Harness::with_accounts(&[("a", "stale")]).await;
    harness
        .server
        .mock_playback_raw_for_token("stale", 401, "")
        .await;
    harness
        .server
        .mock_playback_for_token("fresh", fixtures::playing_snapshot())
        .await;
    harness.directory.script_refresh("fresh");

    let answered = harness.controller.poll_initial_state().await;

    assert_eq!(answered.as_deref(), Some("a"));
    assert_eq!(harness.directory.refresh_calls(), 1);
    assert_eq!(harness.server.request_count().await, 2);
}

#[tokio::test]
async fn test_concurrent_dispatch_keeps_first_account() {
    let harness = Harness::with_accounts(&[("a", "token-a"), ("b", "token-b")]).await;

    let senders: Vec<_> = [("a", "From A"), ("b", "From B")]
        .into_iter()
        .map(|(account, track)| {
            let ctx = harness.ctx.clone();
            std::thread::spawn(move || {
                let event = fixtures::player_state_event(account, fixtures::snapshot(track, "X"));
                for _ in 0..100 {
                    let signal: InboundSignal = serde_json::from_value(event.clone()).unwrap();
                    ctx.dispatch(signal);
                }
            })
        })
        .collect();
    for sender in senders {
        sender.join().unwrap();
    }

    let active = harness.ctx.registry().get_active().unwrap();
    let expected = if active == "a" { "From A" } else { "From B" };

    let names: Vec<String> = harness
        .emitted(Topic::State)
        .into_iter()
        .filter_map(|event| match event {
            SyncEvent::State(state) => state.track.map(|track| track.name),
            _ => None,
        })
        .collect();
    assert_eq!(names.len(), 100);
    assert!(names.iter().all(|name| name == expected));
    assert_eq!(harness.ctx.store().get_state().track.unwrap().name, expected);
}
