//! Common test utilities for sync integration tests
//!
//! Builds a context wired to a [`MockSpotifyServer`] and records every event
//! emitted on its bus.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use spotify_modal_client::{ConnectedAccount, PlaybackSnapshot};
use spotify_modal_config::SpotifyApiConfig;
use spotify_modal_sync::{SyncContext, SyncController, SyncEvent, Topic};
use spotify_modal_test_utils::{MockAccountDirectory, MockSpotifyServer};

pub const ALL_TOPICS: [Topic; 6] = [
    Topic::State,
    Topic::ActiveAccount,
    Topic::ShowUpdate,
    Topic::Event,
    Topic::Ready,
    Topic::AccountSwitch,
];

/// A wired context plus everything it emitted
pub struct Harness {
    pub server: MockSpotifyServer,
    pub directory: Arc<MockAccountDirectory>,
    pub ctx: SyncContext,
    pub controller: Arc<SyncController>,
    events: Arc<Mutex<Vec<SyncEvent>>>,
}

impl Harness {
    /// Harness with one Spotify account per `(id, token)` pair, in order
    pub async fn with_accounts(accounts: &[(&str, &str)]) -> Self {
        let accounts = accounts
            .iter()
            .map(|(id, token)| ConnectedAccount::spotify(*id, Some(*token)))
            .collect();
        Self::with_connected(accounts).await
    }

    pub async fn with_connected(accounts: Vec<ConnectedAccount>) -> Self {
        let server = MockSpotifyServer::start().await;
        let directory = Arc::new(MockAccountDirectory::new(accounts));
        let ctx = SyncContext::new(
            &SpotifyApiConfig::with_url(server.base_url()),
            directory.clone(),
            directory.clone(),
        )
        .unwrap();
        let controller = SyncController::attach(ctx.clone());

        let events = Arc::new(Mutex::new(Vec::new()));
        for topic in ALL_TOPICS {
            let sink = Arc::clone(&events);
            ctx.bus().on(topic, move |event: &SyncEvent| {
                sink.lock().unwrap().push(event.clone());
            });
        }

        Self {
            server,
            directory,
            ctx,
            controller,
            events,
        }
    }

    /// Events emitted so far on `topic`
    pub fn emitted(&self, topic: Topic) -> Vec<SyncEvent> {
        use spotify_modal_sync::BusEvent;

        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.topic() == topic)
            .cloned()
            .collect()
    }

    pub fn show_updates(&self) -> Vec<bool> {
        self.emitted(Topic::ShowUpdate)
            .into_iter()
            .filter_map(|event| match event {
                SyncEvent::ShowUpdate(show) => Some(show),
                _ => None,
            })
            .collect()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Feed a raw JSON signal the way the host does
    pub fn dispatch_json(&self, signal: Value) {
        let signal: spotify_modal_sync::InboundSignal = serde_json::from_value(signal).unwrap();
        self.ctx.dispatch(signal);
    }

    /// Wait until the suppression flag is raised by an in-flight command
    pub async fn wait_for_suppression(&self) {
        let flag = self.ctx.suppression().clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            while !flag.is_set() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("command never went in flight");
    }

    /// Wait until the store holds a non-placeholder state
    pub async fn wait_for_state(&self) {
        let store = self.ctx.store().clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            while store.get_state().is_placeholder {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("state never arrived");
    }
}

/// Parse a JSON fixture into a snapshot
pub fn snapshot(value: Value) -> PlaybackSnapshot {
    serde_json::from_value(value).unwrap()
}
