//! Owned sync context
//!
//! Built once at startup and handed to the controller and the player
//! controls. Clones share the same bus, state and client.

use std::fmt;
use std::sync::{Arc, Mutex};

use spotify_modal_client::{
    AccountDirectory, SpotifyClient, SpotifyResult, SuppressionFlag, ToastBroadcast,
    TokenRefresher,
};
use spotify_modal_config::SpotifyApiConfig;

use crate::bus::EventBus;
use crate::events::SyncEvent;
use crate::registry::AccountRegistry;
use crate::store::PlaybackStore;

#[derive(Clone)]
pub struct SyncContext {
    bus: EventBus<SyncEvent>,
    store: PlaybackStore,
    registry: AccountRegistry,
    client: SpotifyClient,
    directory: Arc<dyn AccountDirectory>,
    dispatching: Arc<Mutex<()>>,
}

impl fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("active_account", &self.registry.get_active())
            .field("client", &self.client)
            .finish()
    }
}

impl SyncContext {
    /// Build a context with a fresh client for `config`
    ///
    /// # Errors
    /// Returns the client construction error (bad base URL, HTTP client)
    pub fn new(
        config: &SpotifyApiConfig,
        directory: Arc<dyn AccountDirectory>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> SpotifyResult<Self> {
        let client = SpotifyClient::new(config, Arc::clone(&directory), refresher)?;
        Ok(Self::with_client(client))
    }

    /// Build a context around an existing client, reading accounts from the
    /// client's directory
    pub fn with_client(client: SpotifyClient) -> Self {
        let bus = EventBus::new();

        Self {
            store: PlaybackStore::new(bus.clone()),
            registry: AccountRegistry::new(bus.clone()),
            directory: Arc::clone(client.directory()),
            client,
            bus,
            dispatching: Arc::new(Mutex::new(())),
        }
    }

    pub fn bus(&self) -> &EventBus<SyncEvent> {
        &self.bus
    }

    pub fn store(&self) -> &PlaybackStore {
        &self.store
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn client(&self) -> &SpotifyClient {
        &self.client
    }

    pub fn directory(&self) -> &Arc<dyn AccountDirectory> {
        &self.directory
    }

    pub fn suppression(&self) -> &SuppressionFlag {
        self.client.suppression()
    }

    pub fn toasts(&self) -> &ToastBroadcast {
        self.client.toasts()
    }

    /// Feed a host signal into the bus
    ///
    /// Dispatches from different threads are serialized: each signal is
    /// handled to completion before the next one starts. Handlers must not
    /// dispatch themselves.
    pub fn dispatch(&self, event: impl Into<SyncEvent>) {
        let _guard = self.dispatching.lock().unwrap_or_else(|e| e.into_inner());
        self.bus.emit(event.into());
    }
}
