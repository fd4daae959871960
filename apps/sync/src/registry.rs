//! Active account registry
//!
//! Remembers which linked account the player view follows. The sync
//! controller decides when this changes; nothing is validated here.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::bus::{EventBus, Subscription};
use crate::events::{SyncEvent, Topic};

#[derive(Debug, Clone)]
pub struct AccountRegistry {
    bus: EventBus<SyncEvent>,
    active: Arc<RwLock<Option<String>>>,
}

impl AccountRegistry {
    pub fn new(bus: EventBus<SyncEvent>) -> Self {
        Self {
            bus,
            active: Arc::new(RwLock::new(None)),
        }
    }

    /// Store `account_id` (an empty id clears) and emit it
    pub fn set_active(&self, account_id: Option<String>) {
        let account_id = account_id.filter(|id| !id.is_empty());

        {
            let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
            active.clone_from(&account_id);
        }

        self.announce(account_id);
    }

    /// Make `account_id` active if no account is. Returns whether it was
    /// adopted.
    pub fn claim(&self, account_id: &str) -> bool {
        if account_id.is_empty() {
            return false;
        }

        {
            let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
            if active.is_some() {
                return false;
            }
            *active = Some(account_id.to_string());
        }

        self.announce(Some(account_id.to_string()));
        true
    }

    pub fn get_active(&self) -> Option<String> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether `account_id` is the active account
    pub fn is_active(&self, account_id: &str) -> bool {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_deref()
            == Some(account_id)
    }

    /// Call `handler` on every change (`None` when cleared)
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Option<&str>) + Send + Sync + 'static,
    {
        self.bus.on(Topic::ActiveAccount, move |event| {
            if let SyncEvent::ActiveAccount(account_id) = event {
                handler(account_id.as_deref());
            }
        })
    }

    fn announce(&self, account_id: Option<String>) {
        match &account_id {
            Some(id) => info!(account_id = %id, "new active account"),
            None => info!("cleared active account"),
        }
        self.bus.emit(SyncEvent::ActiveAccount(account_id));
    }
}
