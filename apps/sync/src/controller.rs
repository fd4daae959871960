//! Sync controller
//!
//! Turns host signals into store and registry updates:
//! - `accountSwitch` clears the active account and hides the player
//! - `event` is adopted from the first account seen and ignored for others
//! - `ready` polls the connected accounts once for their current playback

use std::sync::{Arc, Weak};

use chrono::Utc;
use spotify_modal_client::ConnectedAccount;
use tracing::{debug, info, warn};

use crate::context::SyncContext;
use crate::events::{InboundSignal, PlayerEventData, SyncEvent, Topic};

#[derive(Debug)]
pub struct SyncController {
    ctx: SyncContext,
}

impl SyncController {
    /// A controller that is not yet listening; see [`Self::attach`]
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Create a controller and register it on the context's bus
    ///
    /// The bus only holds weak references: once the returned controller is
    /// dropped its handlers do nothing.
    pub fn attach(ctx: SyncContext) -> Arc<Self> {
        let controller = Arc::new(Self::new(ctx));
        let weak = Arc::downgrade(&controller);

        controller
            .ctx
            .bus()
            .chain_on(Topic::AccountSwitch, {
                let weak = Weak::clone(&weak);
                move |_| {
                    if let Some(controller) = weak.upgrade() {
                        controller.on_account_switch();
                    }
                }
            })
            .chain_on(Topic::Event, {
                let weak = Weak::clone(&weak);
                move |event| {
                    if let (
                        Some(controller),
                        SyncEvent::Inbound(InboundSignal::Event { account_id, data }),
                    ) = (weak.upgrade(), event)
                    {
                        controller.on_event(account_id, data);
                    }
                }
            })
            .chain_on(Topic::Ready, move |_| {
                if let Some(controller) = weak.upgrade() {
                    controller.spawn_initial_poll();
                }
            });

        controller
    }

    fn on_account_switch(&self) {
        info!("account switch, clearing player state");

        self.ctx.registry().set_active(None);
        self.ctx.store().reset();
        self.ctx.bus().emit(SyncEvent::ShowUpdate(false));
    }

    fn on_event(&self, account_id: &str, data: &PlayerEventData) {
        let registry = self.ctx.registry();
        registry.claim(account_id);

        if !registry.is_active(account_id) {
            debug!(
                account_id,
                kind = data.kind(),
                "ignoring event from inactive account"
            );
            return;
        }

        match data {
            PlayerEventData::PlayerStateChanged { event } => {
                self.ctx.store().set_state(event.state.as_ref());
            }
            PlayerEventData::DeviceStateChanged { event } => {
                if self.ctx.suppression().consume() {
                    info!(
                        account_id,
                        devices = event.devices.len(),
                        "visibility not updated, device change caused by a local command"
                    );
                    return;
                }

                let has_devices = !event.devices.is_empty();
                self.ctx.bus().emit(SyncEvent::ShowUpdate(has_devices));

                if !has_devices {
                    registry.set_active(None);
                    self.ctx.store().reset();
                }
            }
            PlayerEventData::Unknown => {
                warn!(account_id, "ignoring unknown player event");
            }
        }
    }

    fn spawn_initial_poll(self: &Arc<Self>) {
        let controller = Arc::clone(self);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    controller.poll_initial_state().await;
                });
            }
            Err(_) => warn!("no async runtime, skipping initial playback poll"),
        }
    }

    /// Poll the connected accounts in order for their current playback and
    /// inject the first answer as a `PLAYER_STATE_CHANGED` event
    ///
    /// Returns the account that answered, if any. Failing accounts are
    /// logged and skipped.
    pub async fn poll_initial_state(&self) -> Option<String> {
        let directory = self.ctx.directory();

        if !directory.should_show_activity() {
            debug!("activity hidden, skipping initial playback poll");
            return None;
        }

        let accounts: Vec<ConnectedAccount> = directory
            .accounts()
            .into_iter()
            .filter(ConnectedAccount::is_pollable)
            .collect();

        for account in accounts {
            match self.ctx.client().current_playback(&account.id).await {
                Ok(snapshot) => {
                    let now = Utc::now().timestamp_millis();
                    let snapshot = snapshot.map(|snapshot| snapshot.with_timestamp(now));

                    info!(
                        account_id = %account.id,
                        playing = snapshot.as_ref().map(|s| s.is_playing).unwrap_or(false),
                        "restored playback state"
                    );

                    self.ctx
                        .dispatch(InboundSignal::player_state(account.id.clone(), snapshot));
                    return Some(account.id);
                }
                Err(e) => {
                    warn!(account_id = %account.id, error = %e, "failed polling playback state");
                }
            }
        }

        debug!("no account answered the initial playback poll");
        None
    }
}
