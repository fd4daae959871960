//! Spotify playback-state sync engine
//!
//! Keeps one local view of a remote player in step with its backend and
//! routes user control actions back to it:
//! - [`EventBus`]: synchronous topic-keyed publish/subscribe
//! - [`PlaybackStore`]: the single current [`PlaybackState`]
//! - [`AccountRegistry`]: which linked account is followed
//! - [`SyncController`]: turns host signals into store/registry updates
//! - [`PlayerControls`]: user actions against the active account
//!
//! Everything hangs off one owned [`SyncContext`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spotify_modal_client::{AccountDirectory, TokenRefresher};
//! use spotify_modal_config::SpotifyApiConfig;
//! use spotify_modal_sync::{InboundSignal, SyncContext, SyncController};
//!
//! # fn example(
//! #     directory: Arc<dyn AccountDirectory>,
//! #     refresher: Arc<dyn TokenRefresher>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = SyncContext::new(&SpotifyApiConfig::default(), directory, refresher)?;
//! let _controller = SyncController::attach(ctx.clone());
//!
//! ctx.store().subscribe(|state| println!("playing: {}", state.is_playing));
//! ctx.dispatch(InboundSignal::AccountSwitch);
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod config;
pub mod context;
pub mod controller;
pub mod controls;
pub mod directory;
pub mod error;
pub mod events;
pub mod registry;
pub mod store;

// Re-export commonly used types
pub use bus::{BusEvent, EventBus, Subscription};
pub use config::{Config, ControlsConfig};
pub use context::SyncContext;
pub use controller::SyncController;
pub use controls::{next_repeat_mode, previous_action, PlayerControls, PreviousAction};
pub use directory::FileAccountDirectory;
pub use error::{AccountsFileError, ControlError, ControlResult};
pub use events::{
    DeviceStatePayload, InboundSignal, PlayerEventData, PlayerStatePayload, SyncEvent, Topic,
};
pub use registry::AccountRegistry;
pub use store::{PlaybackState, PlaybackStore, PlayerControlStates, Track};
