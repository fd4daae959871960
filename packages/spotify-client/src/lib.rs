//! Spotify Web API player client
//!
//! This crate issues the player control requests (play/pause, skip, seek,
//! volume, shuffle, repeat) and the "current playback" poll on behalf of a
//! linked account:
//! - bearer authentication from the host's [`AccountDirectory`]
//! - exactly one token refresh and retry on HTTP 401
//! - terminal failures logged and announced as [`Toast`]s
//! - a [`SuppressionFlag`] raised while a request is in flight
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spotify_modal_client::{AccountDirectory, SpotifyClient, TokenRefresher};
//! use spotify_modal_config::SpotifyApiConfig;
//!
//! # async fn example(
//! #     directory: Arc<dyn AccountDirectory>,
//! #     refresher: Arc<dyn TokenRefresher>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let client = SpotifyClient::new(&SpotifyApiConfig::default(), directory, refresher)?;
//!
//! client.set_playing("account-id", false).await?;
//!
//! if let Some(snapshot) = client.current_playback("account-id").await? {
//!     println!("playing: {}", snapshot.is_playing);
//! }
//! # Ok(())
//! # }
//! ```

mod accounts;
mod client;
mod error;
mod models;
mod suppression;
mod toast;

pub use accounts::{
    AccountDirectory, ConnectedAccount, RefreshError, TokenRefresher, SPOTIFY_ACCOUNT_TYPE,
};
pub use client::{ApiResponse, Endpoint, SpotifyClient};
pub use error::{SpotifyError, SpotifyResult};
pub use models::{
    lenient_snapshot, Actions, AlbumRef, ArtistRef, Device, Disallows, PlaybackSnapshot,
    PlayerAction, RepeatMode, TrackItem,
};
pub use reqwest::{Method, StatusCode};
pub use suppression::SuppressionFlag;
pub use toast::{Toast, ToastBroadcast};
