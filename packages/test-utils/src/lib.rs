//! Shared test utilities for the spotify-modal workspace
//!
//! This crate provides mock implementations of the remote player API and of
//! the host's account directory, so the client and the sync engine can be
//! tested without network or host dependencies.
//!
//! # Mock Services
//!
//! - [`MockSpotifyServer`] - Mock Spotify Web API player endpoints
//! - [`MockAccountDirectory`] - In-memory linked accounts with scripted token refresh
//!
//! # Example
//!
//! ```rust,ignore
//! use spotify_modal_test_utils::{fixtures, MockAccountDirectory, MockSpotifyServer};
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let server = MockSpotifyServer::start().await;
//!     server.mock_playback_for_token("token-a", fixtures::playing_snapshot()).await;
//!
//!     // Use server.base_url() to configure your client
//! }
//! ```

mod accounts;
pub mod fixtures;
mod spotify;

pub use accounts::MockAccountDirectory;
pub use spotify::MockSpotifyServer;
