//! Error types for the sync engine

use std::path::PathBuf;

use spotify_modal_client::{PlayerAction, SpotifyError};
use thiserror::Error;

/// Player control errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// The remote currently refuses this action; nothing was sent
    #[error("{0} is currently disallowed")]
    Disallowed(PlayerAction),

    /// The request was sent (or short-circuited) and failed
    #[error(transparent)]
    Remote(#[from] SpotifyError),
}

impl ControlError {
    /// Whether nothing was shown to the user for this failure
    pub fn is_silent(&self) -> bool {
        match self {
            Self::Disallowed(_) => true,
            Self::Remote(e) => e.is_silent(),
        }
    }
}

/// Result type for player controls
pub type ControlResult<T> = Result<T, ControlError>;

/// Connected-accounts file errors
#[derive(Error, Debug)]
pub enum AccountsFileError {
    /// The file could not be read
    #[error("failed to read accounts file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid accounts document
    #[error("failed to parse accounts file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
