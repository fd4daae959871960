//! Remote control error types

use reqwest::StatusCode;
use thiserror::Error;

/// Remote control client errors
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// No account id was supplied (nothing is active)
    #[error("no account selected")]
    NoAccount,

    /// The account has no access token on file
    #[error("account {0} has no access token")]
    Unauthenticated(String),

    /// The remote rejected the token (HTTP 401)
    #[error("access token expired for {endpoint}")]
    AuthExpired { endpoint: String },

    /// The token could not be refreshed, or the retried call was still rejected
    #[error("retrying {endpoint} failed: {reason}")]
    RefreshFailed { endpoint: String, reason: String },

    /// The remote answered with a non-2xx, non-401 status
    #[error("control action {endpoint} failed (HTTP {status})")]
    RemoteRequestFailed {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    /// The remote could not be reached at all
    #[error("Spotify API unreachable: {0}")]
    TransportUnreachable(#[source] reqwest::Error),

    /// A response body did not have the expected shape
    #[error("failed parsing player state for {account_id}: {source}")]
    MalformedResponse {
        account_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The endpoint could not be joined onto the API base
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SpotifyError {
    /// Errors the presentation layer is expected to prevent on its own
    /// (controls are disabled without an authenticated active account), so
    /// they are not surfaced to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::NoAccount | Self::Unauthenticated(_))
    }

    /// HTTP status attached to the failure, if the remote answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::AuthExpired { .. } | Self::RefreshFailed { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::RemoteRequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for remote control operations
pub type SpotifyResult<T> = Result<T, SpotifyError>;
