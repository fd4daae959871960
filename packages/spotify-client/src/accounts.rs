//! Connected-account seams supplied by the host
//!
//! The host owns the list of linked accounts and their OAuth tokens; the
//! client only reads tokens and asks for a refresh when the remote rejects
//! one.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account type of linked Spotify accounts
pub const SPOTIFY_ACCOUNT_TYPE: &str = "spotify";

/// An account linked in the host
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: String,
    #[serde(rename = "type")]
    pub account_type: String,
    /// Whether the user shares this account's activity
    #[serde(default)]
    pub show_activity: bool,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl ConnectedAccount {
    pub fn spotify(id: impl Into<String>, access_token: Option<&str>) -> Self {
        Self {
            id: id.into(),
            account_type: SPOTIFY_ACCOUNT_TYPE.to_string(),
            show_activity: true,
            access_token: access_token.map(str::to_string),
        }
    }

    /// Spotify account that shares its activity, i.e. one we may poll
    pub fn is_pollable(&self) -> bool {
        self.account_type == SPOTIFY_ACCOUNT_TYPE && self.show_activity
    }
}

impl fmt::Debug for ConnectedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectedAccount")
            .field("id", &self.id)
            .field("account_type", &self.account_type)
            .field("show_activity", &self.show_activity)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Read access to the host's linked accounts
pub trait AccountDirectory: Send + Sync {
    /// All linked accounts, in the host's order
    fn accounts(&self) -> Vec<ConnectedAccount>;

    /// Current access token of a Spotify account
    fn access_token(&self, account_id: &str) -> Option<String> {
        self.accounts()
            .into_iter()
            .find(|account| {
                account.id == account_id && account.account_type == SPOTIFY_ACCOUNT_TYPE
            })
            .and_then(|account| account.access_token)
            .filter(|token| !token.is_empty())
    }

    /// Whether the host currently allows showing player activity at all
    fn should_show_activity(&self) -> bool {
        true
    }
}

/// Token refresh failure reported by the host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("token refresh failed: {0}")]
pub struct RefreshError(pub String);

/// Issues a fresh access token for an account on demand.
///
/// On success the new token must be visible through the
/// [`AccountDirectory`] before the call returns.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh_access_token(&self, account_id: &str) -> Result<(), RefreshError>;
}
