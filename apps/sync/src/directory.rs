//! Connected accounts read from a JSON file
//!
//! The file is owned by whatever performs the OAuth flow. A refresh request
//! re-reads it, picking up any token that was rotated in the meantime.
//!
//! ```json
//! {
//!   "show_activity": true,
//!   "accounts": [
//!     {"id": "abc", "type": "spotify", "show_activity": true, "access_token": "..."}
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use spotify_modal_client::{AccountDirectory, ConnectedAccount, RefreshError, TokenRefresher};
use tracing::{debug, info};

use crate::error::AccountsFileError;

fn default_show_activity() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AccountsDocument {
    #[serde(default = "default_show_activity")]
    show_activity: bool,
    #[serde(default)]
    accounts: Vec<ConnectedAccount>,
}

/// Account directory backed by a JSON file
#[derive(Debug)]
pub struct FileAccountDirectory {
    path: PathBuf,
    document: RwLock<AccountsDocument>,
}

impl FileAccountDirectory {
    /// Read the accounts file at `path`
    ///
    /// # Errors
    /// `AccountsFileError` if the file cannot be read or parsed
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, AccountsFileError> {
        let path = path.into();
        let document = read_document(&path).await?;

        info!(
            path = %path.display(),
            accounts = document.accounts.len(),
            "loaded connected accounts"
        );

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, replacing the accounts held in memory
    ///
    /// # Errors
    /// `AccountsFileError` if the file cannot be read or parsed; the
    /// previous accounts are kept in that case
    pub async fn reload(&self) -> Result<(), AccountsFileError> {
        let document = read_document(&self.path).await?;
        debug!(accounts = document.accounts.len(), "reloaded connected accounts");

        let mut current = self.document.write().unwrap_or_else(|e| e.into_inner());
        *current = document;
        Ok(())
    }
}

async fn read_document(path: &Path) -> Result<AccountsDocument, AccountsFileError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AccountsFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&raw).map_err(|source| AccountsFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl AccountDirectory for FileAccountDirectory {
    fn accounts(&self) -> Vec<ConnectedAccount> {
        self.document
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .accounts
            .clone()
    }

    fn should_show_activity(&self) -> bool {
        self.document
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .show_activity
    }
}

#[async_trait]
impl TokenRefresher for FileAccountDirectory {
    async fn refresh_access_token(&self, account_id: &str) -> Result<(), RefreshError> {
        let previous = self.access_token(account_id);

        self.reload()
            .await
            .map_err(|e| RefreshError(e.to_string()))?;

        match self.access_token(account_id) {
            None => Err(RefreshError(format!(
                "no access token on file for {}",
                account_id
            ))),
            Some(token) if Some(&token) == previous.as_ref() => {
                Err(RefreshError("access token was not rotated".to_string()))
            }
            Some(_) => Ok(()),
        }
    }
}
