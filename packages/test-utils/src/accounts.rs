//! Mock account directory for testing token lookup and refresh
//!
//! Provides a [`MockAccountDirectory`] that holds linked accounts in memory
//! and answers refresh requests from a script, counting every call.
//!
//! # Lock Poisoning Recovery
//!
//! Locks are acquired with `unwrap_or_else(|e| e.into_inner())` so a test
//! that panics while holding one does not cascade into other tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use spotify_modal_client::{AccountDirectory, ConnectedAccount, RefreshError, TokenRefresher};

/// Scripted answer to the next refresh request
#[derive(Debug, Clone)]
enum RefreshScript {
    /// Store this token for the account and succeed
    Issue(String),
    /// Fail with this reason
    Fail(String),
}

/// In-memory linked accounts with scripted token refresh
///
/// Refresh requests are answered in the order they were scripted; with no
/// script left, refresh fails.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use spotify_modal_client::ConnectedAccount;
/// use spotify_modal_test_utils::MockAccountDirectory;
///
/// let accounts = Arc::new(MockAccountDirectory::new(vec![
///     ConnectedAccount::spotify("a", Some("stale")),
/// ]));
/// accounts.script_refresh("fresh");
/// ```
#[derive(Debug, Default)]
pub struct MockAccountDirectory {
    accounts: RwLock<Vec<ConnectedAccount>>,
    refresh_script: Mutex<VecDeque<RefreshScript>>,
    refresh_calls: AtomicUsize,
    hide_activity: AtomicBool,
}

impl MockAccountDirectory {
    /// Create a directory holding `accounts`, in order
    pub fn new(accounts: Vec<ConnectedAccount>) -> Self {
        Self {
            accounts: RwLock::new(accounts),
            ..Self::default()
        }
    }

    /// Next refresh succeeds and installs `token`
    pub fn script_refresh(&self, token: &str) {
        self.refresh_script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(RefreshScript::Issue(token.to_string()));
    }

    /// Next refresh fails with `reason`
    pub fn script_refresh_failure(&self, reason: &str) {
        self.refresh_script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(RefreshScript::Fail(reason.to_string()));
    }

    /// Number of refresh requests received so far
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Toggle the host-level "show activity" switch
    pub fn set_should_show_activity(&self, show: bool) {
        self.hide_activity.store(!show, Ordering::SeqCst);
    }

    /// Replace the access token of an account
    pub fn set_token(&self, account_id: &str, token: Option<&str>) {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        if let Some(account) = accounts.iter_mut().find(|a| a.id == account_id) {
            account.access_token = token.map(str::to_string);
        }
    }
}

impl AccountDirectory for MockAccountDirectory {
    fn accounts(&self) -> Vec<ConnectedAccount> {
        self.accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn should_show_activity(&self) -> bool {
        !self.hide_activity.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for MockAccountDirectory {
    async fn refresh_access_token(&self, account_id: &str) -> Result<(), RefreshError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .refresh_script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(RefreshScript::Issue(token)) => {
                self.set_token(account_id, Some(&token));
                Ok(())
            }
            Some(RefreshScript::Fail(reason)) => Err(RefreshError(reason)),
            None => Err(RefreshError("no refresh scripted".to_string())),
        }
    }
}
