//! Spotify player client implementation

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use spotify_modal_config::SpotifyApiConfig;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::accounts::{AccountDirectory, TokenRefresher};
use crate::error::{SpotifyError, SpotifyResult};
use crate::models::{PlaybackSnapshot, RepeatMode};
use crate::suppression::SuppressionFlag;
use crate::toast::{Toast, ToastBroadcast};

/// Maximum error body size kept on `RemoteRequestFailed`
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// A remote player endpoint relative to the API base
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    CurrentPlayback,
    Play,
    Pause,
    Next,
    Previous,
    Seek { position_ms: u64 },
    Volume { percent: u8 },
    Shuffle { state: bool },
    Repeat { state: RepeatMode },
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Self::CurrentPlayback => Method::GET,
            Self::Next | Self::Previous => Method::POST,
            _ => Method::PUT,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentPlayback => f.write_str("player"),
            Self::Play => f.write_str("player/play"),
            Self::Pause => f.write_str("player/pause"),
            Self::Next => f.write_str("player/next"),
            Self::Previous => f.write_str("player/previous"),
            Self::Seek { position_ms } => write!(f, "player/seek?position_ms={}", position_ms),
            Self::Volume { percent } => write!(f, "player/volume?volume_percent={}", percent),
            Self::Shuffle { state } => write!(f, "player/shuffle?state={}", state),
            Self::Repeat { state } => write!(f, "player/repeat?state={}", state),
        }
    }
}

/// A 2xx answer from the remote
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Authenticated client for the remote player API
///
/// Every call raises the shared [`SuppressionFlag`] for its duration, and a
/// 401 is answered with exactly one token refresh and one retry.
#[derive(Clone)]
pub struct SpotifyClient {
    http_client: Client,
    base_url: Url,
    directory: Arc<dyn AccountDirectory>,
    refresher: Arc<dyn TokenRefresher>,
    suppression: SuppressionFlag,
    toasts: ToastBroadcast,
}

impl fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("base_url", &self.base_url.as_str())
            .field("suppressed", &self.suppression.is_set())
            .finish()
    }
}

impl SpotifyClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    /// - `SpotifyError::InvalidUrl` if the configured base URL does not parse
    /// - `SpotifyError::Http` if the HTTP client cannot be built
    pub fn new(
        config: &SpotifyApiConfig,
        directory: Arc<dyn AccountDirectory>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> SpotifyResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("spotify-modal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(&config.base_url)?,
            directory,
            refresher,
            suppression: SuppressionFlag::new(),
            toasts: ToastBroadcast::new(),
        })
    }

    /// Flag raised while a request of this client is in flight
    pub fn suppression(&self) -> &SuppressionFlag {
        &self.suppression
    }

    /// Channel on which terminal command failures are announced
    pub fn toasts(&self) -> &ToastBroadcast {
        &self.toasts
    }

    pub fn directory(&self) -> &Arc<dyn AccountDirectory> {
        &self.directory
    }

    fn endpoint_url(&self, endpoint: &str) -> SpotifyResult<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Send an authenticated request for `account_id`
    ///
    /// Callers only see the final outcome; the refresh-and-retry on an
    /// expired token happens inside.
    ///
    /// # Errors
    /// - `SpotifyError::NoAccount` if `account_id` is empty (no request made)
    /// - `SpotifyError::Unauthenticated` if the account has no token (no request made)
    /// - `SpotifyError::RefreshFailed` if the token could not be refreshed or
    ///   the retried request was rejected again
    /// - `SpotifyError::RemoteRequestFailed` for any other non-2xx answer
    /// - `SpotifyError::TransportUnreachable` if the remote cannot be reached
    #[instrument(skip(self))]
    pub async fn send(
        &self,
        account_id: &str,
        endpoint: &str,
        method: Method,
    ) -> SpotifyResult<ApiResponse> {
        if account_id.is_empty() {
            debug!("no account selected, not sending");
            return Err(SpotifyError::NoAccount);
        }

        let Some(token) = self.directory.access_token(account_id) else {
            debug!("account has no access token, not sending");
            return Err(SpotifyError::Unauthenticated(account_id.to_string()));
        };

        let url = self.endpoint_url(endpoint)?;

        self.suppression.raise();
        let result = self
            .send_with_refresh(account_id, endpoint, &url, method, token)
            .await;
        self.suppression.clear();

        if let Err(e) = &result {
            self.report(e);
        }

        result
    }

    /// Send a typed player endpoint, discarding the response body
    pub async fn send_endpoint(&self, account_id: &str, endpoint: Endpoint) -> SpotifyResult<()> {
        self.send(account_id, &endpoint.to_string(), endpoint.method())
            .await
            .map(|_| ())
    }

    async fn send_with_refresh(
        &self,
        account_id: &str,
        endpoint: &str,
        url: &Url,
        method: Method,
        token: String,
    ) -> SpotifyResult<ApiResponse> {
        match self.attempt(endpoint, url, method.clone(), &token).await {
            Err(SpotifyError::AuthExpired { .. }) => {}
            other => return other,
        }

        warn!(account_id, endpoint, "access token rejected, refreshing");

        if let Err(e) = self.refresher.refresh_access_token(account_id).await {
            return Err(SpotifyError::RefreshFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            });
        }

        let token = self
            .directory
            .access_token(account_id)
            .ok_or_else(|| SpotifyError::Unauthenticated(account_id.to_string()))?;

        info!(account_id, endpoint, "retrying with refreshed token");

        match self.attempt(endpoint, url, method, &token).await {
            Err(SpotifyError::AuthExpired { .. }) => Err(SpotifyError::RefreshFailed {
                endpoint: endpoint.to_string(),
                reason: "retried request was still unauthorized".to_string(),
            }),
            other => other,
        }
    }

    /// A single network round trip, with no retry
    async fn attempt(
        &self,
        endpoint: &str,
        url: &Url,
        method: Method,
        token: &str,
    ) -> SpotifyResult<ApiResponse> {
        let response = self
            .http_client
            .request(method, url.clone())
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(SpotifyError::TransportUnreachable)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(SpotifyError::TransportUnreachable)?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(SpotifyError::AuthExpired {
                endpoint: endpoint.to_string(),
            });
        }

        if !status.is_success() {
            return Err(SpotifyError::RemoteRequestFailed {
                endpoint: endpoint.to_string(),
                status,
                body: Self::truncate_error_body(body),
            });
        }

        Ok(ApiResponse { status, body })
    }

    /// Log a terminal failure and, where the user should know, toast it
    fn report(&self, error: &SpotifyError) {
        match error {
            SpotifyError::RefreshFailed { .. } | SpotifyError::RemoteRequestFailed { .. } => {
                error!(error = %error, "control action failed");
                let status = error
                    .status()
                    .map(|status| status.as_u16().to_string())
                    .unwrap_or_else(|| "?".to_string());
                self.toasts.send(Toast::failure(format!(
                    "[SpotifyModal] control action failed (HTTP {})",
                    status
                )));
            }
            SpotifyError::TransportUnreachable(_) => {
                error!(error = %error, "Spotify API unreachable");
            }
            _ => debug!(error = %error, "request not sent"),
        }
    }

    fn truncate_error_body(body: String) -> String {
        if body.len() <= MAX_ERROR_BODY_SIZE {
            return body;
        }

        let truncate_at = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_ERROR_BODY_SIZE)
            .last()
            .unwrap_or(0);

        format!("{}... (truncated)", &body[..truncate_at])
    }

    /// Fetch the account's current playback snapshot
    ///
    /// Returns `Ok(None)` when the remote answers 2xx with an empty body
    /// (nothing is playing).
    ///
    /// # Errors
    /// Everything [`Self::send`] returns, plus
    /// `SpotifyError::MalformedResponse` if the body is not a snapshot.
    #[instrument(skip(self))]
    pub async fn current_playback(
        &self,
        account_id: &str,
    ) -> SpotifyResult<Option<PlaybackSnapshot>> {
        let endpoint = Endpoint::CurrentPlayback;
        let response = self
            .send(account_id, &endpoint.to_string(), endpoint.method())
            .await?;

        if response.status == StatusCode::NO_CONTENT || response.body.trim().is_empty() {
            debug!("nothing playing");
            return Ok(None);
        }

        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(|source| SpotifyError::MalformedResponse {
                account_id: account_id.to_string(),
                source,
            })
    }

    pub async fn set_playing(&self, account_id: &str, playing: bool) -> SpotifyResult<()> {
        let endpoint = if playing {
            Endpoint::Play
        } else {
            Endpoint::Pause
        };
        self.send_endpoint(account_id, endpoint).await
    }

    pub async fn skip(&self, account_id: &str, next: bool) -> SpotifyResult<()> {
        let endpoint = if next {
            Endpoint::Next
        } else {
            Endpoint::Previous
        };
        self.send_endpoint(account_id, endpoint).await
    }

    pub async fn seek(&self, account_id: &str, position_ms: u64) -> SpotifyResult<()> {
        self.send_endpoint(account_id, Endpoint::Seek { position_ms })
            .await
    }

    pub async fn set_volume(&self, account_id: &str, percent: u8) -> SpotifyResult<()> {
        self.send_endpoint(
            account_id,
            Endpoint::Volume {
                percent: percent.min(100),
            },
        )
        .await
    }

    pub async fn set_shuffle(&self, account_id: &str, state: bool) -> SpotifyResult<()> {
        self.send_endpoint(account_id, Endpoint::Shuffle { state })
            .await
    }

    pub async fn set_repeat(&self, account_id: &str, state: RepeatMode) -> SpotifyResult<()> {
        self.send_endpoint(account_id, Endpoint::Repeat { state })
            .await
    }
}
