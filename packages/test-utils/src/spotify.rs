//! Mock Spotify Web API server
//!
//! Provides a [`MockSpotifyServer`] that simulates the player endpoints
//! under `/v1/me/` for testing the control client and the startup poll.
//! Accounts are told apart by their bearer token.

use std::time::Duration;

use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Path prefix every player endpoint lives under
const BASE_PATH: &str = "/v1/me/";

/// Mock Spotify Web API server
///
/// This struct wraps a [`wiremock::MockServer`] and provides convenience
/// methods for setting up common player API responses.
///
/// # Example
///
/// ```rust,ignore
/// use spotify_modal_test_utils::MockSpotifyServer;
///
/// #[tokio::test]
/// async fn test_play() {
///     let server = MockSpotifyServer::start().await;
///     server.mock_command("PUT", "player/play", 204).await;
///
///     // Configure your client with server.base_url()
/// }
/// ```
pub struct MockSpotifyServer {
    server: MockServer,
}

impl MockSpotifyServer {
    /// Start a new mock Spotify server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure the client with (ends with `/v1/me/`)
    pub fn base_url(&self) -> String {
        format!("{}{}", self.server.uri(), BASE_PATH)
    }

    fn endpoint_path(endpoint: &str) -> String {
        format!("{}{}", BASE_PATH, endpoint.trim_start_matches('/'))
    }

    /// Mount a mock answering `endpoint` (path only, no query) with `status`
    pub async fn mock_command(&self, http_method: &str, endpoint: &str, status: u16) {
        Mock::given(method(http_method))
            .and(path(Self::endpoint_path(endpoint)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock answering `endpoint` with `status` for the first `times`
    /// requests only; later requests fall through to mocks mounted after it.
    pub async fn mock_command_times(
        &self,
        http_method: &str,
        endpoint: &str,
        status: u16,
        times: u64,
    ) {
        Mock::given(method(http_method))
            .and(path(Self::endpoint_path(endpoint)))
            .respond_with(ResponseTemplate::new(status))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Mount a mock answering `endpoint` with `status` after `delay`, keeping
    /// the request in flight meanwhile
    pub async fn mock_command_delayed(
        &self,
        http_method: &str,
        endpoint: &str,
        status: u16,
        delay: Duration,
    ) {
        Mock::given(method(http_method))
            .and(path(Self::endpoint_path(endpoint)))
            .respond_with(ResponseTemplate::new(status).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock answering `endpoint` with `status` only when the request
    /// carries `Authorization: Bearer <token>`
    pub async fn mock_command_for_token(
        &self,
        http_method: &str,
        endpoint: &str,
        token: &str,
        status: u16,
    ) {
        Mock::given(method(http_method))
            .and(path(Self::endpoint_path(endpoint)))
            .and(header("Authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for a successful "current playback" poll of one account
    pub async fn mock_playback_for_token(&self, token: &str, snapshot: Value) {
        Mock::given(method("GET"))
            .and(path(Self::endpoint_path("player")))
            .and(header("Authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(snapshot))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock answering the "current playback" poll of one account with
    /// a raw body (e.g. something that is not JSON)
    pub async fn mock_playback_raw_for_token(&self, token: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(Self::endpoint_path("player")))
            .and(header("Authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// All requests received so far
    pub async fn received(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Number of requests received so far
    pub async fn request_count(&self) -> usize {
        self.received().await.len()
    }

    /// Paths of the received requests, in arrival order
    pub async fn received_paths(&self) -> Vec<String> {
        self.received()
            .await
            .iter()
            .map(|request| request.url.path().to_string())
            .collect()
    }

    /// Mount a catch-all for requests carrying `token` that must never match;
    /// checked by [`Self::verify`]
    pub async fn expect_no_requests_for_token(&self, token: &str) {
        Mock::given(header("Authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Verify the expectations of all mounted mocks
    pub async fn verify(&self) {
        self.server.verify().await;
    }
}
