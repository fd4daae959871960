//! Spotify Web API configuration types

use url::Url;

use crate::{get_env_or_default, parse_env, ConfigError, ConfigResult};

/// Default base for every player endpoint
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1/me/";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Remote player API configuration
#[derive(Debug, Clone)]
pub struct SpotifyApiConfig {
    /// Base URL that endpoints such as `player/play` are joined onto.
    /// Always ends with a `/`.
    pub base_url: String,

    /// Transport-level request timeout in seconds
    pub timeout_secs: u64,

    /// Transport-level connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl SpotifyApiConfig {
    /// Load Spotify API configuration from environment variables
    ///
    /// # Errors
    /// - `ConfigError::InvalidUrl` if `SPOTIFY_API_URL` is not an absolute URL
    /// - `ConfigError::InvalidValue` if a timeout is not a number
    pub fn from_env() -> ConfigResult<Self> {
        let base_url = get_env_or_default("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL);

        Ok(Self {
            base_url: normalize_base_url("SPOTIFY_API_URL", &base_url)?,
            timeout_secs: parse_env("SPOTIFY_API_TIMEOUT", DEFAULT_TIMEOUT_SECS)?,
            connect_timeout_secs: parse_env(
                "SPOTIFY_API_CONNECT_TIMEOUT",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        })
    }

    /// Create a configuration with a custom base URL (useful for testing
    /// against a mock server)
    pub fn with_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let base_url = if url.ends_with('/') {
            url
        } else {
            format!("{}/", url)
        };

        Self {
            base_url,
            ..Self::default()
        }
    }
}

impl Default for SpotifyApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SPOTIFY_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Endpoints are joined relative to the base, so the base must end with `/`
/// or the last path segment would be replaced.
fn normalize_base_url(name: &str, raw: &str) -> ConfigResult<String> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            name.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url.to_string())
}
