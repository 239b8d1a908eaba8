//! Runtime configuration and HTTP client construction

use std::time::Duration;

use wpexit_core::oauth::OAuthClient;

use crate::prelude::*;

/// WordPress.com REST API root
pub const API_BASE: &str = "https://public-api.wordpress.com/rest/v1.1";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CLIENT_ID_VAR: &str = "WP_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "WP_API_KEY";

/// WordPress configuration from environment variables
#[derive(Debug, Clone)]
pub struct WordPressConfig {
    pub oauth: OAuthClient,
    pub api_base: String,
    pub timeout: Duration,
}

impl WordPressConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(Error::MissingEnv(name))
        };

        let client_id = var(CLIENT_ID_VAR)?;
        let client_secret = var(CLIENT_SECRET_VAR)?;

        Ok(Self {
            oauth: OAuthClient::new(client_id, client_secret),
            api_base: API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }
}

/// Plain client for the unauthenticated token exchange
pub fn create_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Client that sends `Authorization: Bearer <token>` on every request
pub fn create_authenticated_client(timeout: Duration, token: &str) -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

    let mut headers = HeaderMap::new();
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| eyre!("Invalid header value: {}", e))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}
