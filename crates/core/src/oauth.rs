//! OAuth2 authorization-code helpers for WordPress.com
//!
//! Builds the consent URL and the token request form, and reads the token out of
//! the exchange response. Sending the request is the shell's job.

use serde::Deserialize;

/// Consent page the user opens in a browser
pub const AUTHORIZE_URL: &str = "https://public-api.wordpress.com/oauth2/authorize";

/// Token exchange endpoint
pub const TOKEN_URL: &str = "https://public-api.wordpress.com/oauth2/token";

/// Must match the redirect URI registered for the application
pub const REDIRECT_URI: &str = "https://dev.ahill.net";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OAuthError {
    #[error("Token response is not valid JSON: {0}")]
    InvalidResponse(String),

    #[error("Token response did not contain an access token")]
    MissingToken,
}

/// Application credentials plus the endpoints they are used against
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl OAuthClient {
    /// Credentials against the public WordPress.com endpoints
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: REDIRECT_URI.to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
        }
    }
}

/// Response of the token exchange. Only `access_token` is required.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// URL the user visits to grant access
pub fn authorization_url(client: &OAuthClient) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code",
        client.authorize_url,
        urlencoding::encode(&client.client_id),
        urlencoding::encode(&client.redirect_uri)
    )
}

/// Form fields for the authorization-code grant
pub fn token_request_form<'a>(
    client: &'a OAuthClient,
    code: &'a str,
) -> Vec<(&'static str, &'a str)> {
    vec![
        ("client_id", client.client_id.as_str()),
        ("redirect_uri", client.redirect_uri.as_str()),
        ("client_secret", client.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
    ]
}

/// Pull the bearer token out of a successful exchange response body
pub fn parse_token_response(body: &str) -> Result<String, OAuthError> {
    let response: TokenResponse =
        serde_json::from_str(body).map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;

    response
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or(OAuthError::MissingToken)
}
