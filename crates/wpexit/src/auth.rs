//! Authorization-code login against WordPress.com
//!
//! The consent step needs a human: they open the authorize URL, approve the
//! application and copy the `code` parameter from the redirect. That step sits
//! behind [`AuthorizationCodeSource`] so the exchange can be driven without a
//! browser.

use std::io::BufRead;
use std::process::{Command, Stdio};

use colored::Colorize;
use wpexit_core::oauth::{
    authorization_url, parse_token_response, token_request_form, OAuthClient,
};

use crate::prelude::{print, println, *};

/// Something that can produce an authorization code for a consent URL
pub trait AuthorizationCodeSource {
    fn authorization_code(&self, authorize_url: &str) -> Result<String>;
}

/// A code obtained ahead of time (`--code` / `WP_AUTH_CODE`)
#[derive(Debug, Clone)]
pub struct StaticCodeSource(pub String);

impl AuthorizationCodeSource for StaticCodeSource {
    fn authorization_code(&self, _authorize_url: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Prints the consent URL, optionally opens it, and reads the code from stdin
#[derive(Debug, Clone)]
pub struct ConsoleCodeSource {
    pub open_browser: bool,
}

impl AuthorizationCodeSource for ConsoleCodeSource {
    fn authorization_code(&self, authorize_url: &str) -> Result<String> {
        println!(
            "Please go to this URL and authorize access: {}",
            authorize_url.cyan()
        );

        if self.open_browser {
            if let Err(e) = open_in_browser(authorize_url) {
                log::warn!("Could not open a browser: {}", e);
            }
        }

        print!("Enter the authorization code from the URL: ");
        std::io::Write::flush(&mut std::io::stdout()).context("Failed to flush stdout")?;

        let mut code = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut code)
            .context("Failed to read authorization code from stdin")?;

        Ok(code)
    }
}

fn open_in_browser(url: &str) -> std::io::Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    spawn_detached(opener, url)
}

/// Start `program url` and reap it on a background thread
fn spawn_detached(program: &str, url: &str) -> std::io::Result<()> {
    let mut child = Command::new(program)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    std::thread::spawn(move || {
        if let Err(e) = child.wait() {
            log::debug!("Browser opener did not exit cleanly: {}", e);
        }
    });

    Ok(())
}

/// Exchange an authorization code for a bearer token.
///
/// Any non-2xx response is an [`Error::Authentication`]; there is no retry.
pub async fn exchange_code(
    http: &reqwest::Client,
    oauth: &OAuthClient,
    code: &str,
) -> Result<String> {
    log::debug!("Exchanging authorization code at {}", oauth.token_url);

    let response = http
        .post(&oauth.token_url)
        .form(&token_request_form(oauth, code))
        .send()
        .await
        .map_err(|e| eyre!("Failed to send token request: {}", e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| eyre!("Failed to read token response: {}", e))?;

    if !status.is_success() {
        return Err(Error::Authentication {
            status: status.as_u16(),
            body,
        }
        .into());
    }

    let token = parse_token_response(&body).map_err(Error::from)?;
    log::debug!("Access token acquired");

    Ok(token)
}

/// Obtain a code from `source` and trade it for a bearer token
pub async fn authenticate(
    http: &reqwest::Client,
    oauth: &OAuthClient,
    source: &dyn AuthorizationCodeSource,
) -> Result<String> {
    let code = source.authorization_code(&authorization_url(oauth))?;
    let code = code.trim();

    if code.is_empty() {
        return Err(Error::EmptyAuthorizationCode.into());
    }

    exchange_code(http, oauth, code).await
}
