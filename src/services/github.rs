//! GitHub OAuth login and account linking.
//!
//! # Flow
//!
//! 1. `/auth/github/login` redirects to [`GithubOAuthService::authorize_url`]
//! 2. GitHub redirects back with `?code=`; [`GithubOAuthService::complete_login`]
//!    exchanges it for a token, persists the token under `GITHUB_TOKEN`, and
//!    fetches the user profile
//! 3. The dashboard polls [`GithubOAuthService::status`] or links a personal
//!    token directly via [`GithubOAuthService::link`]
//!
//! Persisting the token is best-effort: a store failure is logged and the
//! login still succeeds.

use crate::config::{GITHUB_TOKEN_KEY, SecretStore};
use crate::models::GithubConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during OAuth and account linking
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OAuthError {
    #[error("Missing code")]
    MissingCode,

    #[error("Token is required")]
    MissingToken,

    /// Provider answered without an `access_token`; carries its raw JSON body
    #[error("Token exchange failed")]
    TokenExchangeFailed(Value),

    #[error("GitHub request failed: {0}")]
    Upstream(String),

    #[error("Not linked")]
    NotLinked,
}

/// Subset of `GET /user` the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GithubUser {
    pub login: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
    pub id: Option<Value>,
}

/// Response of the OAuth callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginResult {
    pub authenticated: bool,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub profile: Option<String>,
    pub id: Option<Value>,
}

impl From<GithubUser> for LoginResult {
    fn from(user: GithubUser) -> Self {
        Self {
            authenticated: true,
            username: user.login,
            avatar: user.avatar_url,
            profile: user.html_url,
            id: user.id,
        }
    }
}

/// Response of the status and link endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkStatus {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub message: String,
}

impl LinkStatus {
    fn linked(username: Option<String>) -> Self {
        let message = match &username {
            Some(name) => format!("Linked as {}", name),
            None => "Linked".to_string(),
        };
        Self {
            success: true,
            username,
            message,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            username: None,
            message: message.into(),
        }
    }
}

pub struct GithubOAuthService {
    config: GithubConfig,
    agent: ureq::Agent,
    store: Arc<dyn SecretStore>,
}

impl GithubOAuthService {
    pub fn new(config: GithubConfig, timeout: Duration, store: Arc<dyn SecretStore>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self {
            config,
            agent,
            store,
        }
    }

    /// Authorize URL with every query component percent-encoded.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}",
            self.config.authorize_url,
            percent_encode(&self.config.client_id),
            percent_encode(&self.config.redirect_uri),
            percent_encode(&self.config.scope)
        )
    }

    /// Exchange an authorization code for an access token.
    pub fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let result = self
            .agent
            .post(&self.config.token_url)
            .set("Accept", "application/json")
            .send_form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ]);

        let response = match result {
            Ok(resp) | Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(err)) => {
                return Err(OAuthError::Upstream(err.to_string()));
            }
        };

        let details = read_json(response)?;
        match details.get("access_token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => {
                tracing::warn!("GitHub token exchange failed: {}", details);
                Err(OAuthError::TokenExchangeFailed(details))
            }
        }
    }

    /// Fetch the authenticated user for `token`.
    pub fn fetch_user(&self, token: &str) -> Result<GithubUser, OAuthError> {
        let url = format!("{}/user", self.config.api_base.trim_end_matches('/'));
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", token))
            .set("Accept", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => {
                    OAuthError::Upstream(format!("GitHub API returned status {}", code))
                }
                ureq::Error::Transport(err) => OAuthError::Upstream(err.to_string()),
            })?;

        serde_json::from_value(read_json(response)?)
            .map_err(|e| OAuthError::Upstream(format!("Invalid user response: {}", e)))
    }

    /// Handle the OAuth callback: exchange, persist, fetch the profile.
    pub fn complete_login(&self, code: Option<&str>) -> Result<LoginResult, OAuthError> {
        let code = match code {
            Some(code) if !code.is_empty() => code,
            _ => return Err(OAuthError::MissingCode),
        };

        let token = self.exchange_code(code)?;

        if let Err(e) = self.store.upsert(GITHUB_TOKEN_KEY, &token) {
            tracing::warn!("Could not persist {}: {:#}", GITHUB_TOKEN_KEY, e);
        }

        let user = self.fetch_user(&token)?;
        tracing::info!(
            "GitHub login completed for {}",
            user.login.as_deref().unwrap_or("<unknown>")
        );
        Ok(user.into())
    }

    /// Report whether a stored token still resolves to a GitHub user.
    pub fn status(&self) -> LinkStatus {
        let token = match self.store.get(GITHUB_TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => return LinkStatus::failed(OAuthError::NotLinked.to_string()),
            Err(e) => return LinkStatus::failed(format!("Could not read token: {}", e)),
        };

        match self.fetch_user(&token) {
            Ok(user) => LinkStatus::linked(user.login),
            Err(e) => LinkStatus::failed(e.to_string()),
        }
    }

    /// Validate a personal access token and store it.
    pub fn link(&self, token: &str) -> Result<LinkStatus, OAuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(OAuthError::MissingToken);
        }

        let user = match self.fetch_user(token) {
            Ok(user) => user,
            Err(e) => return Ok(LinkStatus::failed(e.to_string())),
        };

        if let Err(e) = self.store.upsert(GITHUB_TOKEN_KEY, token) {
            tracing::warn!("Could not persist {}: {:#}", GITHUB_TOKEN_KEY, e);
            return Ok(LinkStatus::failed(format!("Could not save token: {}", e)));
        }

        tracing::info!(
            "Linked GitHub token for {}",
            user.login.as_deref().unwrap_or("<unknown>")
        );
        Ok(LinkStatus::linked(user.login))
    }
}

fn read_json(response: ureq::Response) -> Result<Value, OAuthError> {
    let text = response
        .into_string()
        .map_err(|e| OAuthError::Upstream(e.to_string()))?;
    serde_json::from_str(&text)
        .map_err(|e| OAuthError::Upstream(format!("Invalid JSON from GitHub: {}", e)))
}

/// RFC 3986 percent-encoding; only unreserved characters pass through.
fn percent_encode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
