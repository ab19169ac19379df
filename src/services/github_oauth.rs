//! GitHub OAuth client: authorize URL, code exchange, identity lookup.
//!
//! Flow:
//! 1. Browser is sent to `{oauth_base}/login/oauth/authorize` with a CSRF `state`
//! 2. GitHub redirects back with `code`, exchanged at `{oauth_base}/login/oauth/access_token`
//! 3. `{api_base}/user` gives the profile; `{api_base}/user/emails` fills in a
//!    private email

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::GitHubOAuthSettings;
use crate::error::OAuthError;
use crate::models::GitHubIdentity;

/// HTTP connect timeout for GitHub calls.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// GitHub requires a User-Agent on API calls.
const USER_AGENT: &str = "personal-blog";
/// Scope needed to read private emails.
pub const OAUTH_SCOPE: &str = "user:email";

/// Client for one configured GitHub OAuth app.
#[derive(Clone)]
pub struct GitHubOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    redirect_url: Option<String>,
    oauth_base_url: String,
    api_base_url: String,
}

impl GitHubOAuthClient {
    /// Build a client. Fails with `NotConfigured` unless OAuth is enabled
    /// with both client id and secret.
    pub fn new(settings: &GitHubOAuthSettings) -> Result<Self, OAuthError> {
        if !settings.enabled {
            return Err(OAuthError::NotConfigured);
        }
        let client_id = settings.client_id.clone().ok_or(OAuthError::NotConfigured)?;
        let client_secret = settings
            .client_secret
            .clone()
            .ok_or(OAuthError::NotConfigured)?;

        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            client_id,
            client_secret,
            redirect_url: settings.redirect_url.clone(),
            oauth_base_url: settings.oauth_base_url.trim_end_matches('/').to_string(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL to send the browser to for authorization.
    pub fn authorize_url(&self, state: &str) -> String {
        let mut url = format!(
            "{}/login/oauth/authorize?client_id={}&scope={}&state={}",
            self.oauth_base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(OAUTH_SCOPE),
            urlencoding::encode(state),
        );
        if let Some(redirect) = &self.redirect_url {
            url.push_str("&redirect_uri=");
            url.push_str(&urlencoding::encode(redirect));
        }
        url
    }

    /// Exchange an authorization code for a GitHub access token.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<SecretString, OAuthError> {
        debug!(code_length = code.len(), "Exchanging GitHub code for access token");

        let mut body = serde_json::json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret.expose_secret(),
            "code": code,
        });
        if let Some(redirect) = &self.redirect_url {
            body["redirect_uri"] = serde_json::Value::String(redirect.clone());
        }

        let response = self
            .http
            .post(format!("{}/login/oauth/access_token", self.oauth_base_url))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OAuthError::Status {
                endpoint: "/login/oauth/access_token",
                status: response.status().as_u16(),
            });
        }

        let token: TokenResponse = response.json().await?;

        match token.access_token.filter(|t| !t.is_empty()) {
            Some(access_token) => {
                info!("GitHub access token obtained");
                Ok(SecretString::from(access_token))
            }
            None => {
                let reason = token
                    .error_description
                    .or(token.error)
                    .unwrap_or_else(|| "no access_token in response".to_string());
                warn!(reason = %reason, "GitHub token exchange failed");
                Err(OAuthError::TokenExchange(reason))
            }
        }
    }

    /// Fetch the identity behind a GitHub access token.
    pub async fn get_user_info(
        &self,
        access_token: &SecretString,
    ) -> Result<GitHubIdentity, OAuthError> {
        let profile: GitHubProfile = self.get_json("/user", access_token).await?;
        debug!(github_id = profile.id, login = %profile.login, "GitHub profile fetched");

        let email = match profile.email.filter(|e| !e.is_empty()) {
            Some(email) => email,
            None => {
                debug!(github_id = profile.id, "Profile email hidden, listing emails");
                let emails: Vec<GitHubEmail> = self.get_json("/user/emails", access_token).await?;
                select_email(&emails).ok_or(OAuthError::MissingEmail)?
            }
        };

        Ok(GitHubIdentity {
            id: profile.id,
            email,
            name: profile.name,
            login: profile.login,
            avatar_url: profile.avatar_url,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &'static str,
        access_token: &SecretString,
    ) -> Result<T, OAuthError> {
        let response = self
            .http
            .get(format!("{}{}", self.api_base_url, endpoint))
            .bearer_auth(access_token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(endpoint, status = response.status().as_u16(), "GitHub API error");
            return Err(OAuthError::Status {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

/// Pick an email: primary and verified, else any verified, else the first.
pub fn select_email(emails: &[GitHubEmail]) -> Option<String> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .or_else(|| emails.iter().find(|e| e.verified))
        .or_else(|| emails.first())
        .map(|e| e.email.clone())
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct GitHubProfile {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

/// One entry of `GET /user/emails`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubEmail {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
}
