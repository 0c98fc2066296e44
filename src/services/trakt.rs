//! Trakt API client: device-code auth, token refresh and scrobbling.

use crate::models::config::TraktConfig;
use crate::utils::fs::write_file;
use crate::{Error, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const TRAKT_API_URL: &str = "https://api.trakt.tv";
const OOB_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Stored OAuth tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraktTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// When the tokens were stored (RFC 3339).
    #[serde(default)]
    pub saved_at: Option<String>,
}

/// Device code issued for the user to confirm.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    /// Seconds until the code expires.
    pub expires_in: u64,
    /// Polling interval in seconds.
    pub interval: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

/// Scrobble action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScrobbleAction {
    Start,
    Pause,
    Stop,
}

impl ScrobbleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrobbleAction::Start => "start",
            ScrobbleAction::Pause => "pause",
            ScrobbleAction::Stop => "stop",
        }
    }
}

/// Item being scrobbled, by Trakt ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrobbleItem {
    Movie(u64),
    Episode(u64),
}

/// Trakt API client.
pub struct TraktClient {
    client_id: String,
    client_secret: String,
    language: String,
    api_url: String,
    tokens_file: PathBuf,
    client: reqwest::Client,
}

impl TraktClient {
    /// Create a client. Fails without client id and secret.
    pub fn from_config(config: &TraktConfig, tokens_file: PathBuf) -> Result<Self> {
        let id = config.client_id.as_deref().map(str::trim).unwrap_or_default();
        let secret = config.client_secret.as_deref().map(str::trim).unwrap_or_default();
        if id.is_empty() || secret.is_empty() {
            return Err(Error::TraktCredentialsMissing);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client_id: id.to_string(),
            client_secret: secret.to_string(),
            language: config.language.clone(),
            api_url: TRAKT_API_URL.to_string(),
            tokens_file,
            client,
        })
    }

    /// Point the client at another API root.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    // Token storage

    /// Stored tokens, `None` when not authenticated.
    pub fn load_tokens(&self) -> Result<Option<TraktTokens>> {
        if !self.tokens_file.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.tokens_file)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save_tokens(&self, access_token: String, refresh_token: String) -> Result<TraktTokens> {
        let tokens = TraktTokens {
            access_token,
            refresh_token,
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        write_file(&self.tokens_file, serde_json::to_string_pretty(&tokens)?)?;
        tracing::debug!("Saved Trakt tokens to {}", self.tokens_file.display());
        Ok(tokens)
    }

    /// Forget stored tokens.
    pub fn clear_tokens(&self) -> Result<()> {
        if self.tokens_file.exists() {
            std::fs::remove_file(&self.tokens_file)?;
        }
        Ok(())
    }

    // Device-code auth

    /// Request a device code for the user to confirm.
    pub async fn request_device_code(&self) -> Result<DeviceCode> {
        let resp = self
            .client
            .post(self.url("oauth/device/code"))
            .json(&json!({ "client_id": self.client_id }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::TraktRequest(format!(
                "device code: HTTP {}",
                resp.status().as_u16()
            )));
        }
        Ok(resp.json().await?)
    }

    /// Poll until the user confirms the device code, then store the tokens.
    ///
    /// 400 means the user has not confirmed yet. Any other non-200 status
    /// aborts. Running past `expires_in` gives [`Error::TraktAuthExpired`].
    pub async fn poll_device_token(&self, code: &DeviceCode) -> Result<TraktTokens> {
        let deadline = Instant::now() + Duration::from_secs(code.expires_in);
        let interval = Duration::from_secs(code.interval);
        let body = json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "code": code.device_code,
        });

        while Instant::now() < deadline {
            let resp = self
                .client
                .post(self.url("oauth/device/token"))
                .json(&body)
                .send()
                .await?;

            match resp.status() {
                StatusCode::OK => {
                    let token: TokenResponse = resp.json().await?;
                    tracing::info!("Trakt device authorized");
                    return self.save_tokens(token.access_token, token.refresh_token);
                }
                StatusCode::BAD_REQUEST => {
                    tracing::debug!("Trakt authorization pending");
                    tokio::time::sleep(interval).await;
                }
                other => {
                    return Err(Error::TraktRequest(format!(
                        "device token: HTTP {}",
                        other.as_u16()
                    )));
                }
            }
        }

        Err(Error::TraktAuthExpired)
    }

    /// Exchange the refresh token for new tokens.
    ///
    /// A 401 clears the stored tokens.
    pub async fn refresh(&self) -> Result<TraktTokens> {
        let tokens = self.load_tokens()?.ok_or(Error::TraktNotAuthenticated)?;

        let resp = self
            .client
            .post(self.url("oauth/token"))
            .json(&json!({
                "client_id": self.client_id,
                "client_secret": self.client_secret,
                "refresh_token": tokens.refresh_token,
                "grant_type": "refresh_token",
                "redirect_uri": OOB_REDIRECT,
            }))
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                tracing::warn!("Trakt refresh token rejected, clearing stored tokens");
                self.clear_tokens()?;
                Err(Error::TraktTokenRejected)
            }
            status if status.is_success() => {
                let token: TokenResponse = resp.json().await?;
                tracing::info!("Trakt token refreshed");
                self.save_tokens(token.access_token, token.refresh_token)
            }
            status => Err(Error::TraktRequest(format!("refresh: HTTP {}", status.as_u16()))),
        }
    }

    // API calls

    fn request(&self, method: reqwest::Method, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(method, self.url(path))
            .header("trakt-api-version", "2")
            .header("trakt-api-key", &self.client_id)
            .header(reqwest::header::ACCEPT_LANGUAGE, &self.language);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Trakt ID for a TMDB ID. `kind` is `movie` or `show`.
    pub async fn trakt_id(&self, tmdb_id: u64, kind: &str) -> Result<Option<u64>> {
        let path = format!("search/tmdb/{}?type={}", tmdb_id, kind);
        let resp = self.request(reqwest::Method::GET, &path, None).send().await?;
        if !resp.status().is_success() {
            return Err(Error::TraktRequest(format!(
                "search/tmdb/{}: HTTP {}",
                tmdb_id,
                resp.status().as_u16()
            )));
        }

        let results: Vec<serde_json::Value> = resp.json().await?;
        Ok(results
            .first()
            .and_then(|r| r.get(kind))
            .and_then(|item| item["ids"]["trakt"].as_u64()))
    }

    /// Trakt ID of an episode of a show.
    pub async fn episode_trakt_id(&self, show_id: u64, season: u32, episode: u32) -> Result<Option<u64>> {
        let path = format!("shows/{}/seasons/{}/episodes/{}", show_id, season, episode);
        let resp = self.request(reqwest::Method::GET, &path, None).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Error::TraktRequest(format!("{}: HTTP {}", path, resp.status().as_u16())));
        }
        let data: serde_json::Value = resp.json().await?;
        Ok(data["ids"]["trakt"].as_u64())
    }

    /// Send a scrobble. A 401 refreshes the token and retries once.
    pub async fn scrobble(&self, action: ScrobbleAction, item: ScrobbleItem, progress: f32) -> Result<()> {
        let (kind, id) = match item {
            ScrobbleItem::Movie(id) => ("movie", id),
            ScrobbleItem::Episode(id) => ("episode", id),
        };
        let body = json!({
            kind: { "ids": { "trakt": id } },
            "progress": progress.clamp(0.0, 100.0),
        });
        let path = format!("scrobble/{}", action.as_str());

        let mut tokens = self.load_tokens()?.ok_or(Error::TraktNotAuthenticated)?;
        let mut refreshed = false;
        loop {
            tracing::info!(
                "Scrobble {} for {} {} at {:.1}%",
                action.as_str(),
                kind,
                id,
                progress
            );
            let resp = self
                .request(reqwest::Method::POST, &path, Some(&tokens.access_token))
                .json(&body)
                .send()
                .await?;

            match resp.status() {
                StatusCode::UNAUTHORIZED if !refreshed => {
                    tracing::info!("Scrobble got 401, refreshing token");
                    tokens = self.refresh().await?;
                    refreshed = true;
                }
                status if status.is_success() => return Ok(()),
                status => {
                    return Err(Error::TraktRequest(format!(
                        "scrobble/{}: HTTP {}",
                        action.as_str(),
                        status.as_u16()
                    )));
                }
            }
        }
    }
}
