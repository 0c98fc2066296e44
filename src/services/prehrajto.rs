//! prehraj.to site client.
//!
//! One cookie jar is shared by two HTTP clients: the regular one follows
//! redirects, the other does not so the premium download redirect can be read.

use crate::models::config::SiteConfig;
use crate::services::listing::absolute_url;
use crate::{Error, Result};
use regex::Regex;
use reqwest::cookie::Jar;
use reqwest::redirect::Policy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

static SOURCES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)var sources = \[(.*?);").expect("static pattern"));
static FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)file:\s*"(.*?)"|src:\s*"(.*?)""#).expect("static pattern")
});
static TRACKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)var tracks = (.*?);").expect("static pattern"));
static TRACK_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?src["']?\s*:\s*["'](.*?)["']"#).expect("static pattern")
});
static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("static selector"));
static LOGIN_OK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.color-green").expect("static selector"));

/// Stream and subtitle URLs of a video page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVideo {
    pub stream_url: String,
    pub subtitle_url: Option<String>,
}

/// prehraj.to HTTP client.
pub struct PrehrajtoClient {
    base_url: String,
    client: reqwest::Client,
    no_redirect: reqwest::Client,
    premium: AtomicBool,
}

impl PrehrajtoClient {
    /// Create a client from site config.
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let timeout = Duration::from_secs(config.timeout.max(1));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()?;
        let no_redirect = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .cookie_provider(jar)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            no_redirect,
            premium: AtomicBool::new(false),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a premium session is active.
    pub fn is_premium(&self) -> bool {
        self.premium.load(Ordering::Relaxed)
    }

    /// Search listing URL for a page (1-based).
    pub fn search_url(&self, query: &str, page: u32) -> String {
        format!(
            "{}/hledej/{}?vp-page={}",
            self.base_url,
            urlencoding::encode(query),
            page
        )
    }

    /// Log in with a premium account. The session cookies stay in the jar.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let form = [
            ("password", password),
            ("email", email),
            ("_submit", "Přihlásit+se"),
            ("remember", "on"),
            ("_do", "login-loginForm-submit"),
        ];
        let url = format!("{}/", self.base_url);
        let body = self.client.post(&url).form(&form).send().await?.text().await?;

        if Html::parse_document(&body).select(&LOGIN_OK).next().is_some() {
            self.premium.store(true, Ordering::Relaxed);
            tracing::info!("Logged in to {} as {}", self.base_url, email);
            Ok(())
        } else {
            self.premium.store(false, Ordering::Relaxed);
            Err(Error::LoginFailed)
        }
    }

    /// Log in when credentials are configured and no session exists yet.
    ///
    /// Returns whether a premium session is active. Login failures are
    /// logged, not returned.
    pub async fn ensure_premium(&self, config: &SiteConfig) -> bool {
        if self.is_premium() {
            return true;
        }
        let Some((email, password)) = config.credentials() else {
            return false;
        };
        match self.login(email, password).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Premium login failed: {}", e);
                false
            }
        }
    }

    /// GET a site page as text. Non-success statuses are errors.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::SiteStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }

    /// GET any URL, for streaming downloads.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(url).send().await?.error_for_status()?)
    }

    /// Resolve a video page to its stream and subtitle URLs.
    ///
    /// With a premium session the download redirect replaces the stream URL.
    pub async fn resolve(&self, link: &str) -> Result<ResolvedVideo> {
        let page_url = absolute_url(&self.base_url, link);
        tracing::debug!("Resolving {}", page_url);

        let html = self.fetch_page(&page_url).await?;
        let (stream_url, subtitle_url) = parse_video_page(&html);
        let mut stream_url = stream_url.ok_or_else(|| Error::VideoLinkNotFound(page_url.clone()))?;

        if self.is_premium() {
            match self.premium_link(&page_url).await {
                Ok(Some(url)) => stream_url = url,
                Ok(None) => tracing::debug!("No premium redirect for {}", page_url),
                Err(e) => tracing::warn!("Premium link failed for {}: {}", page_url, e),
            }
        }

        Ok(ResolvedVideo {
            stream_url,
            subtitle_url,
        })
    }

    /// Premium download URL: the `Location` of `<page>?do=download`.
    pub async fn premium_link(&self, page_url: &str) -> Result<Option<String>> {
        let url = format!("{}?do=download", page_url);
        let resp = self.no_redirect.get(&url).send().await?;

        if !resp.status().is_redirection() {
            return Ok(None);
        }
        Ok(resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string()))
    }
}

/// Extract the stream URL and first subtitle URL from a video page.
pub fn parse_video_page(html: &str) -> (Option<String>, Option<String>) {
    let document = Html::parse_document(html);
    let scripts: Vec<String> = document
        .select(&SCRIPT)
        .map(|s| s.text().collect::<String>())
        .collect();

    let stream_url = scripts.iter().find_map(|script| {
        let sources = SOURCES_RE.captures(script)?;
        let caps = FILE_RE.captures(sources.get(1)?.as_str())?;
        caps.get(1)
            .or(caps.get(2))
            .map(|m| m.as_str().to_string())
            .filter(|u| !u.is_empty())
    });

    let subtitle_url = scripts.iter().find_map(|script| {
        let tracks = TRACKS_RE.captures(script)?;
        TRACK_SRC_RE
            .captures(tracks.get(1)?.as_str())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|u| !u.is_empty())
    });

    (stream_url, subtitle_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO_PAGE: &str = r#"
        <html><head>
        <script>var x = 1;</script>
        <script>
            var sources = [{
                file: "https://cdn.example/video.mp4?token=1",
                label: "HD"
            }];
            var tracks = [{"src": "https://cdn.example/subs.vtt", "srclang": "cs"}];
        </script>
        </head><body></body></html>
    "#;

    #[test]
    fn test_parse_video_page() {
        let (stream, subs) = parse_video_page(VIDEO_PAGE);
        assert_eq!(stream.as_deref(), Some("https://cdn.example/video.mp4?token=1"));
        assert_eq!(subs.as_deref(), Some("https://cdn.example/subs.vtt"));
    }

    #[test]
    fn test_parse_video_page_src_variant() {
        let html = r#"<script>var sources = [{src: "https://cdn.example/a.mkv", type: "video/mkv"}];</script>"#;
        let (stream, subs) = parse_video_page(html);
        assert_eq!(stream.as_deref(), Some("https://cdn.example/a.mkv"));
        assert_eq!(subs, None);
    }

    #[test]
    fn test_parse_video_page_missing() {
        assert_eq!(parse_video_page("<html></html>"), (None, None));
    }

    #[test]
    fn test_search_url() {
        let client = PrehrajtoClient::new(&SiteConfig::default()).unwrap();
        assert_eq!(
            client.search_url("Pelíšky 1999", 2),
            "https://prehraj.to/hledej/Pel%C3%AD%C5%A1ky%201999?vp-page=2"
        );
        assert!(!client.is_premium());
    }
}
