//! Error types for playto.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for playto.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("TMDB API key not configured. Set TMDB_API_KEY or tmdb.api_key in config.toml")]
    TmdbApiKeyMissing,

    #[error("Trakt client id/secret not configured. Set TRAKT_CLIENT_ID and TRAKT_CLIENT_SECRET")]
    TraktCredentialsMissing,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Video site errors
    #[error("Login to video site failed")]
    LoginFailed,

    #[error("Video link not found on page: {0}")]
    VideoLinkNotFound(String),

    #[error("Video site returned HTTP {status} for {url}")]
    SiteStatus { status: u16, url: String },

    // TMDB errors
    #[error("TMDB request failed: {0}")]
    TmdbRequest(String),

    #[error("TMDB has no '{list}' listing for {media}")]
    TmdbListUnsupported { list: String, media: String },

    // CSFD errors
    #[error("CSFD request failed: {0}")]
    CsfdRequest(String),

    // Trakt errors
    #[error("Trakt device code expired before the user authorized it")]
    TraktAuthExpired,

    #[error("Trakt rejected the refresh token, run `playto trakt auth` again")]
    TraktTokenRejected,

    #[error("Trakt not authenticated, run `playto trakt auth` first")]
    TraktNotAuthenticated,

    #[error("Trakt request failed: {0}")]
    TraktRequest(String),

    // File system errors
    #[error("File already exists: {0}")]
    FileAlreadyExists(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // TOML errors
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error came from a timeout or connection failure.
    pub fn is_network(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}
