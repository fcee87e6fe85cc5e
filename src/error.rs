use std::result::Result as StdResult;
use thiserror::Error;
use reqwest;
use serde_json;
use std::io;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Token not found: {0}")]
    NotFound(String),
    #[error("No pairs found: {0}")]
    NoPairsFound(String),
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    /// True for failures caused by the remote side rather than the input.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::UpstreamFetch(_) | Error::RateLimitExceeded(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Error::UpstreamFetch(format!("request timed out: {}", err));
        }
        Error::UpstreamFetch(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::UpstreamFetch(format!("malformed body: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

pub type Result<T> = StdResult<T, Error>;
