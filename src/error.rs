use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while talking to EPGStation or running a sweep.
#[derive(Error, Debug)]
pub enum CleanerError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Transport-level failure (connection refused, TLS, timeout, ...).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a status we do not accept.
    #[error("status code is not 200 but {status} for {url}: {body}")]
    UnexpectedStatus {
        status: StatusCode,
        url: String,
        body: String,
    },

    /// The response body was not the JSON we expected.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CleanerError {
    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CleanerError::Config(_) => "config",
            CleanerError::ClientBuild(_) => "client_build",
            CleanerError::Request { .. } => "transport",
            CleanerError::UnexpectedStatus { .. } => "status",
            CleanerError::Decode { .. } => "decode",
        }
    }
}

/// Result type for cleaner operations.
pub type CleanerResult<T> = Result<T, CleanerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_message_carries_details() {
        let err = CleanerError::UnexpectedStatus {
            status: StatusCode::NOT_FOUND,
            url: "http://epg/api/videos/7".to_string(),
            body: "{\"code\":404}".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("/api/videos/7"));
        assert!(message.contains("{\"code\":404}"));
        assert_eq!(err.kind(), "status");
    }

    #[test]
    fn test_config_error_converts() {
        let err: CleanerError = ConfigError::InvalidLogLevel("LOUD".to_string()).into();
        assert_eq!(err.kind(), "config");
        assert!(err.to_string().contains("LOUD"));
    }
}
