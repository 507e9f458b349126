use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::model::Records;
use super::RecordingService;
use crate::config::CleanerConfig;
use crate::error::{CleanerError, CleanerResult};

/// HTTP client for a single EPGStation server.
///
/// One `reqwest::Client` is built up front and shared by every request.
#[derive(Debug, Clone)]
pub struct EpgStationClient {
    base_url: String,
    http: Client,
}

impl EpgStationClient {
    /// Create a client with certificate verification disabled or enabled as requested.
    pub fn new(
        base_url: impl Into<String>,
        accept_invalid_certs: bool,
        timeout: Option<Duration>,
    ) -> CleanerResult<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(accept_invalid_certs);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(CleanerError::ClientBuild)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &CleanerConfig) -> CleanerResult<Self> {
        Self::new(
            config.base_url.clone(),
            config.accept_invalid_certs,
            config.request_timeout,
        )
    }

    fn recorded_url(&self) -> String {
        format!("{}/api/recorded?isHalfWidth=true&limit=0", self.base_url)
    }

    fn video_url(&self, video_file_id: i64) -> String {
        format!("{}/api/videos/{}", self.base_url, video_file_id)
    }
}

#[async_trait]
impl RecordingService for EpgStationClient {
    async fn list_recordings(&self) -> CleanerResult<Records> {
        let url = self.recorded_url();
        tracing::debug!(url = %url, "Fetching recorded programs");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| CleanerError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CleanerError::UnexpectedStatus { status, url, body });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| CleanerError::Request {
                url: url.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| CleanerError::Decode { url, source })
    }

    async fn delete_video_file(&self, video_file_id: i64) -> CleanerResult<()> {
        let url = self.video_url(video_file_id);

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|source| CleanerError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(CleanerError::UnexpectedStatus { status, url, body });
        }

        Ok(())
    }
}
