use futures::stream::BoxStream;
use futures::TryStreamExt;
use log::{info, warn};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

use super::models::{ApiConfig, CacheStatus, ErrorResponse, LogEntry, LogsResponse, MessageResponse};
use crate::domain::DownloadRequest;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("invalid response format: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// What a 2xx `/download` response turned out to be, branched on the
/// declared content type.
pub enum DownloadStarted {
    /// The server streamed the file back.
    Payload {
        /// Raw Content-Disposition header value, if any.
        disposition: Option<String>,
        total: Option<u64>,
        stream: BoxStream<'static, Result<bytes::Bytes>>,
    },
    /// The server performed an out-of-band action and answered with JSON.
    Message(String),
}

impl std::fmt::Debug for DownloadStarted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadStarted::Payload {
                disposition, total, ..
            } => f
                .debug_struct("Payload")
                .field("disposition", disposition)
                .field("total", total)
                .finish_non_exhaustive(),
            DownloadStarted::Message(msg) => f.debug_tuple("Message").field(msg).finish(),
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Issues the download POST and classifies the response.
    ///
    /// Non-2xx responses become `ApiError::Server` with the body's `error`
    /// field when it parses, a generic text otherwise. No timeout is set;
    /// the request runs until the transport settles.
    pub async fn start_download(&self, request: &DownloadRequest) -> Result<DownloadStarted> {
        info!(
            "requesting download: url={} quality={}",
            request.url,
            request.quality.wire_value()
        );

        let response = self
            .http
            .post(self.endpoint("/download"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::server_error(status, response, "Download failed").await);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.contains("application/octet-stream") || content_type.contains("video/mp4")
        {
            let disposition = response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let total = response.content_length();
            let stream = Box::pin(response.bytes_stream().map_err(ApiError::from));

            Ok(DownloadStarted::Payload {
                disposition,
                total,
                stream,
            })
        } else {
            // Out-of-band action; the body's message field is the outcome.
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<MessageResponse>(&body)
                .ok()
                .map(|r| r.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Download initiated successfully!".to_string());
            Ok(DownloadStarted::Message(message))
        }
    }

    pub async fn cache_status(&self) -> Result<CacheStatus> {
        let response = self.http.get(self.endpoint("/cache/status")).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::server_error(status, response, "Failed to fetch cache status").await);
        }

        response
            .json::<CacheStatus>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        let response = self.http.get(self.endpoint("/logs")).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::server_error(status, response, "Failed to fetch logs").await);
        }

        let body = response
            .json::<LogsResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.logs)
    }

    /// Pings the backend root. The body is ignored; only reachability and
    /// status matter.
    pub async fn health(&self) -> Result<()> {
        let response = self.http.get(self.endpoint("/")).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: "Service health check failed".to_string(),
            });
        }

        Ok(())
    }

    /// Evicts the backend cache. The success body is ignored.
    pub async fn clear_cache(&self) -> Result<()> {
        info!("requesting cache eviction");
        let response = self
            .http
            .delete(self.endpoint("/cache/delete"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("cache eviction rejected: status={}", status);
            return Err(Self::server_error(status, response, "Failed to clear cache").await);
        }

        Ok(())
    }

    /// Builds a server error from a non-2xx response, preferring the JSON
    /// body's `error` field. An unparseable body must not crash the caller.
    async fn server_error(status: StatusCode, response: Response, fallback: &str) -> ApiError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| fallback.to_string());
        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    }
}
