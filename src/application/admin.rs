use crate::{
    api::{ApiClient, CacheStatus, LogEntry},
    domain::AppError,
};

/// Result of one admin refresh cycle. The two fetches run concurrently and
/// settle independently; one failing never cancels the other.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub cache: Result<CacheStatus, AppError>,
    pub logs: Result<Vec<LogEntry>, AppError>,
}

#[derive(Clone)]
pub struct AdminRefresher {
    api_client: ApiClient,
}

impl AdminRefresher {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// Fetches cache status and logs in parallel and joins both.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (cache, logs) = futures::join!(
            self.api_client.cache_status(),
            self.api_client.fetch_logs()
        );

        RefreshOutcome {
            cache: cache.map_err(AppError::from),
            logs: logs.map_err(AppError::from),
        }
    }

    /// Issues the cache eviction DELETE. The caller re-polls status on
    /// success; logs are left alone.
    pub async fn clear_cache(&self) -> Result<(), AppError> {
        self.api_client.clear_cache().await.map_err(AppError::from)
    }

    pub async fn cache_status(&self) -> Result<CacheStatus, AppError> {
        self.api_client.cache_status().await.map_err(AppError::from)
    }
}
