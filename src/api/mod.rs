pub mod client;
pub mod models;

pub use client::{ApiClient, ApiError, DownloadStarted, Result};
pub use models::{ApiConfig, CacheStatus, LogEntry, LogLevel};
