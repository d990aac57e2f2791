use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Snapshot of cache occupancy from `GET /cache/status`. Replaced wholesale
/// on every successful poll.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CacheStatus {
    pub files: u64,
    pub total_size: u64,
    pub status: String,
}

impl CacheStatus {
    pub fn enabled(&self) -> bool {
        self.status == "enabled"
    }
}

/// Severity buckets the admin view renders. Anything the server emits that
/// is not error/warn/info (debug included) lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Other,
}

impl From<String> for LogLevel {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "info" => LogLevel::Info,
            _ => LogLevel::Other,
        }
    }
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Other => "DEBUG",
        }
    }
}

/// One server log line. `attrs` keeps the server's key order.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    pub time: DateTime<Utc>,
    pub level: LogLevel,
    pub msg: String,
    #[serde(default)]
    pub attrs: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Envelope of `GET /logs`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

/// JSON body of a 2xx `/download` response that carried no file.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// JSON body the backend sends with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_status_enabled() {
        let status: CacheStatus =
            serde_json::from_str(r#"{"files": 3, "total_size": 1048576, "status": "enabled"}"#)
                .unwrap();
        assert!(status.enabled());
        assert_eq!(status.files, 3);
    }

    #[test]
    fn test_cache_status_disabled() {
        let status: CacheStatus =
            serde_json::from_str(r#"{"files": 0, "total_size": 0, "status": "disabled"}"#).unwrap();
        assert!(!status.enabled());
    }

    #[test]
    fn test_log_level_classification() {
        assert_eq!(LogLevel::from("ERROR".to_string()), LogLevel::Error);
        assert_eq!(LogLevel::from("error".to_string()), LogLevel::Error);
        assert_eq!(LogLevel::from("WARN".to_string()), LogLevel::Warn);
        assert_eq!(LogLevel::from("INFO".to_string()), LogLevel::Info);
        assert_eq!(LogLevel::from("DEBUG".to_string()), LogLevel::Other);
        assert_eq!(LogLevel::from("trace".to_string()), LogLevel::Other);
    }

    #[test]
    fn test_log_entry_with_attrs() {
        let entry: LogEntry = serde_json::from_str(
            r#"{
                "time": "2025-01-15T10:30:00Z",
                "level": "INFO",
                "msg": "Starting video download",
                "attrs": {"url": "https://youtu.be/x", "quality": "720p"}
            }"#,
        )
        .unwrap();
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.msg, "Starting video download");
        let attrs = entry.attrs.unwrap();
        // preserve_order keeps the server's key order
        let keys: Vec<&String> = attrs.keys().collect();
        assert_eq!(keys, vec!["url", "quality"]);
    }

    #[test]
    fn test_logs_response_defaults_to_empty() {
        let response: LogsResponse = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(response.logs.is_empty());
    }
}
