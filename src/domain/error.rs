use thiserror::Error;

/// Application-level errors. `Display` strings double as the notification
/// text shown to the user, so they stay short and human-readable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("Please enter a video URL")]
    EmptyUrl,

    #[error("Only YouTube and Instagram links are supported")]
    UnsupportedUrl,

    #[error("Please select a quality")]
    MissingQuality,

    #[error("Network error. Please try again.")]
    Network,

    #[error("{0}")]
    Server(String),

    #[error("Unexpected response from server")]
    Decode,

    #[error("File error: {0}")]
    Io(String),
}

impl From<crate::api::ApiError> for AppError {
    fn from(err: crate::api::ApiError) -> Self {
        use crate::api::ApiError;
        match err {
            ApiError::Transport(_) => AppError::Network,
            ApiError::Server { message, .. } => AppError::Server(message),
            ApiError::Decode(_) => AppError::Decode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    #[test]
    fn test_server_error_text_is_verbatim() {
        let err: AppError = ApiError::Server {
            status: 500,
            message: "cookie file youtube.txt not found".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "cookie file youtube.txt not found");
    }

    #[test]
    fn test_transport_error_is_generic() {
        let err: AppError = ApiError::Transport("connection refused".to_string()).into();
        assert_eq!(err.to_string(), "Network error. Please try again.");
    }
}
