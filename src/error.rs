use thiserror::Error;

/// Errors produced by the extraction library
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to parse DOM: {0}")]
    DomParseFailed(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid parameters for action '{action}': {reason}")]
    InvalidParams { action: String, reason: String },

    #[error("Snapshot store error: {0}")]
    StoreFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractorError::UnknownAction("frobnicate".to_string());
        assert_eq!(err.to_string(), "Unknown action: frobnicate");

        let err = ExtractorError::InvalidParams {
            action: "force-click".to_string(),
            reason: "missing field `selector`".to_string(),
        };
        assert!(err.to_string().contains("force-click"));
        assert!(err.to_string().contains("selector"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ExtractorError = io.into();
        assert!(err.to_string().contains("gone"));
    }
}
