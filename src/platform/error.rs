use thiserror::Error;

/// Failures surfaced by platform adapters
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Invalid project id: {0}")]
    InvalidProjectId(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl PlatformError {
    /// Whether the whole per-project generation step should be retried
    ///
    /// Connection failures and upstream 5xx responses are transient; bad
    /// ids, missing projects, and malformed payloads are not.
    pub fn is_transient(&self) -> bool {
        match self {
            PlatformError::Network(_) => true,
            PlatformError::Status { status, .. } => status.is_server_error(),
            PlatformError::NotFound(_)
            | PlatformError::InvalidProjectId(_)
            | PlatformError::InvalidResponse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = PlatformError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            url: "https://example.invalid/files".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_and_bad_input_are_fatal() {
        let status = PlatformError::Status {
            status: reqwest::StatusCode::FORBIDDEN,
            url: "https://example.invalid/files".to_string(),
        };
        assert!(!status.is_transient());
        assert!(!PlatformError::NotFound("256717".to_string()).is_transient());
        assert!(!PlatformError::InvalidProjectId("not-a-number".to_string()).is_transient());
        assert!(!PlatformError::InvalidResponse("truncated json".to_string()).is_transient());
    }
}
