//! Error types for tracker operations.

use thiserror::Error;

/// Errors that can occur while talking to the issue tracker.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// A required credential or repository identifier is missing.
    #[error("{0}")]
    NotConfigured(String),

    /// The tracker rejected the credentials (HTTP 401).
    #[error("bad credentials: {0}")]
    Unauthorized(String),

    /// The credentials lack permission for the operation (HTTP 403).
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Repository, issue or user does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The tracker refused the request payload (HTTP 422).
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// Any other non-success status.
    #[error("tracker API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Coarse category of a tracker failure, used when rendering replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Unauthorized,
    Forbidden,
    NotFound,
    Unprocessable,
    Other,
}

impl TrackerError {
    /// Build an error from an HTTP status code and the tracker's message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => TrackerError::Unauthorized(message),
            403 => TrackerError::Forbidden(message),
            404 => TrackerError::NotFound(message),
            422 => TrackerError::Unprocessable(message),
            _ => TrackerError::Api { status, message },
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackerError::NotConfigured(_) => ErrorCategory::Configuration,
            TrackerError::Unauthorized(_) => ErrorCategory::Unauthorized,
            TrackerError::Forbidden(_) => ErrorCategory::Forbidden,
            TrackerError::NotFound(_) => ErrorCategory::NotFound,
            TrackerError::Unprocessable(_) => ErrorCategory::Unprocessable,
            TrackerError::Api { .. } | TrackerError::Http(_) | TrackerError::Parse(_) => {
                ErrorCategory::Other
            }
        }
    }

    /// HTTP status associated with the error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            TrackerError::Unauthorized(_) => Some(401),
            TrackerError::Forbidden(_) => Some(403),
            TrackerError::NotFound(_) => Some(404),
            TrackerError::Unprocessable(_) => Some(422),
            TrackerError::Api { status, .. } => Some(*status),
            TrackerError::NotConfigured(_) | TrackerError::Http(_) | TrackerError::Parse(_) => None,
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(e: reqwest::Error) -> Self {
        TrackerError::Http(e.to_string())
    }
}

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_categories() {
        assert_eq!(
            TrackerError::from_status(401, "x").category(),
            ErrorCategory::Unauthorized
        );
        assert_eq!(
            TrackerError::from_status(403, "x").category(),
            ErrorCategory::Forbidden
        );
        assert_eq!(
            TrackerError::from_status(404, "x").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            TrackerError::from_status(422, "x").category(),
            ErrorCategory::Unprocessable
        );
        assert_eq!(
            TrackerError::from_status(500, "boom"),
            TrackerError::Api {
                status: 500,
                message: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_status_round_trips_for_api_errors() {
        assert_eq!(TrackerError::from_status(409, "conflict").status(), Some(409));
        assert_eq!(TrackerError::NotConfigured("x".into()).status(), None);
    }
}
