//! Error types for the Google Drive client

use std::fmt;

#[derive(Debug)]
pub enum DriveError {
    /// Malformed input, e.g. a string that cannot be a Drive file id
    Validation(String),
    /// The referenced file does not exist (or is not visible to the account)
    NotFound(String),
    /// Missing or rejected OAuth credentials
    Auth(String),
    /// Drive answered with an unexpected status
    Upstream { status: u16, message: String },
    Http(Box<reqwest::Error>),
    /// The credential store failed to read or write
    Store(String),
}

impl fmt::Display for DriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DriveError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DriveError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            DriveError::Upstream { status, message } => {
                write!(f, "Drive returned status {}: {}", status, message)
            }
            DriveError::Http(err) => write!(f, "HTTP error: {}", err),
            DriveError::Store(msg) => write!(f, "Credential store error: {}", msg),
        }
    }
}

impl std::error::Error for DriveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriveError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DriveError {
    fn from(err: reqwest::Error) -> Self {
        DriveError::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, DriveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = DriveError::Validation("file id must be 25-128 characters".to_string());
        assert_eq!(
            format!("{}", err),
            "Validation error: file id must be 25-128 characters"
        );
    }

    #[test]
    fn test_upstream_error_display() {
        let err = DriveError::Upstream {
            status: 503,
            message: "backend error".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Drive returned status 503: backend error"
        );
    }

    #[test]
    fn test_error_is_debug() {
        let err = DriveError::Auth("invalid_grant".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Auth"));
    }
}
