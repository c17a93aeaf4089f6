//! Errors on the outbound document path.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Reading the local document or writing the stored copy failed.
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// The notification endpoint could not be reached or said no.
    #[error("Notification request failed: {0}")]
    Http(String),

    /// An outbound step ran past its deadline. It is not retried.
    #[error("{step} timed out after {}s", .after.as_secs())]
    Timeout { step: &'static str, after: Duration },

    /// A setting the step needs is missing.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// The input cannot be used as given (no digits in a phone number,
    /// a file name that escapes the upload folder).
    #[error("Invalid {field}: '{value}'")]
    Invalid { field: &'static str, value: String },
}

impl DispatchError {
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        DispatchError::Invalid {
            field,
            value: value.into(),
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Http(err.to_string())
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = DispatchError::Timeout {
            step: "upload",
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "upload timed out after 30s");
    }
}
