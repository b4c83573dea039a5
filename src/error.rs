//! Error types for the Parallel SDK.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for Parallel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Parallel SDK.
#[derive(Error, Debug)]
pub enum Error {
    /// The API answered with a non-2xx status.
    ///
    /// The body is kept verbatim; it is not guaranteed to be JSON.
    #[error("API error: {status} — {body}")]
    Api {
        /// HTTP status code
        status: StatusCode,
        /// Raw response body text
        body: String,
    },

    /// Network or HTTP error before a response was received.
    #[error("send request: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// A response arrived but its body could not be read.
    #[error("read response body ({status}): {source}")]
    Body {
        /// HTTP status code
        status: StatusCode,
        /// Underlying read failure
        #[source]
        source: reqwest::Error,
    },

    /// The request body could not be serialized.
    #[error("marshal request: {0}")]
    Encode(#[source] serde_json::Error),

    /// A 2xx response body did not match the expected shape.
    #[error("decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Polling was cancelled by the caller.
    #[error("polling cancelled")]
    Cancelled,

    /// Polling ran past the caller's deadline.
    #[error("polling deadline exceeded")]
    DeadlineExceeded,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } | Error::Body { status, .. } => Some(*status),
            Error::Http(e) => e.status(),
            _ => None,
        }
    }

    /// True for network failures, including a body cut off mid-read.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Timeout | Error::Body { .. })
    }

    /// True when the caller's cancellation signal ended the call.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }

    /// Create an API error from a non-success response.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = match response.text().await {
            Ok(text) => text,
            Err(source) => return Error::Body { status, source },
        };
        Error::Api { status, body }
    }

    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else {
            Error::Http(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: StatusCode::UNAUTHORIZED,
            body: "invalid api key".into(),
        };
        assert_eq!(err.to_string(), "API error: 401 Unauthorized — invalid api key");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_api_error_keeps_json_body_verbatim() {
        let err = Error::Api {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: r#"{"error":{"message":"bad objective"}}"#.into(),
        };
        assert_eq!(
            err.to_string(),
            r#"API error: 422 Unprocessable Entity — {"error":{"message":"bad objective"}}"#
        );
    }

    #[test]
    fn test_error_kinds() {
        assert!(Error::Timeout.is_transport());
        assert!(Error::Cancelled.is_cancellation());
        assert!(Error::DeadlineExceeded.is_cancellation());
        assert!(!Error::Config("x".into()).is_cancellation());

        let decode = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = Error::Decode(decode);
        assert!(err.to_string().starts_with("decode response:"));
        assert!(err.status().is_none());
    }
}
