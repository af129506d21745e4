use thiserror::Error;

/// Errors that can be returned by [`super::BackendClient`] calls.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never got an HTTP answer (connection refused, DNS, TLS, ...).
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend returned status {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Status { status: u16, message: Option<String> },

    /// The backend answered 2xx but reported an error in the body.
    #[error("backend reported an error: {message}")]
    Reported { message: String },

    /// The response body could not be decoded.
    #[error("invalid backend response: {0}")]
    Decode(reqwest::Error),

    /// The response decoded but lacks a required field.
    #[error("malformed backend response: {0}")]
    Malformed(String),

    /// The configured backend URL is not a valid base URL.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl BackendError {
    /// Message the backend itself supplied, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            Self::Reported { message } => Some(message),
            _ => None,
        }
    }
}
