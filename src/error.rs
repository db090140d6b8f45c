use crate::ResponseBody;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorsError {
    /// Non-success status outside the retryable set. Never retried.
    #[error("http error {status} {status_text}")]
    Http {
        status: u16,
        /// Canonical reason phrase for `status`, empty when unknown.
        status_text: String,
        /// Parsed body (JSON when declared as such, raw text otherwise).
        body: ResponseBody,
    },
    /// Retryable status persisted through the final attempt.
    #[error("retries exhausted, last status {status}")]
    RetryExhausted {
        status: u16,
        /// `retry-after` seconds sent with the final response, if any.
        retry_after: Option<u64>,
    },
    /// No response within the configured window on the final attempt.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Header name or value could not be encoded.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// Response body could not be decoded into the requested shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ConnectorsError {
    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::RetryExhausted { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
