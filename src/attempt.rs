use std::fmt;

use reqwest::header::{HeaderMap, CONTENT_TYPE};

use crate::{
    backoff::parse_retry_after, types::header_map_to_btree, ConnectorsError, Response,
    ResponseBody,
};

/// Statuses treated as transient.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Result of a single transport attempt, inspected by the retry loop.
#[derive(Debug)]
pub(crate) enum AttemptOutcome {
    Success(Response),
    Retryable(RetryReason),
    Terminal(ConnectorsError),
}

#[derive(Debug)]
pub(crate) enum RetryReason {
    Status {
        status: u16,
        retry_after: Option<u64>,
    },
    Timeout,
    Transport(reqwest::Error),
}

impl RetryReason {
    pub(crate) fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Status { retry_after, .. } => *retry_after,
            Self::Timeout | Self::Transport(_) => None,
        }
    }

    /// Terminal error reported once the retry budget is spent.
    pub(crate) fn into_error(self, timeout_ms: u64) -> ConnectorsError {
        match self {
            Self::Status {
                status,
                retry_after,
            } => ConnectorsError::RetryExhausted {
                status,
                retry_after,
            },
            Self::Timeout => ConnectorsError::Timeout { timeout_ms },
            Self::Transport(err) => ConnectorsError::Transport(err),
        }
    }
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, .. } => write!(f, "status {status}"),
            Self::Timeout => f.write_str("timeout"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}

/// Classifies a completed response. The body is only read for
/// non-retryable statuses.
pub(crate) async fn read_response(response: reqwest::Response) -> AttemptOutcome {
    let status = response.status();
    if is_retryable_status(status.as_u16()) {
        return AttemptOutcome::Retryable(RetryReason::Status {
            status: status.as_u16(),
            retry_after: parse_retry_after(response.headers()),
        });
    }

    let json = declares_json(response.headers());
    let headers = header_map_to_btree(response.headers());
    let text = match response.text().await {
        Ok(text) => text,
        Err(err) => return classify_transport(err),
    };

    if status.is_success() {
        match parse_body(json, text) {
            Ok(body) => AttemptOutcome::Success(Response {
                status: status.as_u16(),
                headers,
                body,
            }),
            Err(err) => AttemptOutcome::Terminal(ConnectorsError::Decode(format!(
                "invalid JSON response body: {err}"
            ))),
        }
    } else {
        // A malformed error payload is still surfaced, as text.
        let body = if json {
            parse_json_or_text(text)
        } else {
            ResponseBody::Text(text)
        };
        AttemptOutcome::Terminal(ConnectorsError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            body,
        })
    }
}

/// Builder errors can never succeed on retry; everything else can.
pub(crate) fn classify_transport(err: reqwest::Error) -> AttemptOutcome {
    if err.is_builder() {
        AttemptOutcome::Terminal(ConnectorsError::Transport(err))
    } else if err.is_timeout() {
        AttemptOutcome::Retryable(RetryReason::Timeout)
    } else {
        AttemptOutcome::Retryable(RetryReason::Transport(err))
    }
}

fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
}

fn parse_body(json: bool, text: String) -> Result<ResponseBody, serde_json::Error> {
    if !json {
        return Ok(ResponseBody::Text(text));
    }
    if text.trim().is_empty() {
        return Ok(ResponseBody::Json(serde_json::Value::Null));
    }
    serde_json::from_str(&text).map(ResponseBody::Json)
}

fn parse_json_or_text(text: String) -> ResponseBody {
    match serde_json::from_str(&text) {
        Ok(value) => ResponseBody::Json(value),
        Err(_) => ResponseBody::Text(text),
    }
}
