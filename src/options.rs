use crate::Method;

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Backoff for the first retry; doubled for every further attempt.
    pub retry_base_delay_ms: u64,
    /// Ceiling applied to the exponential part of the backoff.
    pub retry_max_delay_ms: u64,
    /// Exclusive upper bound of the uniform jitter added to every backoff.
    pub retry_jitter_ms: u64,
    /// Longest wait honored from a server `retry-after` header.
    pub max_retry_after_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 3,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 30_000,
            retry_jitter_ms: 1_000,
            max_retry_after_ms: 300_000,
        }
    }
}

/// Per-call overrides for [`crate::HttpClient::request`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    /// Merged over the client's default headers; later entries win.
    pub headers: Vec<(String, String)>,
    /// JSON body. Ignored for `GET`.
    pub body: Option<serde_json::Value>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<usize>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}
