use std::fmt;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use tokio::time::{sleep, timeout};

use crate::{
    attempt::{classify_transport, read_response, AttemptOutcome, RetryReason},
    backoff, ClientOptions, ConnectorsError, Method, RequestOptions, Response, Result,
};

/// Value of the `x-client` header sent with every request.
pub const CLIENT_ID: &str = concat!("connectors-http/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
/// HTTP client for the Connectors gateway with bounded retries.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    default_headers: Vec<(String, String)>,
    options: ClientOptions,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .default_headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(header::AUTHORIZATION.as_str()) {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &headers)
            .field("options", &self.options)
            .finish()
    }
}

impl HttpClient {
    /// Creates a client rooted at `base_url`. Trailing slashes are stripped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            default_headers: vec![
                (
                    header::CONTENT_TYPE.as_str().to_owned(),
                    "application/json".to_owned(),
                ),
                ("x-client".to_owned(), CLIENT_ID.to_owned()),
            ],
            options: ClientOptions::default(),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `CONNECTORS_BASE_URL` — gateway root URL (required)
    /// - `CONNECTORS_API_KEY` — access token, sent as a bearer token (optional)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use connectors_http::HttpClient;
    ///
    /// let client = HttpClient::from_env().expect("missing CONNECTORS_BASE_URL");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> std::result::Result<Self, String> {
        let base_url = lookup("CONNECTORS_BASE_URL")
            .ok_or_else(|| "missing CONNECTORS_BASE_URL environment variable".to_owned())?;
        if base_url.trim().is_empty() {
            return Err("CONNECTORS_BASE_URL is set but empty".to_owned());
        }
        let client = Self::new(base_url.trim());
        match lookup("CONNECTORS_API_KEY") {
            Some(key) if !key.trim().is_empty() => Ok(client.with_bearer(key)),
            _ => Ok(client),
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Adds a default header, replacing any existing one with the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value.into()));
        self
    }

    /// Sets the `Authorization` header from a bearer token.
    ///
    /// If the token is missing the `Bearer ` prefix, it is added automatically.
    pub fn with_bearer(self, token: impl AsRef<str>) -> Self {
        let authorization = normalize_bearer_authorization(token.as_ref());
        self.with_header(header::AUTHORIZATION.as_str(), authorization)
    }

    /// Replaces the underlying `reqwest` client, e.g. to share a
    /// preconfigured connection pool.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Absolute URL for `path`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Response> {
        self.request(path, options.method(Method::Get)).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: impl Into<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(path, options.method(Method::Post).body(body))
            .await
    }

    pub async fn put(
        &self,
        path: &str,
        body: impl Into<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(path, options.method(Method::Put).body(body))
            .await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: impl Into<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(path, options.method(Method::Patch).body(body))
            .await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<Response> {
        self.request(path, options.method(Method::Delete)).await
    }

    /// Performs one logical request.
    ///
    /// Statuses 408, 429, 500, 502, 503 and 504, timeouts and transport
    /// failures are retried up to `max_retries` times with jittered
    /// exponential backoff, or after the server's `retry-after` delay when
    /// one is sent (capped at [`ClientOptions::max_retry_after_ms`]). Any
    /// other non-success status fails immediately with
    /// [`ConnectorsError::Http`].
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Response> {
        let url = self.url_for(path);
        let headers = self.merge_headers(&options.headers)?;
        let timeout_ms = options.timeout_ms.unwrap_or(self.options.timeout_ms);
        let max_retries = options.max_retries.unwrap_or(self.options.max_retries);
        let body = match options.method {
            Method::Get => None,
            _ => options.body.as_ref(),
        };

        let mut attempt = 0usize;
        loop {
            let mut builder = self
                .http
                .request(options.method.into(), url.as_str())
                .headers(headers.clone());
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let reason = match Self::send_with_deadline(builder, timeout_ms).await {
                AttemptOutcome::Success(response) => return Ok(response),
                AttemptOutcome::Terminal(err) => return Err(err),
                AttemptOutcome::Retryable(reason) => reason,
            };

            if attempt >= max_retries {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "{} {} failed after {} attempt(s): {}",
                    options.method,
                    url,
                    attempt + 1,
                    reason
                );
                return Err(reason.into_error(timeout_ms));
            }

            self.wait_before_retry(attempt, &reason).await;
            attempt += 1;
        }
    }

    /// Runs one attempt. Dropping the in-flight future at the deadline
    /// cancels the underlying connection.
    async fn send_with_deadline(
        builder: reqwest::RequestBuilder,
        timeout_ms: u64,
    ) -> AttemptOutcome {
        let exchange = async move {
            match builder.send().await {
                Ok(response) => read_response(response).await,
                Err(err) => classify_transport(err),
            }
        };

        match timeout(Duration::from_millis(timeout_ms), exchange).await {
            Ok(outcome) => outcome,
            Err(_) => AttemptOutcome::Retryable(RetryReason::Timeout),
        }
    }

    async fn wait_before_retry(&self, attempt: usize, reason: &RetryReason) {
        let delay = backoff::retry_delay(attempt, reason.retry_after(), &self.options);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "retrying after {} ms (attempt {}, {})",
            delay.as_millis(),
            attempt + 1,
            reason
        );

        sleep(delay).await;
    }

    fn merge_headers(&self, overrides: &[(String, String)]) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.default_headers.iter().chain(overrides) {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| ConnectorsError::InvalidHeader(format!("{name}: {err}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|err| ConnectorsError::InvalidHeader(format!("{name}: {err}")))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
