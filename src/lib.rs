//! `connectors-http` is an async HTTP client for the Connectors gateway.
//!
//! Every call goes through [`HttpClient::request`], which retries transient
//! failures with bounded, jittered exponential backoff:
//! - [`HttpClient::get`] / [`HttpClient::delete`]
//! - [`HttpClient::post`] / [`HttpClient::put`] / [`HttpClient::patch`]

mod attempt;
mod backoff;
mod client;
mod error;
mod options;
mod types;

pub use attempt::{is_retryable_status, RETRYABLE_STATUSES};
pub use client::{HttpClient, CLIENT_ID};
pub use error::ConnectorsError;
pub use options::{ClientOptions, RequestOptions};
pub use types::{Method, Response, ResponseBody};

pub type Result<T> = std::result::Result<T, ConnectorsError>;
