//! HTTP transport for web service calls.
//!
//! This module executes the physical request behind every contract method call.
//! It owns the retry loop, request timeouts and per-call latency tracking, and
//! knows nothing about contracts or beans.
//!
//! # Architecture
//!
//! - [`HttpTransport`] - The seam the invoker calls through
//! - [`HttpClient`] - The `reqwest` implementation, built on a
//!   `reqwest_middleware` client carrying the [`RetryMiddleware`]
//! - [`RetryPolicy`] / [`RetryState`] - The pure retry decisions and the
//!   per-call state machine driven by the middleware
//! - [`HttpStatus`] - The closed table of statuses a response may carry
//!
//! # Retries
//!
//! A 503 response and transient network failures are retried with exponential
//! backoff (500ms, 1s, 2s, ... by default) until `max_attempts` is reached. A
//! read timeout on a `POST` is surfaced immediately, since the service may
//! already have applied it.
//!
//! # Example
//!
//! ```rust,no_run
//! use ws_client::http::{HttpClient, HttpMethod, HttpTransport, RequestDescriptor};
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let client = HttpClient::new()?;
//! let request = RequestDescriptor::new(HttpMethod::Get, "http://localhost:8080/health");
//!
//! let response = client.send(&request).await?;
//! println!("status={}", response.status);
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;
mod retry;
mod status;
mod types;

pub use error::HttpError;
pub use http_client::{HttpClient, HttpTransport};
pub use retry::{DEFAULT_BASE_WAIT, DEFAULT_MAX_ATTEMPTS, Failure, RetryMiddleware, RetryPhase, RetryPolicy, RetryState};
pub use status::HttpStatus;
pub use types::{HttpMethod, RequestDescriptor, ResponseOutcome};
