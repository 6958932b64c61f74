//! Error types for the HTTP transport.
//!
//! This module defines the [`HttpError`] enum, which covers every way the
//! transport can fail to produce a response. A response with an error status
//! is not a transport failure: it is returned as a [`ResponseOutcome`] and
//! classified by the invoker.
//!
//! [`ResponseOutcome`]: super::ResponseOutcome

use thiserror::Error;

/// Errors that can occur while sending a request.
///
/// # Error Categories
///
/// - **Network errors**: [`RequestFailed`](HttpError::RequestFailed),
///   [`MiddlewareError`](HttpError::MiddlewareError)
/// - **Request errors**: [`UrlError`](HttpError::UrlError),
///   [`InvalidHeader`](HttpError::InvalidHeader)
///
/// # Example
///
/// ```rust,no_run
/// use ws_client::http::HttpError;
///
/// fn handle_error(err: HttpError) {
///     if err.is_timeout() {
///         eprintln!("Service did not answer in time: {}", err);
///     } else {
///         eprintln!("Could not reach service: {}", err);
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum HttpError {
    /// Reading the response failed after the request was sent.
    ///
    /// This typically indicates the connection dropped while the body
    /// was streaming, or the request timeout elapsed during the read.
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Sending failed in the middleware stack.
    ///
    /// The retry middleware surfaces the last attempt's failure here once
    /// the failure is fatal or the retry budget is exhausted:
    /// - Connection refused or reset
    /// - Connect or read timeout
    /// - DNS resolution failure
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),

    /// The request URI (with query params) is not a valid URL.
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// A request header name or value cannot be sent over HTTP.
    #[error("Invalid header, name={0}")]
    InvalidHeader(String),
}

impl HttpError {
    /// Whether the call failed because a timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        match self {
            HttpError::RequestFailed(e) => e.is_timeout(),
            HttpError::MiddlewareError(reqwest_middleware::Error::Reqwest(e)) => e.is_timeout(),
            _ => false,
        }
    }
}
