//! Retry loop for the transport, as a `reqwest_middleware` middleware.
//!
//! [`RetryPolicy`] holds the pure decisions (retry or not, how long to wait),
//! [`RetryState`] the per-call bookkeeping, and [`RetryMiddleware`] drives both
//! around the next middleware in the chain.

use std::time::Duration;

use log::warn;
use rand::Rng;
use reqwest::{Method, Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};
use reqwest_retry::{Retryable, default_on_request_failure};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_WAIT: Duration = Duration::from_millis(500);

const HTTP_COMMUNICATION_FAILED: &str = "HTTP_COMMUNICATION_FAILED";

/// Why an attempt did not produce a usable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The service answered 503.
    ServiceUnavailable,
    /// No response within the request timeout, after the connection was made.
    Timeout,
    /// Connect failure, reset or other transient network error.
    Connection,
    /// Anything retrying cannot fix.
    Fatal,
}

impl Failure {
    /// Classifies the outcome of one attempt, `None` meaning a usable response.
    pub fn classify(result: &reqwest_middleware::Result<Response>) -> Option<Failure> {
        match result {
            Ok(response) if response.status() == StatusCode::SERVICE_UNAVAILABLE => Some(Failure::ServiceUnavailable),
            Ok(_) => None,
            Err(error) => Some(Failure::from_error(error)),
        }
    }

    fn from_error(error: &reqwest_middleware::Error) -> Failure {
        if let reqwest_middleware::Error::Reqwest(inner) = error {
            if inner.is_timeout() && !inner.is_connect() {
                return Failure::Timeout;
            }
            // connection dropped while the response body was streaming
            if inner.is_body() {
                return Failure::Connection;
            }
        }
        match default_on_request_failure(error) {
            Some(Retryable::Transient) => Failure::Connection,
            _ => Failure::Fatal,
        }
    }
}

/// Reads the whole body so failures while streaming it count against the attempt.
async fn buffer(response: Response) -> reqwest_middleware::Result<Response> {
    let status = response.status();
    let version = response.version();
    let headers = response.headers().clone();
    let body = response.bytes().await?;

    let mut buffered = ::http::Response::new(body);
    *buffered.status_mut() = status;
    *buffered.version_mut() = version;
    *buffered.headers_mut() = headers;
    Ok(Response::from(buffered))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_wait: Duration,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_WAIT)
    }
}

impl RetryPolicy {
    /// `max_attempts` counts the first attempt, so 1 disables retrying.
    pub fn new(max_attempts: u32, base_wait: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_wait,
            jitter: false,
        }
    }

    /// Spreads each wait by up to 10% either way.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn should_retry(&self, attempts: u32, failure: Failure, method: &Method) -> bool {
        if attempts >= self.max_attempts {
            return false;
        }
        match failure {
            Failure::ServiceUnavailable | Failure::Connection => true,
            // POST is not idempotent, a timed out POST may already have been applied
            Failure::Timeout => *method != Method::POST,
            Failure::Fatal => false,
        }
    }

    /// `base * 2^(attempts-1)`: 500ms, 1s, 2s, ... with the default base.
    pub fn wait_time(&self, attempts: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempts.saturating_sub(1));
        self.base_wait.saturating_mul(factor)
    }

    fn delay(&self, attempts: u32) -> Duration {
        let wait = self.wait_time(attempts);
        if !self.jitter {
            return wait;
        }
        let spread = wait / 10;
        let offset = rand::thread_rng().gen_range(Duration::ZERO..=spread * 2);
        wait - spread + offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    Attempting,
    Retrying(Duration),
    Succeeded,
    Failed,
}

/// Attempt bookkeeping for one logical call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    phase: RetryPhase,
    attempts: u32,
    waited: Duration,
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryState {
    pub fn new() -> Self {
        Self {
            phase: RetryPhase::Attempting,
            attempts: 0,
            waited: Duration::ZERO,
        }
    }

    pub fn phase(&self) -> RetryPhase {
        self.phase
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Total time spent waiting between attempts.
    pub fn waited(&self) -> Duration {
        self.waited
    }

    /// Records the outcome of the attempt just made and moves to the next phase.
    pub fn advance(&mut self, policy: &RetryPolicy, method: &Method, failure: Option<Failure>) -> RetryPhase {
        self.attempts += 1;
        self.phase = match failure {
            None => RetryPhase::Succeeded,
            Some(failure) if policy.should_retry(self.attempts, failure, method) => {
                let wait = policy.delay(self.attempts);
                self.waited += wait;
                RetryPhase::Retrying(wait)
            },
            // a 503 that is out of retries is still a response for the caller to classify
            Some(Failure::ServiceUnavailable) => RetryPhase::Succeeded,
            Some(_) => RetryPhase::Failed,
        };
        self.phase
    }
}

/// Retries sends according to a [`RetryPolicy`].
///
/// Registered on the client the same way `reqwest_retry::RetryTransientMiddleware`
/// is, but decides on the request method as well as the failure. Responses are
/// returned with their body already read.
pub struct RetryMiddleware {
    policy: RetryPolicy,
}

impl RetryMiddleware {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait::async_trait]
impl Middleware for RetryMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut ::http::Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        // streaming bodies cannot be replayed, send those once
        let Some(mut attempt) = req.try_clone() else {
            return next.run(req, extensions).await;
        };
        let method = req.method().clone();
        let mut state = RetryState::new();

        loop {
            let result = match next.clone().run(attempt, extensions).await {
                Ok(response) => buffer(response).await,
                Err(e) => Err(e),
            };
            let failure = Failure::classify(&result);
            let RetryPhase::Retrying(wait) = state.advance(&self.policy, &method, failure) else {
                return result;
            };
            let Some(retry) = req.try_clone() else {
                return result;
            };

            match &result {
                Err(e) => warn!(
                    error_code = HTTP_COMMUNICATION_FAILED,
                    attempts = state.attempts(),
                    wait_ms = wait.as_millis() as u64,
                    error:% = e;
                    "http communication failed, retry soon"
                ),
                Ok(_) => warn!(
                    error_code = HTTP_COMMUNICATION_FAILED,
                    attempts = state.attempts(),
                    wait_ms = wait.as_millis() as u64;
                    "service unavailable, retry soon"
                ),
            }
            drop(result);

            tokio::time::sleep(wait).await;
            attempt = retry;
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn response(status: u16) -> reqwest_middleware::Result<Response> {
        let response = ::http::Response::builder().status(status).body("").unwrap();
        Ok(Response::from(response))
    }

    #[test]
    fn test_classify_responses() {
        assert_eq!(Failure::classify(&response(200)), None);
        assert_eq!(Failure::classify(&response(500)), None);
        assert_eq!(Failure::classify(&response(503)), Some(Failure::ServiceUnavailable));
    }

    #[test]
    fn test_classify_fatal_errors() {
        let middleware = reqwest_middleware::Error::Middleware(anyhow::anyhow!("rejected"));
        assert_eq!(Failure::classify(&Err(middleware)), Some(Failure::Fatal));

        let builder = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert_eq!(Failure::classify(&Err(builder.into())), Some(Failure::Fatal));
    }

    #[tokio::test]
    async fn test_classify_connect_failure() {
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();

        let error = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{}/", port))
            .send()
            .await
            .unwrap_err();

        assert_eq!(Failure::classify(&Err(error.into())), Some(Failure::Connection));
    }

    #[tokio::test]
    async fn test_classify_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let error = reqwest::Client::new()
            .get(mock_server.uri())
            .timeout(Duration::from_millis(50))
            .send()
            .await
            .unwrap_err();

        assert_eq!(Failure::classify(&Err(error.into())), Some(Failure::Timeout));
    }

    #[test]
    fn test_wait_time() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.wait_time(1), Duration::from_millis(500));
        assert_eq!(policy.wait_time(2), Duration::from_millis(1000));
        assert_eq!(policy.wait_time(3), Duration::from_millis(2000));
        assert_eq!(policy.wait_time(4), Duration::from_millis(4000));
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::default();

        assert!(policy.should_retry(1, Failure::Timeout, &Method::GET));
        assert!(!policy.should_retry(1, Failure::Timeout, &Method::POST));
        assert!(policy.should_retry(1, Failure::Timeout, &Method::PUT));
        assert!(policy.should_retry(2, Failure::Connection, &Method::POST));
        assert!(policy.should_retry(1, Failure::ServiceUnavailable, &Method::POST));
        assert!(!policy.should_retry(1, Failure::Fatal, &Method::GET));
        assert!(!policy.should_retry(3, Failure::Connection, &Method::GET));
    }

    #[test]
    fn test_get_timeout_walks_backoff_until_budget_is_spent() {
        let policy = RetryPolicy::new(4, DEFAULT_BASE_WAIT);
        let mut state = RetryState::new();

        let phases: Vec<_> = (0..4)
            .map(|_| state.advance(&policy, &Method::GET, Some(Failure::Timeout)))
            .collect();

        assert_eq!(
            phases,
            [
                RetryPhase::Retrying(Duration::from_millis(500)),
                RetryPhase::Retrying(Duration::from_millis(1000)),
                RetryPhase::Retrying(Duration::from_millis(2000)),
                RetryPhase::Failed,
            ]
        );
        assert_eq!(state.attempts(), 4);
        assert_eq!(state.waited(), Duration::from_millis(3500));
    }

    #[test]
    fn test_post_timeout_fails_immediately() {
        let mut state = RetryState::new();

        let phase = state.advance(&RetryPolicy::default(), &Method::POST, Some(Failure::Timeout));

        assert_eq!(phase, RetryPhase::Failed);
        assert_eq!(state.attempts(), 1);
        assert_eq!(state.waited(), Duration::ZERO);
    }

    #[test]
    fn test_exhausted_service_unavailable_is_returned_as_response() {
        let policy = RetryPolicy::new(2, DEFAULT_BASE_WAIT);
        let mut state = RetryState::new();

        assert!(matches!(
            state.advance(&policy, &Method::GET, Some(Failure::ServiceUnavailable)),
            RetryPhase::Retrying(_)
        ));
        assert_eq!(
            state.advance(&policy, &Method::GET, Some(Failure::ServiceUnavailable)),
            RetryPhase::Succeeded
        );
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let policy = RetryPolicy::default().with_jitter(true);

        for _ in 0..20 {
            let wait = policy.delay(2);
            assert!(wait >= Duration::from_millis(900) && wait <= Duration::from_millis(1100));
        }
    }
}
