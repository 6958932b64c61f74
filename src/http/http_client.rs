use std::{
    collections::BTreeMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use tokio::sync::RwLock;

use super::{
    error::HttpError,
    retry::RetryMiddleware,
    types::{RequestDescriptor, ResponseOutcome, body_log_param},
};
use crate::{
    config::ClientConfig,
    tracking::{ActionTracker, NoopTracker},
};

/// Sends one logical request and returns whatever the service answered.
///
/// Implementations retry internally; error statuses are returned as
/// responses, only failures to get any response are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<ResponseOutcome, HttpError>;
}

pub struct HttpClient {
    client: reqwest_middleware::ClientWithMiddleware,
    user_agent: String,
    slow_operation_threshold: Duration,
    tracker: Arc<dyn ActionTracker>,
    last_latency: RwLock<Option<(Duration, Instant)>>,
}

impl HttpClient {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::with_config(&ClientConfig::default(), Arc::new(NoopTracker))
    }

    pub fn with_config(config: &ClientConfig, tracker: Arc<dyn ActionTracker>) -> Result<Self, anyhow::Error> {
        let inner_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        let client = reqwest_middleware::ClientBuilder::new(inner_client)
            .with(RetryMiddleware::new(config.retry_policy()))
            .build();

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            slow_operation_threshold: config.slow_operation_threshold(),
            tracker,
            last_latency: RwLock::new(None),
        })
    }

    async fn execute(&self, request: &RequestDescriptor) -> Result<ResponseOutcome, HttpError> {
        let url = request.url()?;
        debug!(
            method = request.method.as_str(),
            uri = request.uri.as_str(),
            params:? = request.params;
            "[request]"
        );

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), &self.user_agent)?);
        for (name, value) in &request.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| HttpError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value(name, value)?);
        }
        debug!(headers:? = request.headers; "[request]");

        let mut builder = self.client.request(request.method.into(), url);
        if let Some(body) = &request.body {
            debug!(
                content_type = body.content_type,
                body = body_log_param(&body.bytes, Some(body.content_type)).as_str();
                "[request]"
            );
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(body.content_type));
            builder = builder.body(body.bytes.clone());
        }

        let response = builder.headers(headers).send().await?;

        let status = response.status().as_u16();
        debug!(status = status; "[response]");
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        debug!(headers:? = headers; "[response]");

        let body = response.bytes().await?.to_vec();
        let outcome = ResponseOutcome::new(status, headers, body);
        debug!(body = body_log_param(&outcome.body, outcome.content_type()).as_str(); "[response]");
        Ok(outcome)
    }

    async fn update_latency(&self, duration: Duration) {
        *self.last_latency.write().await = Some((duration, Instant::now()));
    }

    /// Elapsed time of the most recent call, all attempts included.
    pub async fn last_latency(&self) -> Option<Duration> {
        self.last_latency.read().await.map(|(d, _)| d)
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn send(&self, request: &RequestDescriptor) -> Result<ResponseOutcome, HttpError> {
        let start = Instant::now();
        let result = self.execute(request).await;
        let elapsed = start.elapsed();

        let elapsed_nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.tracker.track("http", elapsed_nanos);
        self.update_latency(elapsed).await;
        debug!(elapsed:? = elapsed; "execute");
        if elapsed > self.slow_operation_threshold {
            warn!(error_code = "SLOW_HTTP", elapsed:? = elapsed; "slow http operation");
        }
        result
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, HttpError> {
    HeaderValue::from_str(value).map_err(|_| HttpError::InvalidHeader(name.to_string()))
}
