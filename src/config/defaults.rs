use std::time::Duration;

use config::Config;
use serde::{Deserialize, Serialize};

use crate::{
    cli::{ApplyArgs, ConnectionArgs},
    http::RetryPolicy,
};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub service_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub max_attempts: u32,
    pub retry_base_wait_ms: u64,
    pub retry_jitter: bool,
    pub slow_operation_threshold_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8080".to_string(),
            user_agent: "ws-client".to_string(),
            timeout_ms: 60_000,
            connect_timeout_ms: 25_000,
            max_attempts: 3,
            retry_base_wait_ms: 500,
            retry_jitter: false,
            slow_operation_threshold_ms: 30_000,
        }
    }
}

impl ClientConfig {
    pub fn main_key_prefix() -> &'static str {
        "client"
    }

    /// Reads the `client` section, falling back to defaults when it is absent.
    pub fn from_config(cfg: &Config) -> Result<Self, config::ConfigError> {
        match cfg.get::<ClientConfig>(Self::main_key_prefix()) {
            Ok(client) => Ok(client),
            Err(config::ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn slow_operation_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_operation_threshold_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_base_wait_ms)).with_jitter(self.retry_jitter)
    }
}

impl ApplyArgs for ClientConfig {
    fn apply_connection(&mut self, args: &ConnectionArgs) {
        if let Some(service_url) = &args.service_url {
            self.service_url = service_url.clone();
        }
        if let Some(max_attempts) = args.max_attempts {
            self.max_attempts = max_attempts;
        }
    }
}
