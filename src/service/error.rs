use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{bean::BeanError, contract::ContractError, http::HttpError, http::HttpStatus};

/// Severity the remote service declared for its error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warn,
    Error,
}

impl Severity {
    pub fn log_level(&self) -> log::Level {
        match self {
            Severity::Warn => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => f.write_str("WARN"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// The service answered, but with an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteServiceError {
    /// Error id assigned by the remote service, when it sent one.
    pub id: Option<String>,
    pub severity: Severity,
    pub error_code: String,
    pub message: String,
    pub status: HttpStatus,
}

/// Every failure of a web service call.
///
/// The three families callers usually tell apart are
/// [`Transport`](WebServiceError::Transport) (the service could not be reached),
/// [`Remote`](WebServiceError::Remote) (the service answered with an error) and
/// [`Contract`](WebServiceError::Contract) (the call itself is misconfigured).
#[derive(Debug, Error)]
pub enum WebServiceError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error(transparent)]
    Remote(#[from] RemoteServiceError),

    #[error(transparent)]
    Bean(#[from] BeanError),

    #[error("web service client interceptor failed: {0}")]
    Interceptor(#[source] anyhow::Error),
}

impl WebServiceError {
    pub fn remote(&self) -> Option<&RemoteServiceError> {
        match self {
            WebServiceError::Remote(e) => Some(e),
            _ => None,
        }
    }
}
