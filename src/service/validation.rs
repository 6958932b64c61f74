//! Classification of error responses into [`RemoteServiceError`]s.

use serde::Deserialize;
use serde_json::Value;

use super::error::{RemoteServiceError, Severity, WebServiceError};
use crate::http::{HttpStatus, ResponseOutcome};

pub const REMOTE_SERVICE_ERROR: &str = "REMOTE_SERVICE_ERROR";

/// Error payload written by services speaking the same error protocol.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub id: String,
    pub severity: Severity,
    #[serde(rename = "errorCode")]
    pub error_code: String,
    pub message: String,
}

/// Checks the status of a response, turning error statuses into remote errors.
///
/// A code outside the known status table is a [`ContractError`], never a
/// remote error.
///
/// [`ContractError`]: crate::contract::ContractError
pub fn validate_response(response: &ResponseOutcome) -> Result<HttpStatus, WebServiceError> {
    let status = HttpStatus::parse(response.status)?;
    if status.is_success() {
        return Ok(status);
    }
    Err(remote_error(status, &response.body).into())
}

fn remote_error(status: HttpStatus, body: &[u8]) -> RemoteServiceError {
    let failed = |message: String| RemoteServiceError {
        id: None,
        severity: Severity::Error,
        error_code: REMOTE_SERVICE_ERROR.to_string(),
        message,
        status,
    };

    if body.is_empty() {
        return failed(format!("failed to call remote service, statusCode={}", status.code()));
    }

    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        // not our error protocol at all, e.g. a proxy error page
        return failed(format!("internal communication failed, statusCode={}", status.code()));
    };

    match serde_json::from_value::<ErrorResponse>(value) {
        Ok(payload) => RemoteServiceError {
            id: Some(payload.id),
            severity: payload.severity,
            error_code: payload.error_code,
            message: payload.message,
            status,
        },
        Err(_) => failed(format!("failed to call remote service, statusCode={}", status.code())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::contract::ContractError;

    fn response(status: u16, body: &str) -> ResponseOutcome {
        ResponseOutcome::new(status, BTreeMap::new(), body.as_bytes().to_vec())
    }

    fn remote(status: u16, body: &str) -> RemoteServiceError {
        match validate_response(&response(status, body)) {
            Err(WebServiceError::Remote(e)) => e,
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_response() {
        assert_eq!(validate_response(&response(200, "")).unwrap(), HttpStatus::Ok);
        assert_eq!(validate_response(&response(304, "")).unwrap(), HttpStatus::NotModified);
    }

    #[test]
    fn test_validate_response_with_error_response() {
        let e = remote(
            404,
            r#"{"id":"x","severity":"WARN","errorCode":"NOT_FOUND","message":"not found"}"#,
        );

        assert_eq!(e.id.as_deref(), Some("x"));
        assert_eq!(e.severity, Severity::Warn);
        assert_eq!(e.error_code, "NOT_FOUND");
        assert_eq!(e.to_string(), "not found");
        assert_eq!(e.status, HttpStatus::NotFound);
    }

    #[test]
    fn test_validate_response_with_empty_body() {
        let e = remote(503, "");

        assert_eq!(e.severity, Severity::Error);
        assert_eq!(e.error_code, REMOTE_SERVICE_ERROR);
        assert_eq!(e.message, "failed to call remote service, statusCode=503");
        assert_eq!(e.status, HttpStatus::ServiceUnavailable);
    }

    #[test]
    fn test_validate_response_with_410() {
        let e = remote(410, "{}");

        assert_eq!(e.severity, Severity::Error);
        assert_eq!(e.error_code, REMOTE_SERVICE_ERROR);
        assert_eq!(e.message, "failed to call remote service, statusCode=410");
        assert_eq!(e.status, HttpStatus::Gone);
    }

    #[test]
    fn test_validate_response_with_unexpected_body() {
        let e = remote(503, "<html/>");

        assert_eq!(e.severity, Severity::Error);
        assert_eq!(e.error_code, REMOTE_SERVICE_ERROR);
        assert_eq!(e.message, "internal communication failed, statusCode=503");
    }

    #[test]
    fn test_validate_response_with_unknown_severity() {
        let e = remote(
            400,
            r#"{"id":"x","severity":"INFO","errorCode":"BAD","message":"bad"}"#,
        );

        assert_eq!(e.error_code, REMOTE_SERVICE_ERROR);
        assert_eq!(e.message, "failed to call remote service, statusCode=400");
    }

    #[test]
    fn test_validate_response_with_proxy_status() {
        let e = remote(414, "<html>URI Too Long</html>");

        assert_eq!(e.message, "internal communication failed, statusCode=414");
        assert_eq!(e.status, HttpStatus::UriTooLong);
        assert_eq!(remote(505, "").status, HttpStatus::HttpVersionNotSupported);
    }

    #[test]
    fn test_validate_response_with_unsupported_status() {
        let err = validate_response(&response(525, "")).unwrap_err();

        assert!(matches!(
            err,
            WebServiceError::Contract(ContractError::UnsupportedStatus(525))
        ));
    }
}
