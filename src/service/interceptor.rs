use anyhow::Result;
use uuid::Uuid;

use crate::http::{RequestDescriptor, ResponseOutcome};

/// Hooks around every call of a web service client.
///
/// Each hook runs once per logical call, retries included, in registration
/// order. An error from either hook aborts the call.
pub trait WebServiceClientInterceptor: Send + Sync {
    fn on_request(&self, _request: &mut RequestDescriptor) -> Result<()> {
        Ok(())
    }

    fn on_response(&self, _response: &ResponseOutcome) -> Result<()> {
        Ok(())
    }
}

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags each request with a fresh `x-request-id`, keeping one set by an
/// earlier interceptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestIdInterceptor;

impl WebServiceClientInterceptor for RequestIdInterceptor {
    fn on_request(&self, request: &mut RequestDescriptor) -> Result<()> {
        request
            .headers
            .entry(REQUEST_ID_HEADER.to_string())
            .or_insert_with(|| Uuid::new_v4().to_string());
        Ok(())
    }
}
