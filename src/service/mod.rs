//! Runtime invoker for web service calls.
//!
//! [`WebServiceClient`] turns one resolved call (verb, path template, path
//! values, request bean, declared return shape) into a [`RequestDescriptor`],
//! runs it through the interceptors and the [`HttpTransport`], then classifies
//! the response and decodes the body.

mod error;
mod interceptor;
pub mod validation;

use std::{collections::BTreeMap, fmt, sync::Arc};

use log::{debug, log};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{
    bean::{self, BeanError, TypeShape},
    contract::{ContractError, PathTemplate},
    http::{HttpMethod, HttpTransport, RequestDescriptor, ResponseOutcome},
};

pub use error::{RemoteServiceError, Severity, WebServiceError};
pub use interceptor::{REQUEST_ID_HEADER, RequestIdInterceptor, WebServiceClientInterceptor};
pub use validation::{ErrorResponse, REMOTE_SERVICE_ERROR, validate_response};

pub struct WebServiceClient {
    service_url: Url,
    transport: Arc<dyn HttpTransport>,
    interceptors: Vec<Arc<dyn WebServiceClientInterceptor>>,
}

impl WebServiceClient {
    pub fn new(service_url: &str, transport: Arc<dyn HttpTransport>) -> Result<Self, ContractError> {
        let invalid = |reason: &str| ContractError::InvalidServiceUrl {
            url: service_url.to_string(),
            reason: reason.to_string(),
        };
        let url = Url::parse(service_url).map_err(|e| invalid(&e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("service url cannot have path appended"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("service url must not contain query or fragment"));
        }

        Ok(Self {
            service_url: url,
            transport,
            interceptors: Vec::new(),
        })
    }

    /// Registers an interceptor; hooks run in registration order.
    pub fn intercept(&mut self, interceptor: Arc<dyn WebServiceClientInterceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn WebServiceClientInterceptor>) -> Self {
        self.intercept(interceptor);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.service_url
    }

    /// The absolute request URI for `template`, each path value encoded as one segment.
    pub fn service_url(
        &self,
        template: &PathTemplate,
        path_params: &BTreeMap<String, String>,
    ) -> Result<String, ContractError> {
        let segments = template.resolve(path_params)?;
        let mut url = self.service_url.clone();
        url.path_segments_mut()
            .map_err(|_| ContractError::InvalidServiceUrl {
                url: self.service_url.to_string(),
                reason: "service url cannot have path appended".to_string(),
            })?
            .pop_if_empty()
            .extend(&segments);
        Ok(url.into())
    }

    /// Places the request bean: query params for `GET`/`DELETE`, a JSON body otherwise.
    pub fn put_request_bean(&self, request: &mut RequestDescriptor, bean: &Value) -> Result<(), BeanError> {
        if request.method.has_body() {
            request.body = Some(bean::encode_body(bean)?);
        } else {
            request.params.extend(bean::encode_query(bean)?);
        }
        Ok(())
    }

    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &PathTemplate,
        path_params: &BTreeMap<String, String>,
        request_bean: Option<&Value>,
        response_shape: &TypeShape,
    ) -> Result<T, WebServiceError> {
        let uri = self.service_url(path, path_params)?;
        let mut request = RequestDescriptor::new(method, uri);
        if let Some(bean) = request_bean {
            self.put_request_bean(&mut request, bean)?;
        }

        for interceptor in &self.interceptors {
            interceptor.on_request(&mut request).map_err(WebServiceError::Interceptor)?;
        }

        let response = self.transport.send(&request).await?;

        for interceptor in &self.interceptors {
            interceptor.on_response(&response).map_err(WebServiceError::Interceptor)?;
        }

        self.validate_response(&response)?;
        debug!(method = method.as_str(), path = path.as_str(), returns:% = response_shape; "decode response");
        Ok(bean::decode(&response.body, response_shape)?)
    }

    fn validate_response(&self, response: &ResponseOutcome) -> Result<(), WebServiceError> {
        if let Err(e) = validate_response(response) {
            if let WebServiceError::Remote(remote) = &e {
                log!(
                    remote.severity.log_level(),
                    error_code = remote.error_code.as_str(),
                    status = remote.status.code();
                    "{}", remote.message
                );
            }
            return Err(e);
        }
        Ok(())
    }
}

impl fmt::Debug for WebServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebServiceClient")
            .field("service_url", &self.service_url.as_str())
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}
