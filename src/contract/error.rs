use thiserror::Error;

use crate::bean::TypeShape;

/// Configuration errors: a contract, path or status that cannot be handled.
///
/// These are raised at registration time or on first use and are never
/// retried or reported as remote errors.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("method must have a route with http method and path, method={method}")]
    MissingRoute { method: String },

    #[error("invalid path, path={path}, reason={reason}")]
    InvalidPath { path: String, reason: String },

    #[error("found duplicate method name, service={service}, method={method}")]
    DuplicateMethod { service: String, method: String },

    #[error(
        "request bean type must be bean or List<T>, if it is path param, please add a path-param binding, type={shape}, method={method}"
    )]
    PathParamBindingRequired { method: String, shape: TypeShape },

    #[error("request bean type must be bean or List<T>, type={shape}, method={method}")]
    InvalidRequestBeanType { method: String, shape: TypeShape },

    #[error("query param bean must be bean, type={shape}, method={method}")]
    InvalidQueryBeanType { method: String, shape: TypeShape },

    #[error("response bean type must be bean, Optional<T> or List<T>, type={shape}, method={method}")]
    InvalidResponseBeanType { method: String, shape: TypeShape },

    #[error("method must not have more than one request bean param, method={method}")]
    MultipleRequestBeans { method: String },

    #[error("path param must be scalar or enum, param={param}, type={shape}, method={method}")]
    InvalidPathParamType {
        method: String,
        param: String,
        shape: TypeShape,
    },

    #[error("path param is not declared in path, param={param}, path={path}, method={method}")]
    UnknownPathParam { method: String, param: String, path: String },

    #[error("path param is bound more than once, param={param}, method={method}")]
    DuplicatePathParam { method: String, param: String },

    #[error("path param is not resolved, name={name}, path={path}")]
    UnresolvedPlaceholder { path: String, name: String },

    #[error("path param value must not be empty, '.' or '..', name={name}, value={value}, path={path}")]
    InvalidPathValue { path: String, name: String, value: String },

    #[error("method is not declared in contract, service={service}, method={method}")]
    UnknownMethod { service: String, method: String },

    #[error("call arguments do not match method, method={method}, reason={reason}")]
    ArgumentMismatch { method: String, reason: String },

    #[error("unsupported http status code, code={0}")]
    UnsupportedStatus(u16),

    #[error("invalid service url, url={url}, reason={reason}")]
    InvalidServiceUrl { url: String, reason: String },

    #[error("service client is already registered, service={0}")]
    ServiceAlreadyRegistered(String),

    #[error("invalid contract schema: {0}")]
    Schema(String),
}
