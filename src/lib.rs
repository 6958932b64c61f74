//! Typed RPC-over-HTTP web service clients.
//!
//! A service contract (declared with [`web_service!`] or loaded from a schema
//! file) is validated and compiled into stubs once, at startup. Each call then
//! runs through the [`WebServiceClient`], which places path values and the
//! request bean on the wire, sends the request through an [`http::HttpTransport`]
//! with retry and backoff, and classifies the response into a decoded value or
//! a structured [`WebServiceError`].

pub mod bean;
pub mod cli;
pub mod config;
pub mod contract;
pub mod http;
pub mod log;
pub mod service;
pub mod stub;
pub mod tracking;

pub use crate::contract::{ContractError, ServiceContract};
pub use crate::service::{RemoteServiceError, Severity, WebServiceClient, WebServiceError};
pub use crate::stub::{CallArgs, ClientRegistry, ServiceStubs, StubGenerator};
