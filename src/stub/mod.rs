//! Stub generation: from a validated [`ServiceContract`] to callable methods.
//!
//! The [`StubGenerator`] runs once per contract. It validates the contract and
//! compiles every method into a [`GeneratedStub`], an immutable dispatch entry
//! holding the parsed path template and declared shapes. [`ServiceStubs`] keeps
//! the stubs keyed by method name next to the [`WebServiceClient`] they call
//! through, and is shared freely between tasks once built.
//!
//! Typed clients declared with [`web_service!`](crate::web_service) dispatch
//! into the same stubs by method name, so typed and untyped (`serde_json::Value`)
//! calls go through one code path.

mod macros;
mod registry;

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    bean::{self, BeanError, TypeShape},
    contract::{ContractError, MethodSpec, PathTemplate, ServiceContract},
    http::HttpMethod,
    service::{WebServiceClient, WebServiceError},
};

pub use registry::ClientRegistry;

/// Arguments of one call, named after the contract method's params.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CallArgs {
    path: Vec<(String, Value)>,
    bean: Option<Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path<T: Serialize + ?Sized>(self, name: &str, value: &T) -> Result<Self, BeanError> {
        Ok(self.path_value(name, bean::to_value(value)?))
    }

    pub fn path_value(mut self, name: &str, value: Value) -> Self {
        self.path.push((name.to_string(), value));
        self
    }

    pub fn bean<T: Serialize + ?Sized>(self, bean: &T) -> Result<Self, BeanError> {
        Ok(self.bean_value(bean::to_value(bean)?))
    }

    pub fn bean_value(mut self, bean: Value) -> Self {
        self.bean = Some(bean);
        self
    }
}

/// One compiled contract method.
#[derive(Debug, Clone)]
pub struct GeneratedStub {
    spec: MethodSpec,
    method: HttpMethod,
    template: PathTemplate,
}

impl GeneratedStub {
    /// Compiles a method of an already validated contract.
    fn compile(spec: &MethodSpec) -> Result<Self, ContractError> {
        let route = spec.route.as_ref().ok_or_else(|| ContractError::MissingRoute {
            method: spec.name.clone(),
        })?;
        Ok(Self {
            method: route.method,
            template: PathTemplate::parse(&route.path)?,
            spec: spec.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        self.template.as_str()
    }

    pub fn returns(&self) -> &TypeShape {
        &self.spec.returns
    }

    pub fn spec(&self) -> &MethodSpec {
        &self.spec
    }

    pub async fn invoke<T: DeserializeOwned>(
        &self,
        client: &WebServiceClient,
        args: CallArgs,
    ) -> Result<T, WebServiceError> {
        debug!(method = self.spec.describe().as_str(); "call web service");
        let (path_params, request_bean) = self.partition(args)?;
        client
            .execute(
                self.method,
                &self.template,
                &path_params,
                request_bean.as_ref(),
                &self.spec.returns,
            )
            .await
    }

    /// Splits call arguments into encoded path values, keyed by placeholder, and the request bean.
    fn partition(&self, args: CallArgs) -> Result<(BTreeMap<String, String>, Option<Value>), WebServiceError> {
        let mismatch = |reason: String| ContractError::ArgumentMismatch {
            method: self.spec.name.clone(),
            reason,
        };

        let mut path_params = BTreeMap::new();
        for (name, value) in args.path {
            let placeholder = self
                .spec
                .params
                .iter()
                .find(|param| param.name == name)
                .and_then(|param| param.path_binding())
                .ok_or_else(|| mismatch(format!("method has no path param named {}", name)))?;
            path_params.insert(placeholder.to_string(), bean::encode_path_value(&value)?);
        }

        let missing = self
            .spec
            .params
            .iter()
            .filter(|param| param.path_binding().is_some_and(|placeholder| !path_params.contains_key(placeholder)))
            .map(|param| param.name.as_str())
            .next();
        if let Some(name) = missing {
            return Err(mismatch(format!("missing path param {}", name)).into());
        }

        let request_bean = match (args.bean, self.spec.bean_param()) {
            (None | Some(Value::Null), _) => None,
            (Some(bean), Some(_)) => Some(bean),
            (Some(_), None) => return Err(mismatch("method declares no request bean".to_string()).into()),
        };

        Ok((path_params, request_bean))
    }
}

pub struct StubGenerator {
    contract: ServiceContract,
}

impl StubGenerator {
    pub fn new(contract: ServiceContract) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &ServiceContract {
        &self.contract
    }

    /// Validates the contract and compiles its methods, keyed and logged in name order.
    pub fn generate(&self) -> Result<BTreeMap<String, GeneratedStub>, ContractError> {
        self.contract.validate()?;

        let mut stubs = BTreeMap::new();
        for spec in self.contract.methods() {
            stubs.insert(spec.name.clone(), GeneratedStub::compile(spec)?);
        }

        for stub in stubs.values() {
            info!(
                service = self.contract.name(),
                method = stub.name(),
                http_method = stub.method().as_str(),
                path = stub.path();
                "Generated web service stub"
            );
        }
        Ok(stubs)
    }

    pub fn build(self, client: WebServiceClient) -> Result<ServiceStubs, ContractError> {
        let stubs = self.generate()?;
        Ok(ServiceStubs {
            contract: self.contract,
            client,
            stubs,
        })
    }
}

/// Generated stubs of one service and the client they call through.
#[derive(Debug)]
pub struct ServiceStubs {
    contract: ServiceContract,
    client: WebServiceClient,
    stubs: BTreeMap<String, GeneratedStub>,
}

impl ServiceStubs {
    pub fn service(&self) -> &str {
        self.contract.name()
    }

    pub fn contract(&self) -> &ServiceContract {
        &self.contract
    }

    pub fn client(&self) -> &WebServiceClient {
        &self.client
    }

    pub fn stub(&self, name: &str) -> Option<&GeneratedStub> {
        self.stubs.get(name)
    }

    /// Stubs sorted by method name.
    pub fn stubs(&self) -> impl Iterator<Item = &GeneratedStub> {
        self.stubs.values()
    }

    pub async fn call<T: DeserializeOwned>(&self, name: &str, args: CallArgs) -> Result<T, WebServiceError> {
        let stub = self.stubs.get(name).ok_or_else(|| ContractError::UnknownMethod {
            service: self.contract.name().to_string(),
            method: name.to_string(),
        })?;
        stub.invoke(&self.client, args).await
    }
}
