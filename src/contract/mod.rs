//! Declared service contracts.
//!
//! A [`ServiceContract`] is the ordered list of [`MethodSpec`]s a client and
//! server agree on. Contracts come from the [`web_service!`](crate::web_service)
//! macro or from schema files ([`schema`]), and are checked by the
//! [`ContractValidator`] before any stub is generated from them.

mod error;
pub mod path;
pub mod schema;
mod validator;

use crate::{
    bean::{TypeShape, WireType},
    http::HttpMethod,
};

pub use error::ContractError;
pub use path::PathTemplate;
pub use validator::ContractValidator;

/// HTTP method and path template attached to a contract method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
}

/// How a method parameter is carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBinding {
    /// Bound to the named `:placeholder` of the path template.
    Path(String),
    /// The request bean: query params for `GET`/`DELETE`, the body otherwise.
    Bean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub binding: ParamBinding,
    pub shape: TypeShape,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, binding: ParamBinding, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            binding,
            shape,
        }
    }

    /// A path param bound to the placeholder with the same name.
    pub fn path<T: WireType + ?Sized>(name: &str) -> Self {
        Self::path_named::<T>(name, name)
    }

    pub fn path_named<T: WireType + ?Sized>(name: &str, placeholder: &str) -> Self {
        Self::new(name, ParamBinding::Path(placeholder.to_string()), T::shape())
    }

    pub fn bean<T: WireType + ?Sized>(name: &str) -> Self {
        Self::new(name, ParamBinding::Bean, T::shape())
    }

    pub fn path_binding(&self) -> Option<&str> {
        match &self.binding {
            ParamBinding::Path(placeholder) => Some(placeholder.as_str()),
            ParamBinding::Bean => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: String,
    pub route: Option<Route>,
    pub params: Vec<ParamSpec>,
    pub returns: TypeShape,
}

impl MethodSpec {
    /// A method with no route, no params and a `void` return.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: None,
            params: Vec::new(),
            returns: TypeShape::Void,
        }
    }

    pub fn route(mut self, method: HttpMethod, path: impl Into<String>) -> Self {
        self.route = Some(Route {
            method,
            path: path.into(),
        });
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns<T: WireType + ?Sized>(self) -> Self {
        self.returns_shape(T::shape())
    }

    pub fn returns_shape(mut self, shape: TypeShape) -> Self {
        self.returns = shape;
        self
    }

    /// The single non-path parameter, if the method declares one.
    pub fn bean_param(&self) -> Option<&ParamSpec> {
        self.params.iter().find(|param| param.binding == ParamBinding::Bean)
    }

    /// `VERB /path` for logs and error messages.
    pub fn describe(&self) -> String {
        match &self.route {
            Some(route) => format!("{} {}", route.method, route.path),
            None => "<no route>".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceContract {
    name: String,
    methods: Vec<MethodSpec>,
}

impl ServiceContract {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> &[MethodSpec] {
        &self.methods
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        ContractValidator::new(self).validate()
    }
}
