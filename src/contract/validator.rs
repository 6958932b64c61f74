use std::collections::HashSet;

use super::{ContractError, MethodSpec, ParamBinding, PathTemplate, ServiceContract};
use crate::bean::TypeShape;

/// Rejects contract shapes the stub generator cannot compile.
///
/// Runs once per contract registration and has no side effects besides the
/// returned error.
pub struct ContractValidator<'a> {
    contract: &'a ServiceContract,
}

impl<'a> ContractValidator<'a> {
    pub fn new(contract: &'a ServiceContract) -> Self {
        Self { contract }
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        // stubs are dispatched by name, so overloads cannot be told apart
        let mut names = HashSet::new();
        for method in self.contract.methods() {
            if !names.insert(method.name.as_str()) {
                return Err(ContractError::DuplicateMethod {
                    service: self.contract.name().to_string(),
                    method: method.name.clone(),
                });
            }
            self.validate_method(method)?;
        }
        Ok(())
    }

    fn validate_method(&self, method: &MethodSpec) -> Result<(), ContractError> {
        let route = method.route.as_ref().ok_or_else(|| ContractError::MissingRoute {
            method: method.name.clone(),
        })?;
        let template = PathTemplate::parse(&route.path)?;

        let mut bound = HashSet::new();
        let mut bean_params = 0;
        for param in &method.params {
            match &param.binding {
                ParamBinding::Path(placeholder) => {
                    if !template.has_variable(placeholder) {
                        return Err(ContractError::UnknownPathParam {
                            method: method.name.clone(),
                            param: placeholder.clone(),
                            path: route.path.clone(),
                        });
                    }
                    if !bound.insert(placeholder.as_str()) {
                        return Err(ContractError::DuplicatePathParam {
                            method: method.name.clone(),
                            param: placeholder.clone(),
                        });
                    }
                    if !param.shape.is_value() {
                        return Err(ContractError::InvalidPathParamType {
                            method: method.name.clone(),
                            param: param.name.clone(),
                            shape: param.shape.clone(),
                        });
                    }
                },
                ParamBinding::Bean => {
                    bean_params += 1;
                    if bean_params > 1 {
                        return Err(ContractError::MultipleRequestBeans {
                            method: method.name.clone(),
                        });
                    }
                    self.validate_request_bean_type(&param.shape, method)?;
                    if !route.method.has_body() && !param.shape.is_bean() {
                        return Err(ContractError::InvalidQueryBeanType {
                            method: method.name.clone(),
                            shape: param.shape.clone(),
                        });
                    }
                },
            }
        }

        if let Some(unbound) = template.variables().find(|variable| !bound.contains(variable)) {
            return Err(ContractError::UnresolvedPlaceholder {
                path: route.path.clone(),
                name: unbound.to_string(),
            });
        }

        self.validate_response_bean_type(&method.returns, method)
    }

    pub fn validate_request_bean_type(&self, shape: &TypeShape, method: &MethodSpec) -> Result<(), ContractError> {
        if shape.is_bean() || shape.is_bean_list() {
            return Ok(());
        }
        if shape.is_value() {
            return Err(ContractError::PathParamBindingRequired {
                method: method.name.clone(),
                shape: shape.clone(),
            });
        }
        Err(ContractError::InvalidRequestBeanType {
            method: method.name.clone(),
            shape: shape.clone(),
        })
    }

    pub fn validate_response_bean_type(&self, shape: &TypeShape, method: &MethodSpec) -> Result<(), ContractError> {
        let valid = match shape {
            TypeShape::Void | TypeShape::Bean(_) => true,
            TypeShape::Optional(item) => item.is_bean(),
            TypeShape::List(item) => item.is_bean(),
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(ContractError::InvalidResponseBeanType {
                method: method.name.clone(),
                shape: shape.clone(),
            })
        }
    }
}
