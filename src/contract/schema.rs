//! Contracts declared in schema files instead of Rust code.
//!
//! ```toml
//! name = "UserWebService"
//!
//! [[methods]]
//! name = "get_user"
//! method = "GET"
//! path = "/user/:id"
//! returns = "Optional<UserView>"
//! params = [{ name = "id", type = "u64", path = "id" }]
//! ```
//!
//! Type names follow [`TypeShape`]'s text form. A `param` without `path` is the
//! request bean.

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, FileFormat};
use log::debug;
use serde::Deserialize;

use super::{ContractError, MethodSpec, ParamBinding, ParamSpec, Route, ServiceContract};
use crate::{bean::TypeShape, http::HttpMethod};

#[derive(Debug, Deserialize)]
struct ContractDocument {
    name: String,
    #[serde(default)]
    methods: Vec<MethodDocument>,
}

#[derive(Debug, Deserialize)]
struct MethodDocument {
    name: String,
    method: Option<String>,
    path: Option<String>,
    returns: Option<String>,
    #[serde(default)]
    params: Vec<ParamDocument>,
}

#[derive(Debug, Deserialize)]
struct ParamDocument {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    path: Option<String>,
}

/// Loads a contract from a TOML or YAML file, chosen by extension.
pub fn load_contract(path: &Path) -> Result<ServiceContract> {
    let filename = path.to_str().context("Invalid contract file path")?;
    let document: ContractDocument = Config::builder()
        .add_source(config::File::with_name(filename))
        .build()
        .and_then(Config::try_deserialize)
        .with_context(|| format!("Could not read contract file {}", path.display()))?;

    debug!(path:% = path.display(), service = document.name.as_str(); "Loaded contract schema");
    document.into_contract().context("Could not build contract")
}

/// Parses a contract from schema text.
pub fn parse_contract(text: &str, format: FileFormat) -> Result<ServiceContract, ContractError> {
    let document: ContractDocument = Config::builder()
        .add_source(config::File::from_str(text, format))
        .build()
        .and_then(Config::try_deserialize)
        .map_err(|e| ContractError::Schema(e.to_string()))?;
    document.into_contract()
}

impl ContractDocument {
    fn into_contract(self) -> Result<ServiceContract, ContractError> {
        let mut contract = ServiceContract::new(self.name);
        for method in self.methods {
            contract = contract.method(method.into_method()?);
        }
        Ok(contract)
    }
}

impl MethodDocument {
    fn into_method(self) -> Result<MethodSpec, ContractError> {
        let route = match (self.method, self.path) {
            (Some(method), Some(path)) => Some(Route {
                method: method.parse::<HttpMethod>().map_err(ContractError::Schema)?,
                path,
            }),
            _ => None,
        };

        let returns = match self.returns {
            Some(name) => parse_shape(&name)?,
            None => TypeShape::Void,
        };

        let params = self
            .params
            .into_iter()
            .map(|param| -> Result<ParamSpec, ContractError> {
                let binding = match param.path {
                    Some(placeholder) => ParamBinding::Path(placeholder),
                    None => ParamBinding::Bean,
                };
                Ok(ParamSpec::new(param.name, binding, parse_shape(&param.type_name)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MethodSpec {
            name: self.name,
            route,
            params,
            returns,
        })
    }
}

fn parse_shape(name: &str) -> Result<TypeShape, ContractError> {
    name.parse().map_err(ContractError::Schema)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const USER_SERVICE: &str = r#"
name = "UserWebService"

[[methods]]
name = "get_user"
method = "GET"
path = "/user/:id"
returns = "Optional<UserView>"
params = [{ name = "id", type = "u64", path = "id" }]

[[methods]]
name = "create_user"
method = "POST"
path = "/user"
returns = "UserView"
params = [{ name = "request", type = "CreateUserRequest" }]

[[methods]]
name = "delete_user"
method = "DELETE"
path = "/user/:id"
params = [{ name = "id", type = "u64", path = "id" }]
"#;

    #[test]
    fn test_parse_contract() {
        let contract = parse_contract(USER_SERVICE, FileFormat::Toml).unwrap();

        assert_eq!(contract.name(), "UserWebService");
        assert_eq!(contract.methods().len(), 3);

        let get = &contract.methods()[0];
        assert_eq!(get.describe(), "GET /user/:id");
        assert_eq!(get.params[0].path_binding(), Some("id"));
        assert_eq!(get.returns.to_string(), "Optional<UserView>");

        let create = &contract.methods()[1];
        assert_eq!(create.bean_param().unwrap().shape, TypeShape::Bean("CreateUserRequest".to_string()));

        assert_eq!(contract.methods()[2].returns, TypeShape::Void);
        contract.validate().unwrap();
    }

    #[test]
    fn test_missing_route_is_left_to_validator() {
        let text = r#"
name = "TestWebService"

[[methods]]
name = "get"
path = "/test"
"#;
        let contract = parse_contract(text, FileFormat::Toml).unwrap();

        assert!(contract.methods()[0].route.is_none());
        assert!(matches!(contract.validate(), Err(ContractError::MissingRoute { .. })));
    }

    #[test]
    fn test_invalid_type_name() {
        let text = r#"
name = "TestWebService"

[[methods]]
name = "get"
method = "GET"
path = "/test"
returns = "List<Broken"
"#;
        assert!(matches!(
            parse_contract(text, FileFormat::Toml),
            Err(ContractError::Schema(_))
        ));
    }

    #[test]
    fn test_load_contract_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contract.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "name: PingWebService\nmethods:\n  - name: ping\n    method: GET\n    path: /ping\n"
        )
        .unwrap();

        let contract = load_contract(&path).unwrap();

        assert_eq!(contract.name(), "PingWebService");
        assert_eq!(contract.methods()[0].describe(), "GET /ping");
    }
}
