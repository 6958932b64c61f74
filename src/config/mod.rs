//! Client configuration: a TOML file layered with `WS_CLIENT_*` environment
//! variables, then CLI overrides through [`ApplyArgs`](crate::cli::ApplyArgs).

mod defaults;
mod loader;

pub use defaults::ClientConfig;
pub use loader::{ENV_PREFIX, get_default_config, load_configuration, write_config_to};
