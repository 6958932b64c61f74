pub mod structured_console_encoder;
#[cfg(test)]
pub(crate) mod capture;

use std::path::Path;

use log::{debug, info};
use log4rs::{
    Config,
    config::{Deserializers, RawConfig},
};

use crate::log::structured_console_encoder::StructuredConsoleEncoderDeserializer;

pub const LOG_CONFIG_FILE: &str = "log4rs.yml";

fn deserializers() -> Deserializers {
    let mut deserializers = Deserializers::default();
    deserializers.insert("structured_console", StructuredConsoleEncoderDeserializer);
    deserializers
}

/// Initializes logging from `log4rs.yml` in the working directory, or the embedded defaults.
///
/// Only the binary calls this; the library just logs through the `log` facade.
pub fn init_logging() {
    let path = Path::new(LOG_CONFIG_FILE);

    if path.exists() {
        match log4rs::init_file(path, deserializers()) {
            Ok(_) => {
                info!(
                    path = LOG_CONFIG_FILE;
                    "Logging initialized from external configuration"
                );
                return;
            },
            Err(e) => {
                panic!("Failed to load external {}: {}", LOG_CONFIG_FILE, e);
            },
        }
    }

    let config = embedded_config().expect("Embedded logging configuration is invalid");
    log4rs::init_config(config).expect("Failed to initialize logging from embedded config");

    debug!("Logging initialized from embedded defaults (no external log4rs.yml found)");
}

fn embedded_config() -> anyhow::Result<Config> {
    let yaml_content = include_str!("../../resources/default_log4rs.yml");
    let raw_config: RawConfig = serde_yaml::from_str(yaml_content)?;

    let (appenders, errors) = raw_config.appenders_lossy(&deserializers());
    if !errors.is_empty() {
        anyhow::bail!("Errors parsing embedded appenders: {:?}", errors);
    }

    Ok(Config::builder()
        .appenders(appenders)
        .loggers(raw_config.loggers())
        .build(raw_config.root())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_is_valid() {
        let config = embedded_config().unwrap();

        assert_eq!(config.root().level(), log::LevelFilter::Info);
        assert!(config.loggers().iter().any(|logger| logger.name() == "ws_client"));
    }
}
