use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ws-client")]
#[command(about = "Validate and call web service contracts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a contract schema file and print the generated
    /// method-to-route mapping, sorted by method name
    Validate {
        #[arg(short, long, help = "Path to the contract schema file (TOML or YAML)")]
        contract: PathBuf,
    },
    /// Call one method of a contract and print the decoded response as JSON
    Call {
        #[arg(short, long, help = "Path to the contract schema file (TOML or YAML)")]
        contract: PathBuf,
        #[arg(short, long, help = "Name of the contract method to call")]
        method: String,
        #[arg(
            short,
            long = "path",
            value_parser = parse_key_value,
            help = "Path param as name=value. Can be specified multiple times."
        )]
        path: Vec<(String, String)>,
        #[arg(short, long, help = "Request bean as JSON")]
        bean: Option<String>,
        #[arg(long, help = "Path to the config file", default_value = "config/config.toml")]
        config: PathBuf,
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    #[arg(short = 'u', long, help = "Overrides client.service_url from the config file")]
    pub service_url: Option<String>,
    #[arg(long, help = "Overrides client.max_attempts from the config file")]
    pub max_attempts: Option<u32>,
}

/// Layers CLI arguments over values loaded from the config file.
pub trait ApplyArgs {
    fn apply_connection(&mut self, args: &ConnectionArgs);
}

pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got {}", s)),
    }
}
