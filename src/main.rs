use std::{path::Path, sync::Arc};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{debug, info};
use serde_json::Value;
use ws_client::{
    cli::{ApplyArgs, Cli, Commands, ConnectionArgs},
    config::{ClientConfig, load_configuration},
    contract::schema::load_contract,
    http::HttpClient,
    log::init_logging,
    service::{RequestIdInterceptor, WebServiceClient, WebServiceError},
    stub::{CallArgs, StubGenerator},
    tracking::ActionStats,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { contract } => validate(&contract),
        Commands::Call {
            contract,
            method,
            path,
            bean,
            config,
            connection,
        } => call(&contract, &method, path, bean.as_deref(), &config, &connection).await,
    }
}

fn validate(contract_path: &Path) -> Result<()> {
    let contract = load_contract(contract_path)?;
    let stubs = StubGenerator::new(contract.clone())
        .generate()
        .with_context(|| format!("Invalid contract {}", contract.name()))?;

    println!("{}", contract.name());
    for stub in stubs.values() {
        println!("  {} -> {} {}", stub.name(), stub.method(), stub.path());
    }
    Ok(())
}

async fn call(
    contract_path: &Path,
    method: &str,
    path: Vec<(String, String)>,
    bean: Option<&str>,
    config_path: &Path,
    connection: &ConnectionArgs,
) -> Result<()> {
    let cfg = load_configuration(config_path)?;
    let mut client_config = ClientConfig::from_config(&cfg).context("Invalid client configuration")?;
    client_config.apply_connection(connection);

    let stats = ActionStats::new();
    let transport = Arc::new(HttpClient::with_config(&client_config, stats.clone())?);
    let client = WebServiceClient::new(&client_config.service_url, transport)?
        .with_interceptor(Arc::new(RequestIdInterceptor));
    let stubs = StubGenerator::new(load_contract(contract_path)?).build(client)?;

    let mut args = CallArgs::new();
    for (name, value) in path {
        args = args.path_value(&name, Value::String(value));
    }
    if let Some(bean) = bean {
        let bean: Value = serde_json::from_str(bean).context("Request bean is not valid JSON")?;
        args = args.bean_value(bean);
    }

    info!(service = stubs.service(), method = method; "Calling web service");
    let result = stubs.call::<Value>(method, args).await;

    if let Some(http_stats) = stats.get("http") {
        debug!(calls = http_stats.count, total_nanos = http_stats.total_nanos; "HTTP stats");
    }

    match result {
        Ok(Value::Null) => Ok(()),
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        },
        Err(WebServiceError::Remote(e)) => {
            eprintln!(
                "severity={}, error_code={}, status={}, message={}",
                e.severity,
                e.error_code,
                e.status.code(),
                e.message
            );
            Err(anyhow!("Remote service error: {}", e.error_code))
        },
        Err(e) => Err(e).context("Web service call failed"),
    }
}
