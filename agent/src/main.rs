// agent/src/main.rs

mod cli;
mod connector;

use agent_core::application::{load_registry, RequestProcessor};
use agent_core::config::AgentConfig;
use agent_core::infrastructure::schema_validator::JsonSchemaValidator;
use agent_core::ports::validator::Validator;
use clap::Parser;
use cli::Cli;
use connector::StdioConnector;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = AgentConfig::load(cli.config.as_deref())?;
    if let Some(modules_dir) = cli.modules_dir {
        config.modules_dir = modules_dir;
    }
    if let Some(results_dir) = cli.results_dir {
        config.results_dir = results_dir;
    }

    info!(
        modules_dir = %config.modules_dir.display(),
        results_dir = %config.results_dir.display(),
        worker_pool_size = config.worker_pool_size,
        "starting agent"
    );

    let validator: Arc<dyn Validator> = Arc::new(JsonSchemaValidator::new());
    let registry = Arc::new(load_registry(&config.modules_dir, validator).await);
    info!(module_count = registry.len(), "module registry ready");

    let connector = Arc::new(StdioConnector::new());
    let processor = Arc::new(RequestProcessor::new(
        registry,
        connector,
        config.worker_pool_size,
        config.results_dir.clone(),
    ));

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut in_flight = tokio::task::JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let envelope: serde_json::Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "skipping unreadable input line");
                continue;
            }
        };

        let processor = processor.clone();
        in_flight.spawn(async move {
            processor.handle_envelope(envelope).await;
        });
    }

    // Stdin closed (EOF): let every request already accepted finish and send
    // its response before the process exits.
    while in_flight.join_next().await.is_some() {}

    Ok(())
}
