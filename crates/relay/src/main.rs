use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use relay_models::config::RelayConfig;
use relay_models::intent::TransferIntent;
use relay_models::policy::SelectionPolicy;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "relay", about = "Execute a transfer intent through competing relay agents")]
struct Cli {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Read TransferIntent JSON from a file instead of stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,

    /// Route selection policy: balanced, cheapest, fastest or safest
    #[arg(long)]
    policy: Option<SelectionPolicy>,

    /// Print the metrics snapshot to stderr after execution
    #[arg(long)]
    metrics: bool,
}

fn load_config(path: Option<&str>) -> Result<RelayConfig> {
    let Some(path) = path else {
        return Ok(RelayConfig::default());
    };
    let config_str =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {path}"))?;
    toml::from_str(&config_str).with_context(|| format!("Failed to parse config: {path}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(policy) = cli.policy {
        config.orchestrator.selection_policy = policy;
    }

    // Read intent
    let intent_json = if let Some(input_path) = &cli.input {
        std::fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read input: {input_path}"))?
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    };
    let intent: TransferIntent =
        serde_json::from_str(&intent_json).context("Failed to parse TransferIntent JSON")?;

    let relay = relay::build_orchestrator(&config).context("Failed to build orchestrator")?;
    let outcome = relay.orchestrator.execute(&intent).await;

    if cli.metrics {
        let metrics = serde_json::to_string_pretty(&relay.orchestrator.metrics())?;
        eprintln!("{metrics}");
    }
    relay.shutdown().await;

    let result = outcome.context("Execution failed")?;

    // Output result as JSON to stdout
    let output = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");

    Ok(())
}
