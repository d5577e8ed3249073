//! Tether command-line tool
//!
//! Validates engine configuration files and evaluates captured exchanges
//! against them offline.
//!
//! Usage:
//!   tether check <config.yaml>
//!   tether eval --config <config.yaml> --exchange <exchange.json> [--monitor] [--wait]

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tether_intercept::{deliver, Config, Delivery, Exchange, InterceptEngine, RuleKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tether interception rule engine
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(author, version, about = "Check and exercise Tether interception rules")]
struct Args {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info", env = "TETHER_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and validate a configuration file
    Check {
        /// Path to the YAML configuration
        config: PathBuf,
    },
    /// Evaluate one captured exchange and print the decision
    Eval {
        /// Path to the YAML configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Path to the exchange JSON
        #[arg(short, long)]
        exchange: PathBuf,

        /// Also print the monitor log after evaluation
        #[arg(short, long)]
        monitor: bool,

        /// Wait out the scheduled delivery delay before printing the outcome
        #[arg(short, long)]
        wait: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    match args.command {
        Commands::Check { config } => check(config),
        Commands::Eval {
            config,
            exchange,
            monitor,
            wait,
        } => eval(config, exchange, monitor, wait).await,
    }
}

fn check(path: PathBuf) -> anyhow::Result<()> {
    let config = Config::from_file(&path)?;
    let engine = InterceptEngine::from_config(&config)
        .with_context(|| format!("Failed to install rules from {}", path.display()))?;

    println!("{}: OK", path.display());
    for kind in RuleKind::ALL {
        println!("  {:<13} {}", kind.as_str(), engine.rule_count(kind));
    }
    Ok(())
}

async fn eval(config: PathBuf, exchange: PathBuf, monitor: bool, wait: bool) -> anyhow::Result<()> {
    let config = Config::from_file(&config)?;
    let engine = InterceptEngine::from_config(&config)?;

    let raw = std::fs::read(&exchange)
        .with_context(|| format!("Failed to read exchange file {}", exchange.display()))?;
    let exchange: Exchange = serde_json::from_slice(&raw)
        .with_context(|| format!("Failed to parse exchange file {}", exchange.display()))?;

    let decision = engine.evaluate(&exchange);
    println!("{}", serde_json::to_string_pretty(&decision)?);

    if wait {
        info!(delay_seconds = decision.extra_delay_seconds, "Waiting for delivery");
        match deliver(&decision).await {
            Delivery::Response(response) => {
                println!("delivered: {} ({} bytes)", response.status, response.body.len())
            }
            Delivery::Failed { code } => println!("delivery failed with code {code}"),
        }
    }

    if monitor {
        println!("{}", serde_json::to_string_pretty(&engine.peek_monitored())?);
    }
    Ok(())
}
