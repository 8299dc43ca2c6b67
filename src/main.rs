//! ro-dispatch command line entry point

use clap::{Parser, Subcommand};
use ro_dispatch::config::DispatcherConfig;
use ro_dispatch::dispatch::{ChannelSink, Delivery, Dispatcher};
use ro_dispatch::observability::{init_default_logging, init_logging, parse_level, LogFormat};
use ro_dispatch::protocol::{EnvelopeRecord, HttpMethod, ResponseEnvelope};
use ro_dispatch::transport::HttpFetcher;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

/// Classify Restful Objects responses through the handler chain
#[derive(Parser)]
#[command(name = "ro-dispatch")]
#[command(about = "Restful Objects response dispatcher")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch captured responses read from JSON files
    Classify {
        /// Files holding one envelope record or an array of them
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print dispatch metrics after the run
        #[arg(long)]
        stats: bool,
    },
    /// Fetch a resource from the server and dispatch the response
    Fetch {
        /// Path relative to fetch.base_url, or an absolute URL
        target: String,

        #[arg(short, long, default_value = "GET")]
        method: HttpMethod,
    },
    /// Print the effective handler order
    Chain,
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.verbose {
        0 => init_default_logging(),
        1 => init_logging(parse_level("DEBUG"), log_format_from_env(), false),
        _ => init_logging(parse_level("TRACE"), log_format_from_env(), true),
    }

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Classify { files, stats } => classify_files(&config, &files, stats),
        Commands::Fetch { target, method } => fetch_and_dispatch(&config, &target, method).await,
        Commands::Chain => print_chain(&config),
        Commands::Config { show } => handle_config_command(&config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn log_format_from_env() -> LogFormat {
    LogFormat::parse(&std::env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()))
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<DispatcherConfig, Box<dyn std::error::Error>> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());
        return Ok(DispatcherConfig::load_from_file(path)?);
    }

    let default_paths = ["ro-dispatch.toml", "config/ro-dispatch.toml"];
    for path_str in default_paths {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            return Ok(DispatcherConfig::load_from_file(&path)?);
        }
    }

    info!("No configuration file found, using defaults");
    Ok(DispatcherConfig::default())
}

fn build_dispatcher(
    config: &DispatcherConfig,
) -> Result<(Dispatcher, UnboundedReceiver<Delivery>), Box<dyn std::error::Error>> {
    let (sink, receiver) = ChannelSink::channel();
    let dispatcher = Dispatcher::from_config(config)?.with_sink(Arc::new(sink));
    Ok((dispatcher, receiver))
}

fn read_records(path: &Path) -> Result<Vec<EnvelopeRecord>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let records = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(records)
}

/// Outcome of one dispatch as printed by the CLI
fn outcome_json(envelope: &ResponseEnvelope, delivery: Option<Delivery>) -> Value {
    let state = envelope.state();
    json!({
        "id": envelope.id(),
        "url": envelope.url(),
        "status": envelope.status(),
        "state": state.label(),
        "handler": state.handler(),
        "diagnostic": state.diagnostic(),
        "representation": delivery.map(|d| d.representation),
    })
}

fn classify_files(
    config: &DispatcherConfig,
    files: &[PathBuf],
    stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (dispatcher, mut receiver) = build_dispatcher(config)?;

    for path in files {
        for record in read_records(path)? {
            let mut envelope = ResponseEnvelope::from(record);
            dispatcher.dispatch(&mut envelope);
            let delivery = receiver.try_recv().ok();
            println!("{}", serde_json::to_string_pretty(&outcome_json(&envelope, delivery))?);
        }
    }

    if stats {
        let snapshot = dispatcher.metrics().snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        println!(
            "Handlers by match frequency: {}",
            dispatcher.metrics().frequency_order().join(", ")
        );
    }

    Ok(())
}

async fn fetch_and_dispatch(
    config: &DispatcherConfig,
    target: &str,
    method: HttpMethod,
) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = HttpFetcher::from_config(config)?;
    let (dispatcher, mut receiver) = build_dispatcher(config)?;

    let mut envelope = fetcher.fetch(method, target).await?;
    dispatcher.dispatch(&mut envelope);

    let delivery = receiver.try_recv().ok();
    println!("{}", serde_json::to_string_pretty(&outcome_json(&envelope, delivery))?);
    Ok(())
}

fn print_chain(config: &DispatcherConfig) -> Result<(), Box<dyn std::error::Error>> {
    let dispatcher = Dispatcher::from_config(config)?;
    for (position, name) in dispatcher.chain().handler_names().iter().enumerate() {
        println!("{:>2}. {}", position + 1, name);
    }
    Ok(())
}

fn handle_config_command(
    config: &DispatcherConfig,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    if show {
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(config)?);
    }

    info!("Configuration validation complete");
    Ok(())
}
