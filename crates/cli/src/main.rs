mod config;
mod error;

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use client::McpClient;
use client::demo::{run_calculator_demo, run_data_processor_demo};
use rmcp::{ServerHandler, ServiceExt, transport::stdio};
use server::{CalculatorServer, DataProcessorServer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{Config, ServerKind, Transport};
use error::{Error, Result};

const CONFIG_FILE: &str = "mcp-demo.toml";
const SERVER_LOG_LEVEL: &str = "debug";
const CLIENT_LOG_LEVEL: &str = "info";

#[derive(Parser)]
#[command(name = "mcp-demo")]
#[command(about = "Calculator and data processor MCP servers with a demo client", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log filter, e.g. "info" or "server=debug" (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the calculator on stdio
    Calculator,
    /// Serve the data processor on stdio
    DataProcessor,
    /// Run the demo client against a server
    Client {
        /// Server to run against (defaults to the config file, then calculator)
        #[arg(short, long, value_enum)]
        server: Option<ServerKind>,
        /// Start the server as a child process instead of in-process
        #[arg(long)]
        spawn: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;

    let default_level = match cli.command {
        Commands::Client { .. } => CLIENT_LOG_LEVEL,
        _ => SERVER_LOG_LEVEL,
    };
    init_logging(&log_directive(
        cli.log_level.as_deref(),
        std::env::var("RUST_LOG").ok().as_deref(),
        config.log.level.as_deref(),
        default_level,
    ));
    debug!(config = %cli.config.display(), "configuration loaded");

    match cli.command {
        Commands::Calculator => serve(CalculatorServer::new(), "calculator").await,
        Commands::DataProcessor => serve(DataProcessorServer::seeded()?, "data-processor").await,
        Commands::Client { server, spawn } => {
            let kind = server.unwrap_or(config.client.server);
            let transport = if spawn {
                Transport::Stdio
            } else {
                config.client.transport
            };
            cmd_client(kind, transport, &cli.config, cli.log_level.as_deref()).await
        }
    }
}

/// Pick the log filter: flag, then `RUST_LOG`, then config, then default.
fn log_directive(
    flag: Option<&str>,
    env: Option<&str>,
    config: Option<&str>,
    default: &str,
) -> String {
    [flag, env, config]
        .into_iter()
        .flatten()
        .find(|directive| !directive.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter {directive:?}: {e}; using {CLIENT_LOG_LEVEL}");
        EnvFilter::new(CLIENT_LOG_LEVEL)
    });

    // stdout carries the MCP stream when serving.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
}

async fn serve<S: ServerHandler>(server: S, name: &str) -> Result<()> {
    info!(server = name, "starting MCP server on stdio");

    let service = server
        .serve(stdio())
        .await
        .map_err(|e| Error::Serve(e.to_string()))?;
    service
        .waiting()
        .await
        .map_err(|e| Error::Serve(e.to_string()))?;

    info!(server = name, "server stopped");
    Ok(())
}

async fn cmd_client(
    kind: ServerKind,
    transport: Transport,
    config_path: &Path,
    log_level: Option<&str>,
) -> Result<()> {
    info!(server = kind.subcommand(), ?transport, "starting demo client");

    let client = match transport {
        Transport::InProcess => match kind {
            ServerKind::Calculator => McpClient::in_process(CalculatorServer::new()).await?,
            ServerKind::DataProcessor => {
                McpClient::in_process(DataProcessorServer::seeded()?).await?
            }
        },
        Transport::Stdio => {
            let exe = std::env::current_exe()?;
            McpClient::spawn(
                exe.to_string_lossy(),
                child_args(kind, config_path, log_level),
            )
            .await?
        }
    };

    let mut out = io::stdout();
    let outcome = match kind {
        ServerKind::Calculator => run_calculator_demo(&client, &mut out).await,
        ServerKind::DataProcessor => run_data_processor_demo(&client, &mut out).await,
    };

    client.shutdown().await?;
    outcome?;

    info!("demo complete");
    Ok(())
}

/// Arguments that make a child copy of this binary serve `kind`.
fn child_args(kind: ServerKind, config_path: &Path, log_level: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "--config".to_string(),
        config_path.to_string_lossy().into_owned(),
    ];
    if let Some(level) = log_level {
        args.push("--log-level".to_string());
        args.push(level.to_string());
    }
    args.push(kind.subcommand().to_string());
    args
}
