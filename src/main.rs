//! Doris webhook
//!
//! Accepts JSON events over HTTP and writes each one into an Apache Doris
//! table through the Stream Load API of a backend node.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                 DORIS WEBHOOK                 │
//!                        │                                               │
//!   POST /video          │  ┌────────┐    ┌──────────┐    ┌───────────┐  │
//!   ─────────────────────┼─▶│  http  │───▶│ pipeline │───▶│stream_load│──┼──▶ Doris BE
//!                        │  │ server │    │  handler │    │  client   │  │    _stream_load
//!   JSON response        │  └────────┘    └──────────┘    └───────────┘  │
//!   ◀────────────────────┼──────────────────────────────────────────────  │
//!                        │                                               │
//!                        │  config · observability · security · lifecycle│
//!                        └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use doris_webhook::config::{load_config, validate_config, ObservabilityConfig, ServiceConfig};
use doris_webhook::observability::{logging, metrics};
use doris_webhook::{HttpServer, Shutdown, StreamLoadClient};

#[derive(Parser, Debug)]
#[command(name = "doris-webhook", version, about = "HTTP to Doris Stream Load bridge")]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "DORIS_WEBHOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen address (host:port).
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            if logging::init_logging(&ObservabilityConfig::default()).is_ok() {
                tracing::error!(error = %e, "Failed to load configuration");
            } else {
                eprintln!("failed to load configuration: {}", e);
            }
            return ExitCode::FAILURE;
        }
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(error = %error, "Invalid configuration");
        }
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        be_http = %config.doris.be_http,
        database = %config.doris.database,
        table = %config.doris.table,
        user = %config.doris.user,
        password = %config.doris.password.masked(),
        debug = config.observability.debug,
        "doris-webhook starting"
    );

    let loader = StreamLoadClient::new(&config.doris, &config.load_client, config.observability.debug)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, Arc::new(loader))?;

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
