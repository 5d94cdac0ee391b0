//! Rocket Casino binary
//!
//! Loads configuration, opens the ledger, serves the status API and reads
//! player commands from stdin.

mod console;

use clap::{Parser, Subcommand};
use rocket_casino::{
    api::{StatusServer, StatusServerConfig},
    config::generate_sample_config,
    Casino, CasinoConfig, ConfigLoader, JsonLedger,
};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};

/// Rocket Casino CLI
#[derive(Parser)]
#[command(name = "rocket-casino")]
#[command(about = "Chat economy and gambling engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Ledger file, overriding the configuration
    #[arg(short, long)]
    ledger: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the status API and read player commands from stdin (default)
    Run {
        /// Status API port
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not start the status API
        #[arg(long)]
        no_status: bool,
    },

    /// Write a sample configuration file
    GenerateConfig {
        #[arg(default_value = "rocket-casino.toml")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;
    if let Some(ledger) = cli.ledger {
        config.storage.ledger_path = ledger;
    }

    match cli.command.unwrap_or(Commands::Run {
        port: None,
        no_status: false,
    }) {
        Commands::Run { port, no_status } => {
            if let Some(port) = port {
                config.status.port = port;
            }
            if no_status {
                config.status.enabled = false;
            }
            loader.validate(&config)?;
            run(config).await
        }
        Commands::GenerateConfig { path } => {
            generate_sample_config(&path)?;
            println!("Sample configuration written to {}", path);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "rocket_casino=debug,tower_http=debug"
    } else {
        "rocket_casino=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

async fn run(config: CasinoConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Rocket Casino v{}", env!("CARGO_PKG_VERSION"));
    info!("   Ledger: {}", config.storage.ledger_path);
    info!("   Blackjack action timeout: {}s", config.blackjack.action_timeout_secs);

    let ledger = JsonLedger::open(&config.storage.ledger_path, config.economy.starting_cash).await?;
    let status = config.status.clone();
    let casino = Arc::new(Casino::new(Arc::new(ledger), config)?);

    if status.enabled {
        let server = StatusServer::new(StatusServerConfig::from(&status), casino.clone());
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("Status server failed: {}", e);
            }
        });
    } else {
        info!("Status API disabled");
    }

    console::Console::new(casino).run().await?;
    info!("Input closed, shutting down");
    Ok(())
}
