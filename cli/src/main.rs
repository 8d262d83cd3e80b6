//! Dispenser service CLI
//!
//! ```sh
//! # Run with default config (~/.config/dispenser-service/config.toml)
//! dispenser-service
//!
//! # Custom config path and port
//! dispenser-service --config /etc/dispenser/config.toml --port 9090
//!
//! # Validate config without starting
//! dispenser-service --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use tapbill::config::{AppConfig, CONFIG_ENV_VAR};
use tapbill::server::{init_tracing, ServerHandle, ServerOptions};

/// Beer tap billing backend.
#[derive(Parser, Debug)]
#[command(
    name = "dispenser-service",
    version,
    about = "REST backend billing beer tap usage by time and flow rate",
    long_about = "Dispenser service: tracks open/close sessions of beer taps and \
                  computes what each tap owes.\n\n\
                  Default config: ~/.config/dispenser-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(tapbill::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.listen_address());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        return ExitCode::SUCCESS;
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    ExitCode::SUCCESS
}
