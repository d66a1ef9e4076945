//! Reserva CLI server
//!
//! Headless reservation API suitable for a systemd unit, a container or a
//! plain process.
//!
//! ```sh
//! # Default config (~/.config/reserva/config.toml, created on first run)
//! reserva-service
//!
//! # Custom config path
//! reserva-service --config /etc/reserva/config.toml
//!
//! # Override the port
//! reserva-service --api-port 8081
//!
//! # Validate config without starting
//! reserva-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use reserva::config::AppConfig;
use reserva::server::{init_tracing, ServerHandle, ServerOptions};

/// Reserva, a multi-tenant reservation server for restaurants and lodgings.
#[derive(Parser, Debug)]
#[command(
    name = "reserva-service",
    version,
    about = "Reservation API for tables and rooms",
    long_about = "Reserva REST API + WebSocket notifications for booking \
                  restaurant tables and lodging rooms without double-booking.\n\n\
                  Default config: ~/.config/reserva/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "RESERVA_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(reserva::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) if cli.check => {
            eprintln!("❌ Invalid configuration in {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            AppConfig::default()
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        info!("CLI override: log_level = {}", level);
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("✅ Configuration is valid");
        println!("   Config file      : {}", config_path.display());
        println!("   API address      : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Database         : {}", config.database.connection_url());
        println!("   Log level        : {}", config.logging.level);
        println!("   Require approval : {}", config.reservations.require_approval);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
