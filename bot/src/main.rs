//! fwbot — operator chat commands for firewalld
//!
//! Loads configuration, connects to the message bus and serves the webhook
//! the chat adapter talks to.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fwbot::config::{self, BusKind, ConfigSource, LogFormat};
use fwbot::{App, Registry};
use fwbot_firewall::{Gateway, Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, source) = config::load_config()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.system.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);
    match config.system.log_format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }

    info!("fwbot starting...");
    match &source {
        ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
        ConfigSource::Defaults(path) => {
            warn!("Config file not found at {}, using defaults", path.display())
        }
    }
    config.validate()?;

    let connection = match config.dbus.bus {
        BusKind::System => zbus::Connection::system().await,
        BusKind::Session => zbus::Connection::session().await,
    }
    .with_context(|| format!("Failed to connect to the {:?} bus", config.dbus.bus))?;
    info!("Connected to the {:?} bus", config.dbus.bus);

    let registry = Registry::builtin();
    info!("Registry initialized with {} commands", registry.command_count());

    let app = Arc::new(App::new(
        config.chat.clone(),
        registry,
        Orchestrator::new(Gateway::new(connection)),
    ));

    fwbot::server::serve(app, &config.server.listen_addr).await
}
