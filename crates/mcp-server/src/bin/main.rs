//! Sensor MCP server CLI
//!
//! Serves sensor measurements, sensor/account lookups and authentication
//! mail to MCP clients over stdio (default) or HTTP. Logs always go to
//! stderr so they never mix with protocol traffic on stdout.

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mcp_server::{Collaborators, McpServer, ServerMode};
use sensor_core::{
    InMemoryAccountStore, InMemoryMeasurementStore, LoggingMailSender, SeedData, SettingsManager,
};

/// Sensor MCP server - JSON-RPC access to sensor measurements and accounts
#[derive(Parser, Debug)]
#[command(name = "sensor-mcp-server")]
#[command(version)]
#[command(about = "Sensor MCP server - sensor measurements and accounts via MCP")]
struct Args {
    /// Run in stdio mode (for MCP clients that spawn the server)
    #[arg(long, conflicts_with = "http")]
    stdio: bool,

    /// Run in HTTP mode
    #[arg(long)]
    http: bool,

    /// Address to bind in HTTP mode (overrides settings)
    #[arg(long, env = "SENSOR_MCP_HOST")]
    host: Option<IpAddr>,

    /// Port for HTTP mode (overrides settings)
    #[arg(long, env = "SENSOR_MCP_PORT")]
    port: Option<u16>,

    /// Settings file (defaults to settings.json in the platform config dir)
    #[arg(long, env = "SENSOR_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// JSON file with accounts, sensors, alarms and measurements to load
    #[arg(long, env = "SENSOR_MCP_SEED")]
    seed: Option<PathBuf>,

    /// Write the effective settings (including --host/--port) to the settings file and exit
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut settings_manager = match &args.config {
        Some(path) => SettingsManager::from_file(path.clone())?,
        None => SettingsManager::new(&SettingsManager::default_dir()?)?,
    };
    let mut settings = settings_manager.get().clone();
    if let Some(host) = args.host {
        settings.http.host = host.to_string();
    }
    if let Some(port) = args.port {
        settings.http.port = port;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    if args.save_config {
        settings_manager.update(settings).await?;
        info!("Saved settings to {:?}", settings_manager.path());
        return Ok(());
    }

    info!("Using settings from {:?}", settings_manager.path());

    let accounts = Arc::new(InMemoryAccountStore::new());
    let measurements = Arc::new(InMemoryMeasurementStore::new());

    if let Some(path) = &args.seed {
        info!("Loading seed data from {:?}", path);
        let seed = SeedData::load(path)?;
        seed.apply(&accounts, &measurements).await?;
    }

    let mailer = LoggingMailSender::new(settings.mail.from_address.clone())
        .with_failing_delivery(settings.mail.fail_delivery);

    let collaborators = Collaborators {
        measurements,
        accounts,
        mailer: Arc::new(mailer),
    };

    let mode = if args.http {
        let host: IpAddr = settings.http.host.parse()?;
        ServerMode::Http {
            addr: SocketAddr::new(host, settings.http.port),
        }
    } else {
        if !args.stdio {
            // Default to stdio for MCP client compatibility
            info!("No transport selected, using stdio");
        }
        ServerMode::Stdio
    };

    let server = McpServer::build(&settings, &collaborators)
        .await?
        .with_mode(mode);

    server.run().await?;

    Ok(())
}
