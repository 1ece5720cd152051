use crate::app_config::AppConfig;
use crate::extensions::date_time_ext::ToIso8601;
use crate::steve::SteveServer;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

mod app_config;
mod extensions;
mod firmware_host;
mod orchestrator;
mod steve;

#[derive(Parser)]
#[command(name = "steve-ota")]
#[command(about = "Host charger firmware and roll it out over the air through SteVe", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the firmware directory over plain HTTP
    Serve {
        /// Directory to serve, overrides host.directory
        #[arg(long)]
        directory: Option<PathBuf>,

        /// Port to listen on, overrides host.port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Upload firmware to SteVe, schedule the update and check its status
    Update {
        /// Firmware to upload, overrides firmware.path
        #[arg(long)]
        firmware: Option<PathBuf>,

        /// Charge box to update, overrides charger.id
        #[arg(long)]
        charge_box_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let cli = Cli::parse();
    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Unable to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("✅  Loaded configuration");

    match cli.command {
        Commands::Serve { directory, port } => {
            config.override_host(directory, port);
            if let Err(e) = firmware_host::serve(config.host().directory(), config.host().port()).await {
                error!("❌ Firmware host stopped: {}", e);
                return ExitCode::FAILURE;
            }
        }
        Commands::Update { firmware, charge_box_id } => {
            config.override_firmware_path(firmware);
            config.override_charger_id(charge_box_id);

            let config = Arc::new(config);
            let client = match steve::new_client(&config) {
                Ok(client) => client,
                Err(e) => {
                    error!("❌ Unable to create the SteVe client: {}", e);
                    return ExitCode::FAILURE;
                }
            };

            let server = SteveServer::new(client, config.clone());
            match orchestrator::run_update(&server, &config).await {
                Ok(report) => info!(
                    firmware_url = %report.firmware_url,
                    retrieve_date = %report.retrieve_date.to_iso8601(),
                    status = report.status.as_deref().unwrap_or("unknown"),
                    "🏁 Update of '{}' scheduled",
                    config.charger().id()
                ),
                // Each step logs its own failure
                Err(_) => return ExitCode::FAILURE,
            }
        }
    }

    ExitCode::SUCCESS
}
