//! Campaign settings service.
//!
//! # Architecture Overview
//!
//! ```text
//!   PUT /api/settings ──▶ admin handlers ──▶ ReloadCoordinator
//!                                               │  decode → validate →
//!                                               │  canonicalize → store
//!                                               ▼
//!                                        CampaignRegistry (activity probe)
//!                                          busy │        │ idle
//!                                               ▼        ▼
//!                                   restart flag set   ReloadSignaler (500ms)
//!                                                          │
//!   SIGHUP ─────────────────────────────────────────────▶ Supervisor
//!                                                          │
//!                                                          ▼
//!                                                    LiveSettings swap
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use campaign_settings::campaigns::CampaignRegistry;
use campaign_settings::config::load_or_default;
use campaign_settings::http::HttpServer;
use campaign_settings::lifecycle::{self, signals, supervisor, Shutdown};
use campaign_settings::observability::{logging, metrics};
use campaign_settings::settings::store;

#[derive(Parser)]
#[command(name = "campaign-settings")]
#[command(about = "Runtime settings service for the campaign mailer", long_about = None)]
struct Cli {
    /// Service configuration file (TOML).
    #[arg(short, long, env = "CAMPAIGN_SETTINGS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "campaign-settings starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store = ?config.store.backend,
        auth = !config.admin.api_key.is_empty(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = store::open(&config.store);
    let campaigns = CampaignRegistry::new();
    let service = lifecycle::build(&config, store, campaigns).await?;

    let shutdown = Shutdown::new();
    let signaler = service.signaler.clone();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = signals::listen(signaler, signal_shutdown).await {
            tracing::error!(error = %e, "Signal handling unavailable, SIGHUP reloads disabled");
        }
    });
    tokio::spawn(supervisor::announce_changes(
        service.state.live.clone(),
        shutdown.subscribe(),
    ));
    let supervisor_task = tokio::spawn(service.supervisor.run(shutdown.subscribe()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config.listener, service.state);
    server.run(listener, shutdown.clone()).await?;

    shutdown.trigger();
    let _ = supervisor_task.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
