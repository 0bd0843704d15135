//! Startup orchestration.
//!
//! Seeds the store on first run, loads the live snapshot and wires the
//! coordinator, HTTP state and supervisor together. Any error here is fatal.

use std::sync::Arc;

use crate::campaigns::CampaignRegistry;
use crate::config::ServiceConfig;
use crate::http::server::AppState;
use crate::lifecycle::supervisor::Supervisor;
use crate::reload::{self, ReloadCoordinator, ReloadSignaler};
use crate::settings::store::ensure_initialized;
use crate::settings::{LiveSettings, SettingsError, SettingsStore};

/// Everything `main` needs to run the service.
pub struct Service {
    pub state: AppState,
    pub supervisor: Supervisor,
    pub signaler: ReloadSignaler,
}

pub async fn build(
    config: &ServiceConfig,
    store: Arc<dyn SettingsStore>,
    campaigns: CampaignRegistry,
) -> Result<Service, SettingsError> {
    if ensure_initialized(store.as_ref()).await? {
        tracing::info!("First run, bootstrap settings written");
    }

    let (signaler, events) = reload::channel();
    let coordinator = Arc::new(ReloadCoordinator::new(
        store,
        Arc::new(campaigns.clone()),
        signaler.clone(),
    ));

    let initial = coordinator.load().await?;
    tracing::info!(
        smtp_servers = initial.smtp.len(),
        upload_provider = ?initial.upload.provider,
        "Settings loaded"
    );
    let live = Arc::new(LiveSettings::new(initial));

    let state = AppState {
        coordinator: coordinator.clone(),
        campaigns,
        live: live.clone(),
        admin: Arc::new(config.admin.clone()),
    };

    Ok(Service {
        state,
        supervisor: Supervisor::new(coordinator, live, events),
        signaler,
    })
}
