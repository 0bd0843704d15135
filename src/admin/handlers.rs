use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::campaigns::RunningCampaign;
use crate::http::request::request_id;
use crate::http::response::{ok, ApiError, OkResponse};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::settings::Settings;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub needs_restart: bool,
    pub running_campaigns: usize,
    pub settings_generation: u64,
}

#[derive(Serialize)]
struct RestartNotice {
    needs_restart: bool,
}

/// `GET /api/settings`: stored settings with secrets blanked.
pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OkResponse<Settings>>, ApiError> {
    match state.coordinator.read().await {
        Ok(settings) => {
            metrics::record_settings_read("ok");
            Ok(ok(settings))
        }
        Err(e) => {
            metrics::record_settings_read(e.kind());
            tracing::error!(request_id = %request_id(&headers), error = ?e, "Settings read failed");
            Err(e.into())
        }
    }
}

/// `PUT /api/settings`: replace the settings document.
pub async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request_id = request_id(&headers);

    match state.coordinator.apply_update(&body).await {
        Ok(outcome) if outcome.needs_restart => {
            metrics::record_settings_update("deferred");
            Ok(ok(RestartNotice {
                needs_restart: true,
            })
            .into_response())
        }
        Ok(_) => {
            metrics::record_settings_update("reload_scheduled");
            Ok(ok(true).into_response())
        }
        Err(e) => {
            metrics::record_settings_update(e.kind());
            if e.is_client_error() {
                tracing::warn!(request_id = %request_id, error = %e, "Settings update rejected");
            } else {
                tracing::error!(request_id = %request_id, error = ?e, "Settings update failed");
            }
            Err(e.into())
        }
    }
}

pub async fn get_status(State(state): State<AppState>) -> Json<OkResponse<SystemStatus>> {
    ok(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        needs_restart: state.coordinator.needs_restart(),
        running_campaigns: state.campaigns.count(),
        settings_generation: state.live.generation(),
    })
}

/// `POST /api/admin/reload`: reload after the usual grace delay.
pub async fn reload_app(State(state): State<AppState>) -> Json<OkResponse<bool>> {
    state.coordinator.request_reload();
    ok(true)
}

pub async fn get_running_campaigns(
    State(state): State<AppState>,
) -> Json<OkResponse<Vec<RunningCampaign>>> {
    ok(state.campaigns.running())
}
