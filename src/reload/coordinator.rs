//! Settings update and reload coordination.
//!
//! # States
//! - Idle: live settings match storage, or a reload is on its way
//! - RestartPending: settings were written while protected work was
//!   running; the live process is stale until the next reload
//!
//! # State Transitions
//! ```text
//! Idle → Idle:           update stored, no protected activity → reload scheduled
//! Idle → RestartPending: update stored, protected activity running
//! RestartPending → RestartPending: further updates while activity continues
//! any → unchanged:       decode, validation, encode or storage failure
//! ```
//!
//! Only the supervisor clears RestartPending, right before it reads the
//! stored settings to reload. A failed reload restores it.
//!
//! Persisting and probing for activity are not atomic. A campaign may start
//! right after the probe says "idle" and get interrupted by the reload, or
//! finish right after it says "busy" and leave the restart deferred.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::observability::metrics;
use crate::reload::signaler::{ReloadEvent, ReloadSignaler};
use crate::settings::document::Settings;
use crate::settings::error::SettingsError;
use crate::settings::store::SettingsStore;
use crate::settings::validation::validate;

/// Answers whether work that must not be interrupted is in progress.
///
/// Implementations must be fast and non-blocking; the answer is a snapshot.
pub trait ActivityProbe: Send + Sync {
    fn has_protected_activity(&self) -> bool;
}

/// Process-wide "restart needed" flag.
#[derive(Debug, Default)]
pub struct RestartState {
    needs_restart: Mutex<bool>,
}

impl RestartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        *self.needs_restart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self) {
        *self.needs_restart.lock().unwrap_or_else(PoisonError::into_inner) = true;
        metrics::set_restart_pending(true);
    }

    /// Clear the flag and return its previous value.
    ///
    /// Called before the process reads the stored settings, so a write that
    /// lands during the read sets the flag again and is not lost.
    pub(crate) fn take(&self) -> bool {
        let mut pending = self.needs_restart.lock().unwrap_or_else(PoisonError::into_inner);
        let was = std::mem::replace(&mut *pending, false);
        metrics::set_restart_pending(false);
        was
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    RestartPending,
}

/// Result of a successful update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub needs_restart: bool,
}

/// Validates, persists and decides how new settings take effect.
pub struct ReloadCoordinator {
    store: Arc<dyn SettingsStore>,
    probe: Arc<dyn ActivityProbe>,
    signaler: ReloadSignaler,
    restart: RestartState,
}

impl ReloadCoordinator {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        probe: Arc<dyn ActivityProbe>,
        signaler: ReloadSignaler,
    ) -> Self {
        Self {
            store,
            probe,
            signaler,
            restart: RestartState::new(),
        }
    }

    /// Stored settings with secrets blanked, for external callers.
    pub async fn read(&self) -> Result<Settings, SettingsError> {
        Ok(self.load().await?.sanitized())
    }

    /// Stored settings including secrets, for the process itself.
    pub async fn load(&self) -> Result<Settings, SettingsError> {
        let blob = self.store.get().await.map_err(SettingsError::Fetch)?;
        Settings::decode(&blob).map_err(SettingsError::Corrupt)
    }

    /// Replace the stored settings with `candidate` and arrange for them
    /// to take effect.
    pub async fn apply_update(&self, candidate: &[u8]) -> Result<UpdateOutcome, SettingsError> {
        let settings = Settings::decode(candidate).map_err(SettingsError::Parse)?;
        validate(&settings)?;
        let canonical = settings.canonicalize().map_err(SettingsError::Encode)?;
        self.store
            .put(&canonical)
            .await
            .map_err(SettingsError::Update)?;

        tracing::info!(
            bytes = canonical.len(),
            smtp_servers = settings.smtp.len(),
            messengers = settings.messengers.len(),
            "Settings updated"
        );

        if self.probe.has_protected_activity() {
            self.restart.set();
            tracing::warn!("Protected activity running, reload deferred until restart");
            return Ok(UpdateOutcome { needs_restart: true });
        }

        self.signaler.schedule_reload(ReloadEvent::SettingsUpdated);
        Ok(UpdateOutcome {
            needs_restart: false,
        })
    }

    /// Schedule a reload on operator request.
    pub fn request_reload(&self) {
        self.signaler.schedule_reload(ReloadEvent::Requested);
    }

    pub fn needs_restart(&self) -> bool {
        self.restart.get()
    }

    pub fn state(&self) -> CoordinatorState {
        if self.restart.get() {
            CoordinatorState::RestartPending
        } else {
            CoordinatorState::Idle
        }
    }

    pub fn restart_state(&self) -> &RestartState {
        &self.restart
    }
}
