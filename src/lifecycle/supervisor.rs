//! Main reload loop.
//!
//! Consumes reload events and installs the stored settings as the live
//! snapshot. Every event reloads; the supervisor does not consult the
//! activity probe again.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::observability::metrics;
use crate::reload::{ReloadCoordinator, ReloadEvent, ReloadEvents};
use crate::settings::{LiveSettings, SettingsError};

pub struct Supervisor {
    coordinator: Arc<ReloadCoordinator>,
    live: Arc<LiveSettings>,
    events: ReloadEvents,
}

impl Supervisor {
    pub fn new(
        coordinator: Arc<ReloadCoordinator>,
        live: Arc<LiveSettings>,
        events: ReloadEvents,
    ) -> Self {
        Self {
            coordinator,
            live,
            events,
        }
    }

    /// Process reload events until shutdown or until every signaler is gone.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Supervisor started");
        loop {
            let event = tokio::select! {
                event = self.events.recv() => event,
                _ = shutdown.recv() => None,
            };
            let Some(event) = event else {
                break;
            };
            if let Err(e) = self.reload(event).await {
                tracing::error!(
                    trigger = event.as_str(),
                    error = %e,
                    "Reload failed, keeping current settings"
                );
            }
        }
        tracing::info!("Supervisor stopped");
    }

    /// Install the stored settings. On failure the previous snapshot stays.
    ///
    /// The restart flag is cleared before the read. A write that lands
    /// while the read is in flight sets it again, so the flag stays true
    /// whenever the live snapshot may be older than storage.
    pub async fn reload(&self, event: ReloadEvent) -> Result<u64, SettingsError> {
        let restart = self.coordinator.restart_state();
        let was_pending = restart.take();

        match self.coordinator.load().await {
            Ok(settings) => {
                let generation = self.live.replace(settings);
                metrics::record_reload(event.as_str(), true);
                tracing::info!(trigger = event.as_str(), generation, "Settings reloaded");
                Ok(generation)
            }
            Err(e) => {
                if was_pending {
                    restart.set();
                }
                metrics::record_reload(event.as_str(), false);
                Err(e)
            }
        }
    }
}

/// Log the effective settings each time a new generation is installed.
pub async fn announce_changes(live: Arc<LiveSettings>, mut shutdown: broadcast::Receiver<()>) {
    let mut generations = live.subscribe();
    loop {
        let changed = tokio::select! {
            changed = generations.changed() => changed.is_ok(),
            _ = shutdown.recv() => false,
        };
        if !changed {
            break;
        }

        let generation = *generations.borrow_and_update();
        let settings = live.load();
        tracing::info!(
            generation,
            concurrency = settings.app.concurrency,
            message_rate = settings.app.message_rate,
            batch_size = settings.app.batch_size,
            smtp_enabled = settings.smtp.iter().filter(|s| s.enabled).count(),
            messengers_enabled = settings.messengers.iter().filter(|m| m.is_enabled()).count(),
            upload_provider = ?settings.upload.provider,
            "Work loops restarting with new settings"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaigns::CampaignRegistry;
    use crate::reload;
    use crate::settings::{MemoryStore, Settings, SettingsStore, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    /// Store whose reads can be held open until the test releases them.
    struct GatedStore {
        inner: MemoryStore,
        gated: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    impl GatedStore {
        fn seeded() -> Self {
            Self {
                inner: MemoryStore::with_blob(Settings::bootstrap().canonicalize().unwrap()),
                gated: AtomicBool::new(false),
                entered: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl SettingsStore for GatedStore {
        async fn get(&self) -> Result<Vec<u8>, StoreError> {
            let blob = self.inner.get().await?;
            if self.gated.load(Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(blob)
        }

        async fn put(&self, blob: &[u8]) -> Result<(), StoreError> {
            self.inner.put(blob).await
        }
    }

    fn wire(
        store: Arc<dyn SettingsStore>,
        campaigns: CampaignRegistry,
    ) -> (Supervisor, Arc<ReloadCoordinator>, Arc<LiveSettings>) {
        let (signaler, events) = reload::channel();
        let coordinator = Arc::new(ReloadCoordinator::new(store, Arc::new(campaigns), signaler));
        let live = Arc::new(LiveSettings::new(Settings::bootstrap()));
        (
            Supervisor::new(coordinator.clone(), live.clone(), events),
            coordinator,
            live,
        )
    }

    #[tokio::test]
    async fn test_reload_installs_and_clears_flag() {
        let store = Arc::new(MemoryStore::with_blob(
            Settings::bootstrap().canonicalize().unwrap(),
        ));
        let campaigns = CampaignRegistry::new();
        campaigns.start(1, "busy");
        let (supervisor, coordinator, live) = wire(store, campaigns.clone());

        let update = br#"{"app.concurrency":4,"smtp":[{"enabled":true,"host":"mx"}]}"#;
        assert!(coordinator.apply_update(update).await.unwrap().needs_restart);
        assert_eq!(live.load().app.concurrency, 10);

        campaigns.finish(1);
        assert_eq!(supervisor.reload(ReloadEvent::Hangup).await.unwrap(), 1);
        assert_eq!(live.load().app.concurrency, 4);
        assert!(!coordinator.needs_restart());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let (supervisor, coordinator, live) = wire(store.clone(), CampaignRegistry::new());
        coordinator.restart_state().set();

        store.put(b"{broken").await.unwrap();
        assert!(supervisor.reload(ReloadEvent::Requested).await.is_err());
        assert_eq!(live.generation(), 0);
        assert_eq!(*live.load(), Settings::bootstrap());
        assert!(coordinator.needs_restart());
    }

    #[tokio::test]
    async fn test_update_during_reload_read_stays_pending() {
        let store = Arc::new(GatedStore::seeded());
        let campaigns = CampaignRegistry::new();
        let (supervisor, coordinator, live) = wire(store.clone(), campaigns.clone());

        store.gated.store(true, Ordering::SeqCst);
        let reload = tokio::spawn(async move { supervisor.reload(ReloadEvent::Hangup).await });
        store.entered.notified().await;

        // the reload has read the old document; this write lands after it
        store.gated.store(false, Ordering::SeqCst);
        campaigns.start(7, "newsletter");
        let update = br#"{"app.concurrency":4,"smtp":[{"enabled":true,"host":"mx"}]}"#;
        assert!(coordinator.apply_update(update).await.unwrap().needs_restart);

        store.release.notify_one();
        assert_eq!(reload.await.unwrap().unwrap(), 1);
        assert_eq!(live.load().app.concurrency, 10);
        assert!(coordinator.needs_restart());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_consumes_scheduled_reload() {
        let store = Arc::new(MemoryStore::with_blob(
            Settings::bootstrap().canonicalize().unwrap(),
        ));
        let (supervisor, coordinator, live) = wire(store, CampaignRegistry::new());
        let shutdown = crate::lifecycle::Shutdown::new();
        let handle = tokio::spawn(supervisor.run(shutdown.subscribe()));

        let mut generations = live.subscribe();
        let update = br#"{"app.message_rate":50,"smtp":[{"enabled":true,"host":"mx"}]}"#;
        assert!(!coordinator.apply_update(update).await.unwrap().needs_restart);

        generations.changed().await.unwrap();
        assert_eq!(live.load().app.message_rate, 50);

        shutdown.trigger();
        handle.await.unwrap();
    }
}
