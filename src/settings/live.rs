//! Settings the running process is currently using.
//!
//! Work loops read the snapshot lock-free and watch the generation counter
//! to know when to restart with a new document.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

use crate::settings::document::Settings;

pub struct LiveSettings {
    current: ArcSwap<Settings>,
    generation: watch::Sender<u64>,
}

impl LiveSettings {
    pub fn new(initial: Settings) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            current: ArcSwap::from_pointee(initial),
            generation,
        }
    }

    /// Current snapshot, including secrets.
    pub fn load(&self) -> Arc<Settings> {
        self.current.load_full()
    }

    /// Number of reloads applied since start.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Receiver that changes whenever a new document is installed.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Install a new document and wake the watchers.
    pub fn replace(&self, settings: Settings) -> u64 {
        self.current.store(Arc::new(settings));
        self.generation.send_modify(|g| *g += 1);
        self.generation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replace_notifies() {
        let live = LiveSettings::new(Settings::default());
        let mut rx = live.subscribe();
        assert_eq!(live.generation(), 0);

        let next = Settings::bootstrap();
        assert_eq!(live.replace(next.clone()), 1);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
        assert_eq!(*live.load(), next);
    }
}
