//! Deferred self-reload notifications.
//!
//! A reload is an in-process event delivered to the supervisor over a
//! channel, standing in for the process sending itself `SIGHUP`.
//!
//! # Design Decisions
//! - `schedule_reload` spawns a detached task and returns at once
//! - The task sleeps for the grace interval so the HTTP response that
//!   announced the change is flushed before work loops restart
//! - Scheduled reloads are never cancelled, joined or retried; two updates
//!   inside one grace interval produce two reloads

use std::time::Duration;

use tokio::sync::mpsc;

use crate::observability::metrics;

/// Delay between scheduling a reload and delivering it.
pub const RELOAD_GRACE: Duration = Duration::from_millis(500);

/// Why the supervisor is being asked to reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    /// Settings were written while nothing protected was running.
    SettingsUpdated,
    /// An operator asked for a reload through the admin API.
    Requested,
    /// The process received `SIGHUP`.
    Hangup,
}

impl ReloadEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadEvent::SettingsUpdated => "settings_updated",
            ReloadEvent::Requested => "requested",
            ReloadEvent::Hangup => "hangup",
        }
    }
}

/// Receiving half consumed by the supervisor.
pub type ReloadEvents = mpsc::UnboundedReceiver<ReloadEvent>;

/// Create a signaler and the event stream it feeds.
pub fn channel() -> (ReloadSignaler, ReloadEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ReloadSignaler { tx }, rx)
}

/// Sends reload events to the supervisor.
#[derive(Debug, Clone)]
pub struct ReloadSignaler {
    tx: mpsc::UnboundedSender<ReloadEvent>,
}

impl ReloadSignaler {
    /// Deliver `event` after [`RELOAD_GRACE`] from a detached task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule_reload(&self, event: ReloadEvent) {
        let tx = self.tx.clone();
        metrics::record_reload_scheduled(event.as_str());
        tracing::info!(reason = event.as_str(), delay = ?RELOAD_GRACE, "Reload scheduled");

        tokio::spawn(async move {
            tokio::time::sleep(RELOAD_GRACE).await;
            if tx.send(event).is_err() {
                tracing::warn!(reason = event.as_str(), "Supervisor gone, reload dropped");
            }
        });
    }

    /// Deliver `event` immediately.
    pub fn notify(&self, event: ReloadEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_grace() {
        let (signaler, mut events) = channel();
        signaler.schedule_reload(ReloadEvent::SettingsUpdated);

        tokio::time::sleep(RELOAD_GRACE - Duration::from_millis(1)).await;
        assert!(events.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(events.try_recv().unwrap(), ReloadEvent::SettingsUpdated);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_schedules_both_fire() {
        let (signaler, mut events) = channel();
        signaler.schedule_reload(ReloadEvent::SettingsUpdated);
        tokio::time::sleep(Duration::from_millis(100)).await;
        signaler.schedule_reload(ReloadEvent::Requested);

        tokio::time::sleep(RELOAD_GRACE).await;
        assert_eq!(events.recv().await, Some(ReloadEvent::SettingsUpdated));
        assert_eq!(events.recv().await, Some(ReloadEvent::Requested));
    }

    #[tokio::test]
    async fn test_notify_after_receiver_dropped() {
        let (signaler, events) = channel();
        assert!(signaler.notify(ReloadEvent::Hangup));
        drop(events);
        assert!(!signaler.notify(ReloadEvent::Hangup));
    }
}
