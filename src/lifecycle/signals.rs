//! OS signal handling.
//!
//! - SIGTERM / Ctrl-C trigger graceful shutdown
//! - SIGHUP asks the supervisor to reload settings right away

use crate::lifecycle::shutdown::Shutdown;
use crate::reload::{ReloadEvent, ReloadSignaler};

/// Translate process signals until shutdown is requested.
#[cfg(unix)]
pub async fn listen(signaler: ReloadSignaler, shutdown: Shutdown) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                tracing::info!("SIGHUP received, reloading settings");
                if !signaler.notify(ReloadEvent::Hangup) {
                    tracing::warn!("Supervisor not running, SIGHUP ignored");
                }
            }
            _ = terminate.recv() => {
                tracing::info!("SIGTERM received, shutting down");
                break;
            }
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("Interrupt received, shutting down");
                break;
            }
        }
    }

    shutdown.trigger();
    Ok(())
}

#[cfg(not(unix))]
pub async fn listen(_signaler: ReloadSignaler, shutdown: Shutdown) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt received, shutting down");
    shutdown.trigger();
    Ok(())
}
