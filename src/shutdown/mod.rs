//! Cooperative shutdown on SIGINT and SIGTERM
//!
//! A signal never stops the process directly. It cancels the run's token and
//! the controller stops at its next checkpoint.

use tokio_util::sync::CancellationToken;

/// Cancels `cancel` on the first SIGINT or SIGTERM
///
/// The handlers are registered before this returns, so a signal arriving at
/// any later point (including while the run config is still being read) only
/// cancels the token. Must be called from within a tokio runtime.
#[cfg(unix)]
pub fn cancel_on_signal(cancel: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    // Signal registration may fail in restricted environments
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::spawn(async move {
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM signal");
                    }
                    _ = sigint.recv() => {
                        tracing::info!("Received SIGINT signal (Ctrl+C)");
                    }
                }
                request_stop(&cancel);
            });
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    request_stop(&cancel);
                }
            });
        }
    }
}

/// Cancels `cancel` on the first Ctrl+C
#[cfg(not(unix))]
pub fn cancel_on_signal(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C signal");
                request_stop(&cancel);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            }
        }
    });
}

fn request_stop(cancel: &CancellationToken) {
    tracing::info!("Stopping at the next checkpoint");
    cancel.cancel();
}
