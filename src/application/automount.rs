//! Periodic automount.
//!
//! Re-runs a mount tick on a fixed period until a shutdown token fires.
//! SIGINT and SIGTERM are forwarded to the token so a service stop ends the
//! loop between ticks.

use std::time::Duration;

use tokio::sync::watch;

use crate::domain::{AppError, Result};

/// Cancels every token created from the same channel.
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes cancellation.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Never resolves if the handle is dropped
    /// without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Create a connected handle and token.
#[must_use]
pub fn shutdown_channel() -> (ShutdownHandle, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx }, ShutdownToken { rx })
}

/// Fixed-period task loop.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTask {
    period: Duration,
}

impl PeriodicTask {
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Run `tick` immediately, then once per period, until `token` is
    /// cancelled. Returns the number of completed ticks.
    ///
    /// # Errors
    /// Returns the first error of `tick`; the loop stops there.
    pub async fn run<F>(&self, mut token: ShutdownToken, mut tick: F) -> Result<u64>
    where
        F: FnMut() -> Result<()>,
    {
        tracing::info!(period_secs = self.period.as_secs(), "Automount started");
        let mut ticks: u64 = 0;

        loop {
            if token.is_cancelled() {
                break;
            }

            if let Err(e) = tick() {
                tracing::warn!(ticks, "Automount tick failed");
                return Err(e);
            }
            ticks += 1;
            tracing::debug!(ticks, "Automount tick done");

            tokio::select! {
                () = tokio::time::sleep(self.period) => {}
                () = token.cancelled() => break,
            }
        }

        tracing::info!(ticks, "Automount stopped");
        Ok(ticks)
    }
}

/// Cancel `handle` on Ctrl+C or SIGTERM.
///
/// # Errors
/// Returns error if the signal handlers cannot be installed.
pub async fn cancel_on_signal(handle: ShutdownHandle) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())
        .map_err(|e| AppError::io("Failed to listen for SIGTERM", e))?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| AppError::io("Failed to listen for Ctrl+C", e))?;
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate.recv() => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }

    handle.cancel();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_third_tick() {
        let (handle, token) = shutdown_channel();
        let mut seen = 0;

        let ticks = PeriodicTask::new(Duration::from_secs(60))
            .run(token, || {
                seen += 1;
                if seen == 3 {
                    handle.cancel();
                }
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_error_stops_loop() {
        let (_handle, token) = shutdown_channel();
        let mut seen = 0;

        let result = PeriodicTask::new(Duration::from_secs(1))
            .run(token, || {
                seen += 1;
                if seen == 2 {
                    Err(AppError::aborted("mount failed"))
                } else {
                    Ok(())
                }
            })
            .await;

        assert!(matches!(result, Err(AppError::Aborted { .. })));
        assert_eq!(seen, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let (handle, token) = shutdown_channel();
        handle.cancel();

        let ticks = PeriodicTask::new(Duration::from_secs(60))
            .run(token, || -> Result<()> { panic!("tick must not run") })
            .await
            .unwrap();

        assert_eq!(ticks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_between_ticks() {
        let (handle, token) = shutdown_channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(150)).await;
            handle.cancel();
        });

        let started = tokio::time::Instant::now();
        let ticks = PeriodicTask::new(Duration::from_secs(60))
            .run(token, || Ok(()))
            .await
            .unwrap();

        // Ticks at 0s, 60s and 120s; cancelled while sleeping towards 180s.
        assert_eq!(ticks, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(150));
    }
}
