//! Periodic background refresh.
//!
//! The client core is synchronous, so each tick runs on the blocking pool.
//! Ticks never overlap: the next one is not scheduled until the previous
//! refresh returns, and ticks missed while a slow refresh was running are
//! skipped rather than replayed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running poll loop. Dropping it stops the loop.
pub struct Poller {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Starts polling. The first tick fires immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(period: Duration, tick: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (shutdown, mut stopped) = oneshot::channel::<()>();
        let tick = Arc::new(tick);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    // Also resolves when the sender is dropped.
                    _ = &mut stopped => break,
                    _ = interval.tick() => {
                        let tick = Arc::clone(&tick);
                        if let Err(err) = tokio::task::spawn_blocking(move || tick()).await {
                            tracing::warn!(error = %err, "poll tick failed");
                        }
                    }
                }
            }
            tracing::debug!("poller stopped");
        });

        Self {
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    /// Stops the loop and waits for an in-flight tick to finish.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
