//! Scheduler startup and shutdown coordination.

use crate::error::Result;
use crate::scheduler::UpdateScheduler;
use crate::types::Event;

use super::EpisodeTracker;

impl EpisodeTracker {
    /// Start the background update scheduler
    ///
    /// Does nothing when `scheduler.enabled` is false or the scheduler is
    /// already running.
    pub async fn start_scheduler(&self) -> Result<()> {
        self.ensure_running()?;

        if !self.config.scheduler.enabled {
            tracing::debug!("update scheduler disabled in configuration");
            return Ok(());
        }

        let mut task = self.scheduler_task.lock().await;
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::warn!("update scheduler already running");
            return Ok(());
        }

        let scheduler = UpdateScheduler::new(
            self.clone(),
            &self.config.scheduler,
            self.shutdown_token.child_token(),
        );
        *task = Some(tokio::spawn(scheduler.run()));

        tracing::info!(
            interval_secs = self.config.scheduler.check_interval.as_secs(),
            auto_download = self.config.scheduler.auto_download,
            "update scheduler started"
        );
        Ok(())
    }

    /// Whether shutdown has started
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Gracefully shut down the tracker
    ///
    /// Stops accepting new operations, waits for the scheduler to finish its
    /// current pass and emits [`Event::Shutdown`]. Calling it again is a no-op.
    pub async fn shutdown(&self) -> Result<()> {
        if self.shutdown_token.is_cancelled() {
            return Ok(());
        }
        tracing::info!("Initiating graceful shutdown");

        self.shutdown_token.cancel();

        let handle = self.scheduler_task.lock().await.take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "update scheduler task ended abnormally");
        }

        self.emit_event(Event::Shutdown);
        tracing::info!("Shutdown complete");
        Ok(())
    }
}
