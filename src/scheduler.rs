//! Periodic update checks
//!
//! [`UpdateScheduler`] runs a bulk update check every `check_interval` until its
//! cancellation token fires. With `auto_download` enabled, the best candidate
//! of every discovered episode is downloaded in order.
//!
//! The first pass runs immediately after start. A pass that overruns the
//! interval delays the next one instead of queueing a burst.
//!
//! # Example
//!
//! ```no_run
//! use episode_dl::{EpisodeTracker, config::Config};
//! use episode_dl::scheduler::UpdateScheduler;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let tracker = EpisodeTracker::new(config.clone()).await?;
//!
//! let token = CancellationToken::new();
//! let scheduler = UpdateScheduler::new(tracker, &config.scheduler, token.clone());
//! let handle = tokio::spawn(scheduler.run());
//!
//! token.cancel();
//! handle.await?;
//! # Ok(())
//! # }
//! ```

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::tracker::EpisodeTracker;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Shortest interval the scheduler will tick at
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of one scheduler pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Subscriptions whose check succeeded
    pub checked: usize,
    /// Subscriptions with at least one new candidate
    pub with_updates: usize,
    /// Subscriptions whose check failed
    pub failed: usize,
    /// Episodes downloaded by auto-download
    pub downloaded: usize,
}

/// Background task running bulk update checks on an interval
pub struct UpdateScheduler {
    tracker: EpisodeTracker,
    interval: Duration,
    auto_download: bool,
    token: CancellationToken,
}

impl UpdateScheduler {
    /// Creates a scheduler that stops when `token` is cancelled
    pub fn new(tracker: EpisodeTracker, config: &SchedulerConfig, token: CancellationToken) -> Self {
        Self {
            tracker,
            interval: config.check_interval.max(MIN_INTERVAL),
            auto_download: config.auto_download,
            token,
        }
    }

    /// Runs passes until cancelled
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "update scheduler started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.run_once().await {
                Ok(summary) => info!(
                    checked = summary.checked,
                    with_updates = summary.with_updates,
                    failed = summary.failed,
                    downloaded = summary.downloaded,
                    "scheduled update check finished"
                ),
                Err(Error::ShuttingDown) => break,
                Err(e) => error!(error = %e, "scheduled update check failed"),
            }
        }

        info!("update scheduler shutting down");
    }

    /// Runs a single pass: check every subscription, then auto-download if enabled
    pub async fn run_once(&self) -> Result<PassSummary> {
        let report = self.tracker.discover_all_updates(None, None).await?;

        let mut summary = PassSummary {
            checked: report.updates.len(),
            with_updates: report.subscriptions_with_updates(),
            failed: report.failed.len(),
            downloaded: 0,
        };

        if !self.auto_download {
            return Ok(summary);
        }

        for update in report.updates.iter().filter(|u| !u.candidates.is_empty()) {
            if self.token.is_cancelled() {
                debug!("cancelled during auto-download, stopping pass");
                break;
            }

            match self
                .tracker
                .download_discovered(&update.name, &update.candidates)
                .await
            {
                Ok(count) => summary.downloaded += count,
                Err(e) => warn!(
                    subscription = %update.name,
                    error = %e,
                    "auto-download stopped"
                ),
            }
        }

        Ok(summary)
    }
}
