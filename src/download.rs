//! Download-then-persist coordination
//!
//! A download runs three steps in a fixed order: the external download action,
//! the watermark advance, then the save. A failed action leaves the
//! subscription untouched. A failed advance after a successful action is a
//! state-consistency error; the started download is not rolled back.

use crate::command::{CommandRunner, render_template};
use crate::config::LINK_PLACEHOLDER;
use crate::error::{Error, Result};
use crate::store::SubscriptionStore;
use crate::subscription::Subscription;
use std::sync::Arc;

/// Triggers downloads and records them on the subscription
#[derive(Clone)]
pub struct DownloadCoordinator {
    runner: Arc<dyn CommandRunner>,
    store: Arc<dyn SubscriptionStore>,
}

impl DownloadCoordinator {
    /// Create a coordinator over a command runner and a store
    pub fn new(runner: Arc<dyn CommandRunner>, store: Arc<dyn SubscriptionStore>) -> Self {
        Self { runner, store }
    }

    /// Download `(season, episode)` from `link` and advance the watermark to it
    pub async fn download(
        &self,
        subscription: &mut Subscription,
        season: u32,
        episode: u32,
        download_command: &str,
        link: &str,
    ) -> Result<()> {
        self.run_action(subscription, season, episode, download_command, link)
            .await?;

        if !subscription.advance(season, episode) {
            let (current_season, current_episode) = subscription.watermark();
            tracing::error!(
                subscription = %subscription.name,
                season,
                episode,
                current_season,
                current_episode,
                "download started but watermark could not advance"
            );
            return Err(Error::StateConsistency {
                name: subscription.name.clone(),
                season,
                episode,
                current_season,
                current_episode,
            });
        }

        subscription.touch_download();
        self.store.save(subscription).await?;

        tracing::info!(
            subscription = %subscription.name,
            season,
            episode,
            "episode downloaded"
        );

        Ok(())
    }

    /// Re-run the download action for the watermark episode.
    ///
    /// The watermark and timestamps are left as they are.
    pub async fn redownload(
        &self,
        subscription: &Subscription,
        download_command: &str,
        link: &str,
    ) -> Result<()> {
        let (season, episode) = subscription.watermark();
        self.run_action(subscription, season, episode, download_command, link)
            .await?;

        tracing::info!(
            subscription = %subscription.name,
            season,
            episode,
            "episode re-downloaded"
        );

        Ok(())
    }

    async fn run_action(
        &self,
        subscription: &Subscription,
        season: u32,
        episode: u32,
        download_command: &str,
        link: &str,
    ) -> Result<()> {
        let command_line = render_template(download_command, LINK_PLACEHOLDER, link);

        let output = self
            .runner
            .run(&command_line)
            .await
            .map_err(|e| Error::DownloadAction(e.to_string()))?;

        if !output.success {
            let summary = output.failure_summary();
            tracing::warn!(
                subscription = %subscription.name,
                season,
                episode,
                runner = self.runner.name(),
                error = %summary,
                "download action failed"
            );
            return Err(Error::DownloadAction(summary));
        }

        Ok(())
    }
}
