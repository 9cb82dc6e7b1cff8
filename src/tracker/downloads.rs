//! Validated downloads.

use crate::error::{Error, Result};
use crate::subscription::Subscription;
use crate::types::{Candidate, Event};

use super::EpisodeTracker;

impl EpisodeTracker {
    /// Download `(season, episode)` of a subscription from `link`
    ///
    /// The episode must be the next one of the current season or the first of
    /// the next season; anything else is [`Error::InvalidEpisode`] and nothing
    /// runs. Requesting the watermark episode again re-runs the download
    /// action without moving the watermark.
    ///
    /// `command_override` replaces the configured download command template.
    pub async fn download(
        &self,
        name: &str,
        season: u32,
        episode: u32,
        link: &str,
        command_override: Option<&str>,
    ) -> Result<Subscription> {
        self.ensure_running()?;

        let mut subscription = self.get_subscription(name).await?;
        let command = command_override.unwrap_or(&self.config.download.command);

        let result = if episode > 0 && (season, episode) == subscription.watermark() {
            self.downloads
                .redownload(&subscription, command, link)
                .await
        } else if subscription.is_valid_episode_advance(season, episode)
            || subscription.is_valid_season_advance(season, episode)
        {
            self.downloads
                .download(&mut subscription, season, episode, command, link)
                .await
        } else {
            let (current_season, current_episode) = subscription.watermark();
            return Err(Error::InvalidEpisode {
                name: subscription.name,
                season,
                episode,
                current_season,
                current_episode,
            });
        };

        match result {
            Ok(()) => {
                self.emit_event(Event::EpisodeDownloaded {
                    name: subscription.name.clone(),
                    season,
                    episode,
                });
                Ok(subscription)
            }
            Err(e) => {
                self.emit_event(Event::DownloadFailed {
                    name: subscription.name.clone(),
                    season,
                    episode,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Download discovered episodes in order, best candidate first
    ///
    /// `candidates` is expected in discovery order (same season first, each
    /// episode's candidates sorted best first). For every episode the first
    /// candidate is downloaded; episodes the watermark cannot advance to are
    /// skipped. Stops at the first failed download.
    ///
    /// Returns the number of episodes downloaded.
    pub async fn download_discovered(&self, name: &str, candidates: &[Candidate]) -> Result<usize> {
        let mut downloaded = 0;
        let mut last: Option<(u32, u32)> = None;

        for candidate in candidates {
            let key = (candidate.season, candidate.episode);
            if last == Some(key) {
                continue;
            }
            last = Some(key);

            let subscription = self.get_subscription(name).await?;
            if !subscription.is_valid_episode_advance(candidate.season, candidate.episode)
                && !subscription.is_valid_season_advance(candidate.season, candidate.episode)
            {
                tracing::debug!(
                    subscription = %name,
                    season = candidate.season,
                    episode = candidate.episode,
                    "not the next episode, skipping"
                );
                continue;
            }

            self.download(name, candidate.season, candidate.episode, &candidate.link, None)
                .await?;
            downloaded += 1;
        }

        Ok(downloaded)
    }
}
