//! Update discovery
//!
//! From a subscription's watermark two passes are probed: the rest of the
//! current season starting at `(season, episode + 1)`, and the next season
//! starting at `(season + 1, 1)`. Each pass searches episode after episode and
//! stops at the first gap. Same-season results come first.
//!
//! ## Partial failures
//!
//! A probe that fails on every mirror ends its pass like a gap; what was found
//! before it is kept. Discovery as a whole fails only if nothing was found in
//! either pass and at least one probe failed, and then the update-check
//! timestamp is left alone.

use crate::error::{Error, Result};
use crate::search::{EpisodeSearch, build_query};
use crate::store::SubscriptionStore;
use crate::subscription::Subscription;
use crate::types::{Candidate, FailedCheck, SortMode, SubscriptionUpdates, UpdateReport};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Result of one probing pass
#[derive(Debug, Default)]
struct Pass {
    found: Vec<Candidate>,
    error: Option<Error>,
}

/// Discovers newly available episodes for subscriptions
#[derive(Clone)]
pub struct UpdateDiscovery {
    search: Arc<dyn EpisodeSearch>,
    store: Arc<dyn SubscriptionStore>,
}

impl UpdateDiscovery {
    /// Create a discovery engine over a search and a store
    pub fn new(search: Arc<dyn EpisodeSearch>, store: Arc<dyn SubscriptionStore>) -> Self {
        Self { search, store }
    }

    /// Find every newly available episode for `subscription`.
    ///
    /// Touches the update-check timestamp exactly once on success. Does not
    /// persist anything; see [`check_subscription`](Self::check_subscription).
    pub async fn discover_updates(
        &self,
        subscription: &mut Subscription,
        sort: SortMode,
        max_results: usize,
    ) -> Result<Vec<Candidate>> {
        let (season, episode) = subscription.watermark();

        let current = match episode.checked_add(1) {
            Some(first) => self.probe(subscription, season, first, sort, max_results).await,
            None => Pass::default(),
        };
        let next = match season.checked_add(1) {
            Some(next_season) => {
                self.probe(subscription, next_season, 1, sort, max_results)
                    .await
            }
            None => Pass::default(),
        };

        if current.found.is_empty()
            && next.found.is_empty()
            && let Some(error) = current.error.or(next.error)
        {
            return Err(error);
        }

        subscription.touch_update_check();

        let mut found = current.found;
        found.extend(next.found);

        tracing::info!(
            subscription = %subscription.name,
            season,
            episode,
            found = found.len(),
            "update check complete"
        );

        Ok(found)
    }

    /// Probe `season` from `first_episode` until a gap or a failed probe
    async fn probe(
        &self,
        subscription: &Subscription,
        season: u32,
        first_episode: u32,
        sort: SortMode,
        max_results: usize,
    ) -> Pass {
        let mut pass = Pass::default();
        let mut episode = first_episode;

        loop {
            let query = build_query(
                &subscription.name,
                &subscription.search_parameters,
                season,
                episode,
            );

            match self
                .search
                .search(&query, season, episode, sort, max_results)
                .await
            {
                Ok(candidates) if candidates.is_empty() => {
                    tracing::debug!(
                        subscription = %subscription.name,
                        season,
                        episode,
                        "gap, pass finished"
                    );
                    break;
                }
                Ok(candidates) => {
                    tracing::debug!(
                        subscription = %subscription.name,
                        season,
                        episode,
                        found = candidates.len(),
                        "episode available"
                    );
                    pass.found.extend(candidates);
                }
                Err(e) => {
                    tracing::warn!(
                        subscription = %subscription.name,
                        season,
                        episode,
                        error = %e,
                        "probe failed, ending pass"
                    );
                    pass.error = Some(e);
                    break;
                }
            }

            match episode.checked_add(1) {
                Some(next) => episode = next,
                None => break,
            }
        }

        pass
    }

    /// Load a subscription by name, discover its updates and persist the
    /// update-check timestamp.
    ///
    /// Losing the timestamp to a concurrent save is logged and ignored.
    pub async fn check_subscription(
        &self,
        name: &str,
        sort: SortMode,
        max_results: usize,
    ) -> Result<Vec<Candidate>> {
        let mut subscription = self
            .store
            .find_by_name(name)
            .await?
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        self.check_loaded(&mut subscription, sort, max_results)
            .await
    }

    async fn check_loaded(
        &self,
        subscription: &mut Subscription,
        sort: SortMode,
        max_results: usize,
    ) -> Result<Vec<Candidate>> {
        let found = self
            .discover_updates(subscription, sort, max_results)
            .await?;

        match self.store.save(subscription).await {
            Ok(()) => {}
            Err(e @ Error::Conflict { .. }) => {
                tracing::warn!(
                    subscription = %subscription.name,
                    error = %e,
                    "update-check timestamp not saved"
                );
            }
            Err(e) => return Err(e),
        }

        Ok(found)
    }

    /// Check every stored subscription, at most `max_concurrent` at a time
    pub async fn check_all(
        &self,
        sort: SortMode,
        max_results: usize,
        max_concurrent: usize,
    ) -> Result<UpdateReport> {
        let subscriptions = self.store.find_all(None, 0).await?;
        let total = subscriptions.len();

        let results: Vec<(String, Result<Vec<Candidate>>)> = stream::iter(subscriptions)
            .map(|mut subscription| async move {
                let result = self
                    .check_loaded(&mut subscription, sort, max_results)
                    .await;
                (subscription.name, result)
            })
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await;

        let mut report = UpdateReport::default();
        for (name, result) in results {
            match result {
                Ok(candidates) => report.updates.push(SubscriptionUpdates { name, candidates }),
                Err(e) => report.failed.push(FailedCheck {
                    name,
                    error: e.to_string(),
                }),
            }
        }

        tracing::info!(
            checked = total,
            with_updates = report.subscriptions_with_updates(),
            candidates = report.total_candidates(),
            failed = report.failed.len(),
            "bulk update check complete"
        );

        Ok(report)
    }
}
