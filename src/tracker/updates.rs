//! Update checks.

use crate::error::Result;
use crate::types::{Candidate, Event, SortMode, UpdateReport};

use super::EpisodeTracker;

impl EpisodeTracker {
    /// Find newly available episodes for one subscription
    ///
    /// `sort` and `max_results` fall back to the configured discovery defaults.
    /// The update-check timestamp is persisted when the check succeeds.
    pub async fn discover_updates(
        &self,
        name: &str,
        sort: Option<SortMode>,
        max_results: Option<usize>,
    ) -> Result<Vec<Candidate>> {
        self.ensure_running()?;

        let sort = sort.unwrap_or(self.config.discovery.default_sort);
        let max_results = max_results.unwrap_or(self.config.discovery.default_max_results);

        match self
            .discovery
            .check_subscription(name, sort, max_results)
            .await
        {
            Ok(candidates) => {
                if !candidates.is_empty() {
                    self.emit_event(Event::UpdatesFound {
                        name: name.to_string(),
                        count: candidates.len(),
                    });
                }
                Ok(candidates)
            }
            Err(e) => {
                self.emit_event(Event::UpdateCheckFailed {
                    name: name.to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Check every subscription, bounded by `discovery.max_concurrent_checks`
    pub async fn discover_all_updates(
        &self,
        sort: Option<SortMode>,
        max_results: Option<usize>,
    ) -> Result<UpdateReport> {
        self.ensure_running()?;

        let discovery = &self.config.discovery;
        let report = self
            .discovery
            .check_all(
                sort.unwrap_or(discovery.default_sort),
                max_results.unwrap_or(discovery.default_max_results),
                discovery.max_concurrent_checks,
            )
            .await?;

        for update in report.updates.iter().filter(|u| !u.candidates.is_empty()) {
            self.emit_event(Event::UpdatesFound {
                name: update.name.clone(),
                count: update.candidates.len(),
            });
        }
        for failed in &report.failed {
            self.emit_event(Event::UpdateCheckFailed {
                name: failed.name.clone(),
                error: failed.error.clone(),
            });
        }

        Ok(report)
    }
}
