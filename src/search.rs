//! Multi-mirror search with fallback
//!
//! Mirrors are tried strictly one at a time in priority order. A transport
//! failure moves on to the next mirror. The first mirror that answers decides
//! the result, even if it lists nothing; only when every mirror fails does the
//! caller see [`Error::AllSourcesUnavailable`].

use crate::config::{MirrorConfig, QUERY_PLACEHOLDER};
use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::types::{Candidate, SortMode};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Searches for candidates of one episode
#[async_trait]
pub trait EpisodeSearch: Send + Sync {
    /// Search for `query`, keep candidates for `season`/`episode`, then sort
    /// by `sort` and keep at most `max_results`
    async fn search(
        &self,
        query: &str,
        season: u32,
        episode: u32,
        sort: SortMode,
        max_results: usize,
    ) -> Result<Vec<Candidate>>;
}

/// Search query for one episode: `"{name} {parameters} S01E02"`, whitespace collapsed
pub fn build_query(name: &str, search_parameters: &str, season: u32, episode: u32) -> String {
    let marker = format!("S{:02}E{:02}", season, episode);
    name.split_whitespace()
        .chain(search_parameters.split_whitespace())
        .chain(std::iter::once(marker.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Substitute the URL-encoded query into a mirror's search URL template
pub fn search_url(template: &str, query: &str) -> String {
    template.replace(QUERY_PLACEHOLDER, &urlencoding::encode(query))
}

/// Fallback orchestrator over the configured mirrors
pub struct MirrorSearch {
    mirrors: Vec<MirrorConfig>,
    fetcher: Arc<dyn PageFetcher>,
}

impl MirrorSearch {
    /// Create an orchestrator over the enabled mirrors, keeping their order
    pub fn new(mirrors: Vec<MirrorConfig>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            mirrors: mirrors.into_iter().filter(|m| m.enabled).collect(),
            fetcher,
        }
    }

    /// Mirrors in the order they are tried
    pub fn mirrors(&self) -> &[MirrorConfig] {
        &self.mirrors
    }
}

#[async_trait]
impl EpisodeSearch for MirrorSearch {
    async fn search(
        &self,
        query: &str,
        season: u32,
        episode: u32,
        sort: SortMode,
        max_results: usize,
    ) -> Result<Vec<Candidate>> {
        let now = Utc::now();
        let mut failures = Vec::with_capacity(self.mirrors.len());

        for mirror in &self.mirrors {
            let url = search_url(&mirror.search_url, query);

            let body = match self.fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(
                        mirror = %mirror.name,
                        query,
                        error = %e,
                        "mirror unavailable, trying next"
                    );
                    failures.push(format!("{}: {}", mirror.name, e));
                    continue;
                }
            };

            let mut candidates = match mirror.parser.parse(&body, season, episode, now) {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!(
                        mirror = %mirror.name,
                        query,
                        error = %e,
                        "could not parse result page, treating as empty"
                    );
                    Vec::new()
                }
            };

            for candidate in &mut candidates {
                candidate.mirror.clone_from(&mirror.name);
            }

            tracing::debug!(
                mirror = %mirror.name,
                query,
                found = candidates.len(),
                "search answered"
            );

            return Ok(sort.select(candidates, max_results));
        }

        Err(Error::AllSourcesUnavailable { failures })
    }
}
