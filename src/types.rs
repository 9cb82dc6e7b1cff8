//! Core types for episode-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::Error;

/// How search results are ordered before being limited
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Largest size first
    Largest,
    /// Smallest size first
    Smallest,
    /// Most recent upload first
    Newest,
    /// Oldest upload first
    Oldest,
    /// Most seeders first
    #[default]
    MostSeeded,
}

impl SortMode {
    /// All sort modes, in the order they are documented
    pub const ALL: [SortMode; 5] = [
        SortMode::Largest,
        SortMode::Smallest,
        SortMode::Newest,
        SortMode::Oldest,
        SortMode::MostSeeded,
    ];

    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Largest => "largest",
            SortMode::Smallest => "smallest",
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
            SortMode::MostSeeded => "mostseeded",
        }
    }

    /// Compare two candidates under this mode.
    ///
    /// Only the sort key is compared, so a stable sort keeps parse order for ties.
    pub fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        match self {
            SortMode::Largest => b.size.cmp(&a.size),
            SortMode::Smallest => a.size.cmp(&b.size),
            SortMode::Newest => b.upload_date.cmp(&a.upload_date),
            SortMode::Oldest => a.upload_date.cmp(&b.upload_date),
            SortMode::MostSeeded => b.seeders.cmp(&a.seeders),
        }
    }

    /// Stable-sort `candidates` by this mode and keep at most `max_results`
    pub fn select(&self, mut candidates: Vec<Candidate>, max_results: usize) -> Vec<Candidate> {
        candidates.sort_by(|a, b| self.compare(a, b));
        candidates.truncate(max_results);
        candidates
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config {
                message: format!(
                    "unknown sort mode '{}' (expected one of: largest, smallest, newest, oldest, mostseeded)",
                    s
                ),
                key: Some("sort".to_string()),
            })
    }
}

/// A discovered, not-yet-downloaded episode item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Release name as listed by the mirror
    pub name: String,
    /// Season this candidate was found for
    pub season: u32,
    /// Episode this candidate was found for
    pub episode: u32,
    /// Number of seeders
    pub seeders: u32,
    /// Number of leechers
    pub leechers: u32,
    /// Size in bytes
    pub size: u64,
    /// Upload date, when the mirror lists one that could be read
    pub upload_date: Option<DateTime<Utc>>,
    /// Opaque download locator (magnet URI or torrent URL)
    pub link: String,
    /// Name of the mirror that produced this candidate
    pub mirror: String,
}

/// Candidates found for one subscription during a bulk update check
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubscriptionUpdates {
    /// Subscription name
    pub name: String,
    /// Newly available candidates, same-season first
    pub candidates: Vec<Candidate>,
}

/// A subscription whose update check failed during a bulk run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailedCheck {
    /// Subscription name
    pub name: String,
    /// Error message
    pub error: String,
}

/// Aggregate result of checking every subscription
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateReport {
    /// Per-subscription results (completion order, not subscription order)
    pub updates: Vec<SubscriptionUpdates>,
    /// Subscriptions whose check failed
    pub failed: Vec<FailedCheck>,
}

impl UpdateReport {
    /// Total number of candidates across all subscriptions
    pub fn total_candidates(&self) -> usize {
        self.updates.iter().map(|u| u.candidates.len()).sum()
    }

    /// Number of subscriptions with at least one new candidate
    pub fn subscriptions_with_updates(&self) -> usize {
        self.updates
            .iter()
            .filter(|u| !u.candidates.is_empty())
            .count()
    }
}

/// Event emitted by the tracker
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A subscription was created
    SubscriptionAdded {
        /// Subscription name
        name: String,
    },

    /// A subscription was removed
    SubscriptionRemoved {
        /// Subscription name
        name: String,
    },

    /// An update check found new candidates
    UpdatesFound {
        /// Subscription name
        name: String,
        /// Number of candidates found
        count: usize,
    },

    /// An update check failed
    UpdateCheckFailed {
        /// Subscription name
        name: String,
        /// Error message
        error: String,
    },

    /// A download was triggered and the watermark advanced
    EpisodeDownloaded {
        /// Subscription name
        name: String,
        /// Season downloaded
        season: u32,
        /// Episode downloaded
        episode: u32,
    },

    /// A download could not be completed
    DownloadFailed {
        /// Subscription name
        name: String,
        /// Season requested
        season: u32,
        /// Episode requested
        episode: u32,
        /// Error message
        error: String,
    },

    /// Tracker is shutting down
    Shutdown,
}
