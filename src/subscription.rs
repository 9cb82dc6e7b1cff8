//! Subscription entity and its season/episode state machine.
//!
//! The `(last_season, last_episode)` watermark is private and only moves through
//! [`Subscription::advance`]. Every other legal-transition query is a pure check
//! that callers use to reject bad input before doing any work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked show and the highest episode already accounted for
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Subscription {
    /// Database row ID
    pub id: i64,
    /// Unique name, also used as the base of search queries
    pub name: String,
    /// Free-text query augment appended to every search (e.g. "720p")
    pub search_parameters: String,
    last_season: u32,
    last_episode: u32,
    /// When the subscription was created
    pub created_at: DateTime<Utc>,
    /// When the subscription was last saved
    pub modified_at: DateTime<Utc>,
    /// When a download was last triggered
    pub last_download_at: Option<DateTime<Utc>>,
    /// When an update check last completed
    pub last_update_check_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency version, bumped by every save
    pub version: i64,
}

/// Data needed to create a subscription
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewSubscription {
    /// Unique name
    pub name: String,
    /// Free-text query augment
    #[serde(default)]
    pub search_parameters: String,
    /// Starting season (default 1)
    #[serde(default = "default_season")]
    pub last_season: u32,
    /// Starting episode; 0 means nothing watched yet (default 0)
    #[serde(default)]
    pub last_episode: u32,
}

fn default_season() -> u32 {
    1
}

impl NewSubscription {
    /// Subscription starting before the first episode of season one
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            search_parameters: String::new(),
            last_season: 1,
            last_episode: 0,
        }
    }
}

impl Subscription {
    /// Rebuild a subscription from stored fields.
    ///
    /// Only the persistence layer should need this; it bypasses the state machine.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: i64,
        name: String,
        search_parameters: String,
        last_season: u32,
        last_episode: u32,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
        last_download_at: Option<DateTime<Utc>>,
        last_update_check_at: Option<DateTime<Utc>>,
        version: i64,
    ) -> Self {
        Self {
            id,
            name,
            search_parameters,
            last_season,
            last_episode,
            created_at,
            modified_at,
            last_download_at,
            last_update_check_at,
            version,
        }
    }

    /// Season of the watermark
    pub fn last_season(&self) -> u32 {
        self.last_season
    }

    /// Episode of the watermark (0 = nothing downloaded in this season yet)
    pub fn last_episode(&self) -> u32 {
        self.last_episode
    }

    /// `(season, episode)` watermark
    pub fn watermark(&self) -> (u32, u32) {
        (self.last_season, self.last_episode)
    }

    /// True only for the next episode of the current season
    pub fn is_valid_episode_advance(&self, season: u32, episode: u32) -> bool {
        season == self.last_season && Some(episode) == self.last_episode.checked_add(1)
    }

    /// True only for the first episode of the next season
    pub fn is_valid_season_advance(&self, season: u32, episode: u32) -> bool {
        Some(season) == self.last_season.checked_add(1) && episode == 1
    }

    /// Move the watermark to `(season, episode)` if that is a legal step.
    ///
    /// Returns `false` and leaves the watermark alone otherwise.
    #[must_use]
    pub fn advance(&mut self, season: u32, episode: u32) -> bool {
        if self.is_valid_episode_advance(season, episode)
            || self.is_valid_season_advance(season, episode)
        {
            self.last_season = season;
            self.last_episode = episode;
            true
        } else {
            false
        }
    }

    /// True for the watermark itself or the next episode of the same season.
    ///
    /// Lets callers re-trigger the episode that was just downloaded.
    pub fn is_current_or_next_episode(&self, season: u32, episode: u32) -> bool {
        (season, episode) == self.watermark() || self.is_valid_episode_advance(season, episode)
    }

    /// Record that an update check completed now
    pub fn touch_update_check(&mut self) {
        self.last_update_check_at = Some(Utc::now());
    }

    /// Record that a download was triggered now
    pub(crate) fn touch_download(&mut self) {
        self.last_download_at = Some(Utc::now());
    }
}
