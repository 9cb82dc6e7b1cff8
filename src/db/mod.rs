//! Database layer for episode-dl
//!
//! Handles SQLite persistence for subscriptions.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`subscriptions`] - Subscription CRUD and the [`SubscriptionStore`](crate::store::SubscriptionStore) impl

use crate::error::DatabaseError;
use crate::subscription::Subscription;
use crate::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{FromRow, sqlite::SqlitePool};

mod migrations;
mod subscriptions;

/// Subscription record from database (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    /// Unique database ID
    pub id: i64,
    /// Unique subscription name
    pub name: String,
    /// Free-text query augment
    pub search_parameters: String,
    /// Watermark season
    pub last_season: i64,
    /// Watermark episode
    pub last_episode: i64,
    /// Unix timestamp when the subscription was created
    pub created_at: i64,
    /// Unix timestamp of the last save
    pub modified_at: i64,
    /// Unix timestamp of the last triggered download
    pub last_download_at: Option<i64>,
    /// Unix timestamp of the last completed update check
    pub last_update_check_at: Option<i64>,
    /// Optimistic-concurrency version
    pub version: i64,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = Error;

    fn try_from(row: SubscriptionRow) -> Result<Self> {
        let watermark = |value: i64, column: &str| {
            u32::try_from(value).map_err(|_| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "subscription '{}' has out-of-range {}: {}",
                    row.name, column, value
                )))
            })
        };
        let last_season = watermark(row.last_season, "last_season")?;
        let last_episode = watermark(row.last_episode, "last_episode")?;

        Ok(Subscription::from_parts(
            row.id,
            row.name,
            row.search_parameters,
            last_season,
            last_episode,
            from_unix(row.created_at),
            from_unix(row.modified_at),
            row.last_download_at.map(from_unix),
            row.last_update_check_at.map(from_unix),
            row.version,
        ))
    }
}

pub(crate) fn from_unix(timestamp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Database handle for episode-dl
pub struct Database {
    pool: SqlitePool,
}
