//! Subscription CRUD operations.

use crate::error::DatabaseError;
use crate::store::SubscriptionStore;
use crate::subscription::{NewSubscription, Subscription};
use crate::{Error, Result};
use async_trait::async_trait;

use super::{Database, SubscriptionRow, from_unix};

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, search_parameters, last_season, last_episode, created_at,
           modified_at, last_download_at, last_update_check_at, version
    FROM subscriptions
"#;

impl Database {
    /// Get a subscription by name
    pub async fn get_subscription(&self, name: &str) -> Result<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!("{} WHERE name = ?", SELECT_COLUMNS))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to get subscription: {}",
                    e
                )))
            })?;

        row.map(Subscription::try_from).transpose()
    }

    /// List subscriptions ordered by name
    ///
    /// `limit` of `None` returns every row after `offset`.
    pub async fn list_subscriptions(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Subscription>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "{} ORDER BY name ASC LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list subscriptions: {}",
                e
            )))
        })?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    /// Insert a new subscription
    pub async fn insert_subscription(&self, new: &NewSubscription) -> Result<Subscription> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (name, search_parameters, last_season, last_episode,
                                       created_at, modified_at, version)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&new.name)
        .bind(&new.search_parameters)
        .bind(i64::from(new.last_season))
        .bind(i64::from(new.last_episode))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Error::Duplicate(new.name.clone())
            }
            e => Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert subscription: {}",
                e
            ))),
        })?;

        Ok(Subscription::from_parts(
            result.last_insert_rowid(),
            new.name.clone(),
            new.search_parameters.clone(),
            new.last_season,
            new.last_episode,
            from_unix(now),
            from_unix(now),
            None,
            None,
            0,
        ))
    }

    /// Write a subscription back if nobody else saved it since it was read
    ///
    /// Bumps `version` and refreshes `modified_at` on success.
    pub async fn update_subscription(&self, subscription: &mut Subscription) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET search_parameters = ?, last_season = ?, last_episode = ?, modified_at = ?,
                last_download_at = ?, last_update_check_at = ?, version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&subscription.search_parameters)
        .bind(i64::from(subscription.last_season()))
        .bind(i64::from(subscription.last_episode()))
        .bind(now)
        .bind(subscription.last_download_at.map(|t| t.timestamp()))
        .bind(subscription.last_update_check_at.map(|t| t.timestamp()))
        .bind(subscription.id)
        .bind(subscription.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to update subscription: {}",
                e
            )))
        })?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM subscriptions WHERE id = ?")
                .bind(subscription.id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "Failed to check subscription: {}",
                        e
                    )))
                })?;

            return Err(match exists {
                Some(_) => Error::Conflict {
                    name: subscription.name.clone(),
                    expected: subscription.version,
                },
                None => Error::NotFound(subscription.name.clone()),
            });
        }

        subscription.version += 1;
        subscription.modified_at = from_unix(now);

        Ok(())
    }

    /// Delete a subscription by name
    pub async fn delete_subscription(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete subscription: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SubscriptionStore for Database {
    async fn find_by_name(&self, name: &str) -> Result<Option<Subscription>> {
        self.get_subscription(name).await
    }

    async fn find_all(&self, limit: Option<usize>, offset: usize) -> Result<Vec<Subscription>> {
        self.list_subscriptions(limit, offset).await
    }

    async fn create(&self, new: &NewSubscription) -> Result<Subscription> {
        self.insert_subscription(new).await
    }

    async fn save(&self, subscription: &mut Subscription) -> Result<()> {
        self.update_subscription(subscription).await
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        self.delete_subscription(name).await
    }
}
