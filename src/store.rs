//! Subscription persistence seam

use crate::error::Result;
use crate::subscription::{NewSubscription, Subscription};
use async_trait::async_trait;

/// Keyed storage for subscriptions
///
/// Implemented by [`Database`](crate::db::Database); the discovery and download
/// coordinators only see this trait.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Look up a subscription by its unique name
    async fn find_by_name(&self, name: &str) -> Result<Option<Subscription>>;

    /// List subscriptions ordered by name
    async fn find_all(&self, limit: Option<usize>, offset: usize) -> Result<Vec<Subscription>>;

    /// Insert a new subscription.
    ///
    /// Fails with [`Error::Duplicate`](crate::Error::Duplicate) if the name is taken.
    async fn create(&self, new: &NewSubscription) -> Result<Subscription>;

    /// Persist the watermark, search parameters and timestamps.
    ///
    /// Succeeds only if the stored version still equals `subscription.version`;
    /// on success the version is bumped and `modified_at` refreshed in place.
    /// A stale version is [`Error::Conflict`](crate::Error::Conflict).
    async fn save(&self, subscription: &mut Subscription) -> Result<()>;

    /// Delete a subscription, returning whether it existed
    async fn remove(&self, name: &str) -> Result<bool>;
}
