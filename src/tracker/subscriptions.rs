//! Subscription CRUD.

use crate::error::{Error, Result};
use crate::subscription::{NewSubscription, Subscription};
use crate::types::Event;

use super::EpisodeTracker;

impl EpisodeTracker {
    /// Start tracking a show
    ///
    /// The name is trimmed and must not be empty, and seasons start at 1.
    /// Fails with [`Error::Duplicate`] if a subscription with that name exists.
    pub async fn subscribe(&self, mut new: NewSubscription) -> Result<Subscription> {
        self.ensure_running()?;

        new.name = new.name.trim().to_string();
        if new.name.is_empty() {
            return Err(Error::config("subscription name must not be empty", "name"));
        }
        if new.last_season == 0 {
            return Err(Error::config("last_season must be at least 1", "last_season"));
        }

        let subscription = self.store.create(&new).await?;

        tracing::info!(
            subscription = %subscription.name,
            season = subscription.last_season(),
            episode = subscription.last_episode(),
            "subscribed"
        );
        self.emit_event(Event::SubscriptionAdded {
            name: subscription.name.clone(),
        });

        Ok(subscription)
    }

    /// Stop tracking a show
    pub async fn unsubscribe(&self, name: &str) -> Result<()> {
        if !self.store.remove(name).await? {
            return Err(Error::NotFound(name.to_string()));
        }

        tracing::info!(subscription = %name, "unsubscribed");
        self.emit_event(Event::SubscriptionRemoved {
            name: name.to_string(),
        });

        Ok(())
    }

    /// Get a subscription by name
    pub async fn get_subscription(&self, name: &str) -> Result<Subscription> {
        self.store
            .find_by_name(name)
            .await?
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// List subscriptions ordered by name
    pub async fn list_subscriptions(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Subscription>> {
        self.store.find_all(limit, offset).await
    }
}
