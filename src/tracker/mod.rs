//! Episode tracker facade (decomposed into focused submodules)
//!
//! [`EpisodeTracker`] wires the store, the mirror search, the discovery engine
//! and the download coordinator together and broadcasts [`Event`]s.
//!
//! - `subscriptions` - subscription CRUD
//! - `updates` - single and bulk update checks
//! - `downloads` - validated downloads and auto-download of discovered episodes
//! - `lifecycle` - scheduler start and graceful shutdown

use crate::command::{CommandRunner, ShellCommandRunner};
use crate::config::Config;
use crate::db::Database;
use crate::discovery::UpdateDiscovery;
use crate::download::DownloadCoordinator;
use crate::error::{Error, Result};
use crate::fetch::fetcher_from_config;
use crate::search::{EpisodeSearch, MirrorSearch};
use crate::store::SubscriptionStore;
use crate::types::Event;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

mod downloads;
mod lifecycle;
mod subscriptions;
mod updates;


/// Main tracker instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct EpisodeTracker {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Subscription persistence
    pub(crate) store: Arc<dyn SubscriptionStore>,
    /// Update discovery over the mirror search
    pub(crate) discovery: UpdateDiscovery,
    /// Download-then-persist coordinator
    pub(crate) downloads: DownloadCoordinator,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Cancelled once shutdown starts
    pub(crate) shutdown_token: CancellationToken,
    /// Background scheduler task, if started
    pub(crate) scheduler_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl EpisodeTracker {
    /// Create a new tracker from configuration
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Opens/creates the SQLite database and runs migrations
    /// - Picks the page fetcher (HTTP client or fetch command)
    /// - Sets up the event broadcast channel
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let db = Database::new(&config.persistence.database_path).await?;
        let runner: Arc<dyn CommandRunner> = Arc::new(ShellCommandRunner::default());
        let fetcher = fetcher_from_config(&config.fetch, runner.clone())?;
        let search = Arc::new(MirrorSearch::new(config.mirrors.clone(), fetcher));

        tracing::info!(
            database = %config.persistence.database_path.display(),
            mirrors = search.mirrors().len(),
            "episode tracker initialized"
        );

        Ok(Self::with_parts(config, Arc::new(db), search, runner))
    }

    /// Assemble a tracker from explicit collaborators
    ///
    /// The configuration is not validated; callers injecting their own parts
    /// are trusted to pass something usable.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn SubscriptionStore>,
        search: Arc<dyn EpisodeSearch>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        // 1000 events of backlog per subscriber
        let (event_tx, _rx) = broadcast::channel(1000);

        Self {
            config: Arc::new(config),
            discovery: UpdateDiscovery::new(search, store.clone()),
            downloads: DownloadCoordinator::new(runner, store.clone()),
            store,
            event_tx,
            shutdown_token: CancellationToken::new(),
            scheduler_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Subscribe to tracker events
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub(crate) fn emit_event(&self, event: Event) {
        // send() only fails when nobody is listening
        self.event_tx.send(event).ok();
    }

    pub(crate) fn ensure_running(&self) -> Result<()> {
        if self.shutdown_token.is_cancelled() {
            return Err(Error::ShuttingDown);
        }
        Ok(())
    }
}
