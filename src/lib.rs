//! # episode-dl
//!
//! Subscription tracker for episodic shows: finds newly released episodes on
//! content-index mirrors and hands them to an external download command.
//!
//! ## How it works
//!
//! - Every subscription carries a `(season, episode)` watermark that only moves
//!   one legal step at a time (next episode, or first episode of next season)
//! - Update discovery probes episode after episode from the watermark, in the
//!   current and the next season, until it hits a gap
//! - Each probe tries the configured mirrors in priority order and falls back
//!   to the next one when a mirror cannot be reached
//! - A download runs the configured command first and only then advances and
//!   saves the watermark
//!
//! ## Quick Start
//!
//! ```no_run
//! use episode_dl::{Config, EpisodeTracker, NewSubscription};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tracker = EpisodeTracker::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = tracker.subscribe_events();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     tracker.subscribe(NewSubscription::new("Example Show")).await?;
//!     let found = tracker.discover_updates("Example Show", None, None).await?;
//!     tracker.download_discovered("Example Show", &found).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// External command execution
pub mod command;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Update discovery
pub mod discovery;
/// Download-then-persist coordination
pub mod download;
/// Error types
pub mod error;
/// Page fetching (HTTP or external command)
pub mod fetch;
/// Per-mirror search result parsers
pub mod parser;
/// Periodic update checks
pub mod scheduler;
/// Multi-mirror episode search
pub mod search;
/// Subscription persistence seam
pub mod store;
/// Subscription entity and its season/episode state machine
pub mod subscription;
/// Tracker facade (decomposed into focused submodules)
pub mod tracker;
/// Core types and events
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use command::{CommandOutput, CommandRunner, ShellCommandRunner};
pub use config::{Config, MirrorConfig};
pub use db::Database;
pub use discovery::UpdateDiscovery;
pub use download::DownloadCoordinator;
pub use error::{ApiError, DatabaseError, Error, ErrorDetail, Result, ToHttpStatus};
pub use fetch::{CommandFetcher, HttpFetcher, PageFetcher};
pub use parser::{ParseError, SiteParser};
pub use scheduler::{PassSummary, UpdateScheduler};
pub use search::{EpisodeSearch, MirrorSearch};
pub use store::SubscriptionStore;
pub use subscription::{NewSubscription, Subscription};
pub use tracker::EpisodeTracker;
pub use types::{Candidate, Event, FailedCheck, SortMode, SubscriptionUpdates, UpdateReport};

/// Helper function to run the tracker with graceful signal handling.
///
/// Starts the update scheduler, waits for a termination signal and then calls
/// the tracker's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use episode_dl::{EpisodeTracker, Config, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut config = Config::default();
///     config.scheduler.enabled = true;
///     let tracker = EpisodeTracker::new(config).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(tracker).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(tracker: EpisodeTracker) -> Result<()> {
    tracker.start_scheduler().await?;
    wait_for_signal().await;
    tracker.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
