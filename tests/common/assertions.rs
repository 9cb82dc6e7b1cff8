//! Custom test assertions for integration tests

use episode_dl::{EpisodeTracker, Event};
use std::time::Duration;
use tokio::sync::broadcast;

/// Wait for the first event matching `predicate`
///
/// Returns `None` on timeout or when the channel closes.
pub async fn wait_for_event<F>(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
    predicate: F,
) -> Option<Event>
where
    F: Fn(&Event) -> bool,
{
    tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}

/// Assert the stored watermark of `name`
pub async fn assert_watermark(tracker: &EpisodeTracker, name: &str, expected: (u32, u32)) {
    let subscription = tracker.get_subscription(name).await.unwrap();
    assert_eq!(
        subscription.watermark(),
        expected,
        "unexpected watermark for {}",
        name
    );
}
