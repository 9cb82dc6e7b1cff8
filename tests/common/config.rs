//! Test configuration helpers for creating trackers over mock mirrors

use episode_dl::command::shell_quote;
use episode_dl::config::{DownloadConfig, PersistenceConfig};
use episode_dl::{Config, EpisodeTracker, MirrorConfig, SiteParser};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// Feed mirror searching `/search?q={query}` on `server`
pub fn feed_mirror(name: &str, server: &MockServer) -> MirrorConfig {
    MirrorConfig {
        name: name.to_string(),
        search_url: format!("{}/search?q={{query}}", server.uri()),
        parser: SiteParser::TorrentFeed,
        enabled: true,
    }
}

/// Where the download command appends every link it is given
pub fn download_log(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("downloads.log")
}

/// Configuration over `mirrors` with a database and a download log inside `temp_dir`
pub fn test_config(mirrors: Vec<MirrorConfig>, temp_dir: &TempDir) -> Config {
    let mut config = Config {
        mirrors,
        download: DownloadConfig {
            command: format!(
                "printf '%s\\n' {{link}} >> {}",
                shell_quote(&download_log(temp_dir).to_string_lossy())
            ),
        },
        persistence: PersistenceConfig {
            database_path: temp_dir.path().join("episode-dl.db"),
        },
        ..Default::default()
    };
    config.fetch.timeout = Some(Duration::from_secs(5));
    config
}

/// Tracker over `mirrors`; returns the tempdir holding its database (which must be kept alive)
pub async fn create_tracker(mirrors: Vec<MirrorConfig>) -> (EpisodeTracker, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let tracker = EpisodeTracker::new(test_config(mirrors, &temp_dir))
        .await
        .unwrap();
    (tracker, temp_dir)
}

/// Links the download command received, in order
pub fn downloaded_links(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
