//! Configuration types for episode-dl

use crate::error::{Error, Result};
use crate::parser::SiteParser;
use crate::types::SortMode;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Placeholder replaced by the URL-encoded search query in mirror URLs
pub const QUERY_PLACEHOLDER: &str = "{query}";
/// Placeholder replaced by the shell-quoted page URL in fetch commands
pub const URL_PLACEHOLDER: &str = "{url}";
/// Placeholder replaced by the shell-quoted download link in download commands
pub const LINK_PLACEHOLDER: &str = "{link}";

/// Main configuration for [`EpisodeTracker`](crate::EpisodeTracker)
///
/// Every field has a default, so `{}` deserializes to a working configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Mirrors in fallback priority order (first is tried first)
    #[serde(default = "default_mirrors")]
    pub mirrors: Vec<MirrorConfig>,

    /// Update discovery defaults and limits
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// How mirror pages are fetched
    #[serde(default)]
    pub fetch: FetchConfig,

    /// External download action
    #[serde(default)]
    pub download: DownloadConfig,

    /// Data storage
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Periodic update checking
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mirrors: default_mirrors(),
            discovery: DiscoveryConfig::default(),
            fetch: FetchConfig::default(),
            download: DownloadConfig::default(),
            persistence: PersistenceConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl Config {
    /// Check the configuration for values the tracker cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.mirrors.is_empty() {
            return Err(Error::config("at least one mirror is required", "mirrors"));
        }

        for (idx, mirror) in self.mirrors.iter().enumerate() {
            if mirror.name.trim().is_empty() {
                return Err(Error::config(
                    format!("mirror #{} has an empty name", idx),
                    "mirrors.name",
                ));
            }
            if !mirror.search_url.contains(QUERY_PLACEHOLDER) {
                return Err(Error::config(
                    format!(
                        "mirror '{}' search_url must contain {}",
                        mirror.name, QUERY_PLACEHOLDER
                    ),
                    "mirrors.search_url",
                ));
            }
            if self.mirrors[..idx].iter().any(|m| m.name == mirror.name) {
                return Err(Error::config(
                    format!("duplicate mirror name '{}'", mirror.name),
                    "mirrors.name",
                ));
            }
        }
        if self.enabled_mirrors().next().is_none() {
            return Err(Error::config(
                "at least one mirror must be enabled",
                "mirrors.enabled",
            ));
        }

        if self.discovery.default_max_results == 0 {
            return Err(Error::config(
                "default_max_results must be at least 1",
                "discovery.default_max_results",
            ));
        }
        if self.discovery.max_concurrent_checks == 0 {
            return Err(Error::config(
                "max_concurrent_checks must be at least 1",
                "discovery.max_concurrent_checks",
            ));
        }

        if !self.download.command.contains(LINK_PLACEHOLDER) {
            return Err(Error::config(
                format!("download command must contain {}", LINK_PLACEHOLDER),
                "download.command",
            ));
        }

        if let Some(command) = &self.fetch.command
            && !command.contains(URL_PLACEHOLDER)
        {
            return Err(Error::config(
                format!("fetch command must contain {}", URL_PLACEHOLDER),
                "fetch.command",
            ));
        }

        if self.scheduler.enabled && self.scheduler.check_interval.is_zero() {
            return Err(Error::config(
                "check_interval must be greater than zero",
                "scheduler.check_interval",
            ));
        }

        Ok(())
    }

    /// Enabled mirrors in priority order
    pub fn enabled_mirrors(&self) -> impl Iterator<Item = &MirrorConfig> {
        self.mirrors.iter().filter(|m| m.enabled)
    }
}

/// One content-index mirror
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Display name, used in logs and on candidates
    pub name: String,

    /// Search URL template containing `{query}`
    pub search_url: String,

    /// Markup family this mirror serves
    pub parser: SiteParser,

    /// Whether the mirror takes part in searches
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Update discovery configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Sort mode used when the caller does not pick one (default: mostseeded)
    #[serde(default)]
    pub default_sort: SortMode,

    /// Candidates kept per probed episode (default: 1)
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    /// Subscriptions checked at once by a bulk update check (default: 4)
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_sort: SortMode::default(),
            default_max_results: default_max_results(),
            max_concurrent_checks: default_max_concurrent_checks(),
        }
    }
}

/// Page fetching configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Shell command template containing `{url}` (e.g. `curl -sfL {url}`).
    ///
    /// When unset, pages are fetched with the built-in HTTP client.
    #[serde(default)]
    pub command: Option<String>,

    /// User agent for the built-in HTTP client
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout for the built-in HTTP client (None = no timeout)
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            command: None,
            user_agent: default_user_agent(),
            timeout: None,
        }
    }
}

/// External download action configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Shell command template containing `{link}`
    #[serde(default = "default_download_command")]
    pub command: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            command: default_download_command(),
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Database path (default: "./episode-dl.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Periodic update-check configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Run the periodic update check (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Time between bulk update checks (default: 1 hour)
    #[serde(default = "default_check_interval", with = "duration_serde")]
    pub check_interval: Duration,

    /// Download the best candidate of every discovered episode (default: false)
    #[serde(default)]
    pub auto_download: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            check_interval: default_check_interval(),
            auto_download: false,
        }
    }
}

// Default value functions
fn default_mirrors() -> Vec<MirrorConfig> {
    vec![
        MirrorConfig {
            name: "thepiratebay".to_string(),
            search_url: "https://thepiratebay.org/search/{query}/0/7/0".to_string(),
            parser: SiteParser::PirateBay,
            enabled: true,
        },
        MirrorConfig {
            name: "kickass".to_string(),
            search_url: "https://kickass.to/usearch/{query}/".to_string(),
            parser: SiteParser::Kickass,
            enabled: true,
        },
        MirrorConfig {
            name: "torrentfeed".to_string(),
            search_url: "https://nyaa.si/?page=rss&q={query}&c=0_0&f=0".to_string(),
            parser: SiteParser::TorrentFeed,
            enabled: true,
        },
    ]
}

fn default_true() -> bool {
    true
}

fn default_max_results() -> usize {
    1
}

fn default_max_concurrent_checks() -> usize {
    4
}

fn default_user_agent() -> String {
    format!("episode-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_download_command() -> String {
    "transmission-remote --add {link}".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("episode-dl.db")
}

fn default_check_interval() -> Duration {
    Duration::from_secs(3600)
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
