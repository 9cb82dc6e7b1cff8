//! Error types for episode-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (discovery, download, persistence, config)
//! - HTTP status code mapping for the request-handling layer
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for episode-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for episode-dl
///
/// Each variant includes enough context to tell the client what went wrong
/// without exposing internals.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "discovery.default_sort")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Requested season/episode is not a legal step from the subscription's watermark
    #[error(
        "invalid episode S{season:02}E{episode:02} for '{name}' (currently at S{current_season:02}E{current_episode:02})"
    )]
    InvalidEpisode {
        /// Subscription name
        name: String,
        /// Requested season
        season: u32,
        /// Requested episode
        episode: u32,
        /// Watermark season at the time of the request
        current_season: u32,
        /// Watermark episode at the time of the request
        current_episode: u32,
    },

    /// The download action ran but the watermark refused to advance afterwards
    #[error(
        "state consistency error for '{name}': cannot advance from S{current_season:02}E{current_episode:02} to S{season:02}E{episode:02} after download"
    )]
    StateConsistency {
        /// Subscription name
        name: String,
        /// Season that was downloaded
        season: u32,
        /// Episode that was downloaded
        episode: u32,
        /// Watermark season when the advance was attempted
        current_season: u32,
        /// Watermark episode when the advance was attempted
        current_episode: u32,
    },

    /// Every configured mirror failed at the transport level
    #[error("all sources unavailable: {}", .failures.join("; "))]
    AllSourcesUnavailable {
        /// One entry per mirror tried, in priority order ("name: reason")
        failures: Vec<String>,
    },

    /// A mirror page could not be fetched
    #[error("transport error fetching {url}: {reason}")]
    Transport {
        /// Page that was requested
        url: String,
        /// Why the fetch failed
        reason: String,
    },

    /// The external download action failed
    #[error("download action failed: {0}")]
    DownloadAction(String),

    /// External command could not be spawned
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Subscription not found
    #[error("subscription not found: {0}")]
    NotFound(String),

    /// Subscription with the same name already exists
    #[error("duplicate subscription: {0}")]
    Duplicate(String),

    /// Subscription was modified concurrently (version mismatch)
    #[error("subscription '{name}' was modified concurrently (expected version {expected})")]
    Conflict {
        /// Subscription name
        name: String,
        /// Version the writer started from
        expected: i64,
    },

    /// Shutdown in progress
    #[error("shutdown in progress: not accepting new work")]
    ShuttingDown,

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// API error response format
///
/// Returned to clients by whatever request-handling layer embeds the library.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_episode",
///     "message": "invalid episode S01E05 for 'Show' (currently at S01E02)",
///     "details": { "subscription": "Show", "season": 1, "episode": 5 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "invalid_episode")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - client input
            Error::Config { .. } => 400,
            Error::InvalidEpisode { .. } => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 409 Conflict
            Error::Duplicate(_) => 409,
            Error::Conflict { .. } => 409,
            Error::StateConsistency { .. } => 409,

            // 500 Internal Server Error
            Error::Database(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - external collaborators misbehaved
            Error::Transport { .. } => 502,
            Error::Network(_) => 502,
            Error::DownloadAction(_) => 502,

            // 503 Service Unavailable
            Error::AllSourcesUnavailable { .. } => 503,
            Error::ExternalTool(_) => 503,
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) => "database_error",
            Error::InvalidEpisode { .. } => "invalid_episode",
            Error::StateConsistency { .. } => "state_consistency",
            Error::AllSourcesUnavailable { .. } => "all_sources_unavailable",
            Error::Transport { .. } => "transport_error",
            Error::DownloadAction(_) => "download_action_failed",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotFound(_) => "not_found",
            Error::Duplicate(_) => "duplicate",
            Error::Conflict { .. } => "conflict",
            Error::ShuttingDown => "shutting_down",
            Error::Network(_) => "network_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::InvalidEpisode {
                name,
                season,
                episode,
                current_season,
                current_episode,
            }
            | Error::StateConsistency {
                name,
                season,
                episode,
                current_season,
                current_episode,
            } => Some(serde_json::json!({
                "subscription": name,
                "season": season,
                "episode": episode,
                "current_season": current_season,
                "current_episode": current_episode,
            })),
            Error::AllSourcesUnavailable { failures } => Some(serde_json::json!({
                "failures": failures,
            })),
            Error::Conflict { name, expected } => Some(serde_json::json!({
                "subscription": name,
                "expected_version": expected,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
