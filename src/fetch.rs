//! Mirror page fetching
//!
//! [`PageFetcher`] is the transport seam of the search orchestrator. Any error
//! it returns is treated as a transport failure and moves the search on to the
//! next mirror.

use crate::command::{CommandRunner, render_template};
use crate::config::{FetchConfig, URL_PLACEHOLDER};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches the body of a search result page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body.
    ///
    /// Connection errors, non-success statuses and failed fetch commands are
    /// all errors.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages with the built-in HTTP client
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with the configured user agent and optional timeout
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("timed out: {}", e)
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                e.to_string()
            };
            Error::Transport {
                url: url.to_string(),
                reason,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        response.text().await.map_err(|e| Error::Transport {
            url: url.to_string(),
            reason: format!("failed to read body: {}", e),
        })
    }
}

/// Fetches pages by running a command template such as `curl -sfL {url}`
///
/// The command's standard output is the page body; a nonzero exit is a
/// transport failure.
pub struct CommandFetcher {
    template: String,
    runner: Arc<dyn CommandRunner>,
}

impl CommandFetcher {
    /// Create a fetcher for a template containing `{url}`
    pub fn new(template: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            template: template.into(),
            runner,
        }
    }
}

#[async_trait]
impl PageFetcher for CommandFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let command_line = render_template(&self.template, URL_PLACEHOLDER, url);
        let output = self.runner.run(&command_line).await?;

        if !output.success {
            return Err(Error::Transport {
                url: url.to_string(),
                reason: format!("fetch command failed with {}", output.failure_summary()),
            });
        }

        Ok(output.stdout)
    }
}

/// Pick the fetcher the configuration asks for
pub fn fetcher_from_config(
    config: &FetchConfig,
    runner: Arc<dyn CommandRunner>,
) -> Result<Arc<dyn PageFetcher>> {
    match &config.command {
        Some(template) => Ok(Arc::new(CommandFetcher::new(template.clone(), runner))),
        None => Ok(Arc::new(HttpFetcher::new(config)?)),
    }
}
