//! Mirror result-page parsers.
//!
//! Each [`SiteParser`] variant understands one markup family. Parsers are pure:
//! they take a page body and the episode being probed and return the candidates
//! they could read. A broken entry is skipped; only a page that does not look
//! like a result page at all is reported as [`ParseError`].
//!
//! ## Submodules
//!
//! - [`dates`] - site date grammars ("Today", "Y-day", "this year", "prior year")
//! - `piratebay` - line-oriented search result table
//! - `kickass` - table-row search results
//! - `feed` - RSS search feeds with torrent namespace extensions

use crate::types::Candidate;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

pub mod dates;
mod feed;
mod kickass;
mod piratebay;

/// Markup family served by a mirror
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteParser {
    /// The Pirate Bay style search table
    PirateBay,
    /// KickassTorrents style result rows
    Kickass,
    /// RSS 2.0 search feed with seeders/leechers/size extensions
    TorrentFeed,
}

/// Why a page could not be parsed at all
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Page does not contain the markers of a result page
    #[error("unrecognized {parser} page: {reason}")]
    Unrecognized {
        /// Parser name
        parser: &'static str,
        /// What was missing
        reason: String,
    },
}

impl SiteParser {
    /// Parser name used in logs and config
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteParser::PirateBay => "piratebay",
            SiteParser::Kickass => "kickass",
            SiteParser::TorrentFeed => "torrentfeed",
        }
    }

    /// Parse a result page into candidates for `season`/`episode`.
    ///
    /// `now` anchors relative dates ("Today", "Y-day", dates without a year).
    /// Entries whose title does not name the probed episode are dropped.
    /// Returned candidates carry the parser name in `mirror`; callers that know
    /// the mirror's configured name overwrite it.
    pub fn parse(
        &self,
        body: &str,
        season: u32,
        episode: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Candidate>, ParseError> {
        let entries = match self {
            SiteParser::PirateBay => piratebay::parse(body, now)?,
            SiteParser::Kickass => kickass::parse(body, now)?,
            SiteParser::TorrentFeed => feed::parse(body)?,
        };

        let total = entries.len();
        let candidates: Vec<Candidate> = entries
            .into_iter()
            .filter(|entry| names_episode(&entry.name, season, episode))
            .map(|entry| Candidate {
                name: entry.name,
                season,
                episode,
                seeders: entry.seeders,
                leechers: entry.leechers,
                size: entry.size,
                upload_date: entry.upload_date,
                link: entry.link,
                mirror: self.as_str().to_string(),
            })
            .collect();

        tracing::debug!(
            parser = self.as_str(),
            season,
            episode,
            entries = total,
            matched = candidates.len(),
            "parsed result page"
        );

        Ok(candidates)
    }
}

/// One result row before it is tagged with the probed episode
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Entry {
    pub(crate) name: String,
    pub(crate) seeders: u32,
    pub(crate) leechers: u32,
    pub(crate) size: u64,
    pub(crate) upload_date: Option<DateTime<Utc>>,
    pub(crate) link: String,
}

// expect is acceptable for literal patterns; each one is exercised by the parser tests
#[allow(clippy::expect_used)]
pub(crate) fn literal_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("literal regex must compile")
}

static EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    literal_regex(r"(?i)\bS(\d{1,3})[ ._-]?E(\d{1,4})\b|\b(\d{1,2})x(\d{1,4})\b")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| literal_regex(r"<[^>]*>"));

static SIZE: LazyLock<Regex> =
    LazyLock::new(|| literal_regex(r"(?i)^\s*([\d.,]+)\s*([KMGT]i?B|B|bytes)?\s*$"));

/// True when `name` carries an `SxxEyy` or `NxMM` marker for this episode
pub(crate) fn names_episode(name: &str, season: u32, episode: u32) -> bool {
    EPISODE_MARKER.captures_iter(name).any(|caps| {
        let (s, e) = match (caps.get(1), caps.get(2)) {
            (Some(s), Some(e)) => (s, e),
            _ => match (caps.get(3), caps.get(4)) {
                (Some(s), Some(e)) => (s, e),
                _ => return false,
            },
        };
        s.as_str().parse::<u32>().ok() == Some(season)
            && e.as_str().parse::<u32>().ok() == Some(episode)
    })
}

/// Convert "350.2 MiB" style sizes to bytes (binary multiples for every unit)
pub(crate) fn parse_size(text: &str) -> Option<u64> {
    let text = decode_entities(text);
    let caps = SIZE.captures(&text)?;
    let value: f64 = caps[1].replace(',', "").parse().ok()?;
    let multiplier: f64 = match caps
        .get(2)
        .map(|m| m.as_str().to_ascii_uppercase())
        .as_deref()
    {
        None | Some("B") | Some("BYTES") => 1.0,
        Some("KB") | Some("KIB") => 1024.0,
        Some("MB") | Some("MIB") => 1024.0 * 1024.0,
        Some("GB") | Some("GIB") => 1024.0 * 1024.0 * 1024.0,
        Some("TB") | Some("TIB") => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        Some(_) => return None,
    };
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// Remove markup from a cell and decode what is left
pub(crate) fn cell_text(html: &str) -> String {
    decode_entities(&TAG.replace_all(html, "")).trim().to_string()
}

/// Decode the handful of HTML entities result pages put in titles and sizes
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
