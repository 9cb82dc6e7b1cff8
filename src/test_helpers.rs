//! Scripted fakes for the tracker's seams, shared by unit tests.

use crate::command::{CommandOutput, CommandRunner};
use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::search::EpisodeSearch;
use crate::store::SubscriptionStore;
use crate::subscription::{NewSubscription, Subscription};
use crate::types::{Candidate, SortMode};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Minimal RSS search feed with one item per `(title, seeders, size)`
pub(crate) fn feed_body(items: &[(&str, u32, u64)]) -> String {
    let items: String = items
        .iter()
        .enumerate()
        .map(|(i, (title, seeders, size))| {
            format!(
                r#"<item><title>{title}</title><enclosure url="https://files.example/{i}.torrent" length="{size}" type="application/x-bittorrent"/><nyaa:seeders>{seeders}</nyaa:seeders></item>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0" xmlns:nyaa="https://nyaa.si/xmlns/nyaa"><channel><title>t</title><link>https://example.com</link><description>d</description>{items}</channel></rss>"#
    )
}

/// Candidate for `(season, episode)` with a recognisable link
pub(crate) fn candidate(season: u32, episode: u32) -> Candidate {
    Candidate {
        name: format!("Example Show S{:02}E{:02}", season, episode),
        season,
        episode,
        seeders: 10,
        leechers: 1,
        size: 1024,
        upload_date: None,
        link: format!("magnet:?xt=urn:btih:s{}e{}", season, episode),
        mirror: "scripted".to_string(),
    }
}

/// Fetcher answering by URL substring; anything unscripted is a transport failure
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    responses: Vec<(String, Option<String>)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, url_part: &str, body: &str) -> Self {
        self.responses
            .push((url_part.to_string(), Some(body.to_string())));
        self
    }

    pub(crate) fn fail(mut self, url_part: &str) -> Self {
        self.responses.push((url_part.to_string(), None));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        match self
            .responses
            .iter()
            .find(|(part, _)| url.contains(part.as_str()))
        {
            Some((_, Some(body))) => Ok(body.clone()),
            _ => Err(Error::Transport {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Scripted answer for one probed episode
#[derive(Clone)]
pub(crate) enum Probe {
    Found(Vec<Candidate>),
    Unavailable,
}

/// Episode search answering per `(season, episode)`; unscripted episodes are gaps
#[derive(Default)]
pub(crate) struct ScriptedSearch {
    answers: HashMap<(u32, u32), Probe>,
    calls: Mutex<Vec<(String, u32, u32)>>,
}

impl ScriptedSearch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn found(mut self, season: u32, episode: u32, candidates: Vec<Candidate>) -> Self {
        self.answers
            .insert((season, episode), Probe::Found(candidates));
        self
    }

    pub(crate) fn unavailable(mut self, season: u32, episode: u32) -> Self {
        self.answers.insert((season, episode), Probe::Unavailable);
        self
    }

    /// `(season, episode)` of every probe, in call order
    pub(crate) fn probes(&self) -> Vec<(u32, u32)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, s, e)| (*s, *e))
            .collect()
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _, _)| q.clone())
            .collect()
    }
}

#[async_trait]
impl EpisodeSearch for ScriptedSearch {
    async fn search(
        &self,
        query: &str,
        season: u32,
        episode: u32,
        sort: SortMode,
        max_results: usize,
    ) -> Result<Vec<Candidate>> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), season, episode));
        match self.answers.get(&(season, episode)) {
            Some(Probe::Found(candidates)) => Ok(sort.select(candidates.clone(), max_results)),
            Some(Probe::Unavailable) => Err(Error::AllSourcesUnavailable {
                failures: vec!["scripted: connection refused".to_string()],
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Command runner that records command lines and returns a fixed outcome
pub(crate) struct RecordingRunner {
    success: bool,
    calls: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub(crate) fn succeeding() -> Self {
        Self {
            success: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            success: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command_line: &str) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command_line.to_string());
        Ok(CommandOutput {
            status: Some(if self.success { 0 } else { 1 }),
            success: self.success,
            stdout: String::new(),
            stderr: if self.success {
                String::new()
            } else {
                "torrent client unreachable".to_string()
            },
        })
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// In-memory store with version checking and save counting
#[derive(Default)]
pub(crate) struct MemoryStore {
    rows: Mutex<Vec<Subscription>>,
    next_id: AtomicUsize,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(subscription: Subscription) -> Self {
        let store = Self::new();
        store.rows.lock().unwrap().push(subscription);
        store
    }

    pub(crate) fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    /// Stored copy, bypassing the trait
    pub(crate) fn stored(&self, name: &str) -> Option<Subscription> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    /// Bump the stored version as if another writer had saved first
    pub(crate) fn bump_version(&self, name: &str) {
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|s| s.name == name) {
            row.version += 1;
        }
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Subscription>> {
        Ok(self.stored(name))
    }

    async fn find_all(&self, limit: Option<usize>, offset: usize) -> Result<Vec<Subscription>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn create(&self, new: &NewSubscription) -> Result<Subscription> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|s| s.name == new.name) {
            return Err(Error::Duplicate(new.name.clone()));
        }
        let now = Utc::now();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 100;
        let subscription = Subscription::from_parts(
            id,
            new.name.clone(),
            new.search_parameters.clone(),
            new.last_season,
            new.last_episode,
            now,
            now,
            None,
            None,
            0,
        );
        rows.push(subscription.clone());
        Ok(subscription)
    }

    async fn save(&self, subscription: &mut Subscription) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Other("disk full".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|s| s.id == subscription.id)
            .ok_or_else(|| Error::NotFound(subscription.name.clone()))?;
        if row.version != subscription.version {
            return Err(Error::Conflict {
                name: subscription.name.clone(),
                expected: subscription.version,
            });
        }
        subscription.version += 1;
        subscription.modified_at = Utc::now();
        *row = subscription.clone();
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.name != name);
        Ok(rows.len() != before)
    }
}
