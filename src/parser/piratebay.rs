//! Pirate Bay search table.
//!
//! Entries are anchored on the magnet link line. The title sits in a `detLink`
//! anchor on one of the lines above, the `Uploaded …, Size …` description is
//! the next line, and the seeders/leechers cells are three and four lines below.

use super::{Entry, ParseError, cell_text, dates, decode_entities, literal_regex, parse_size};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

const PARSER: &str = "piratebay";
const TITLE_LOOKBACK: usize = 3;

static MAGNET: LazyLock<Regex> = LazyLock::new(|| literal_regex(r#"href="(magnet:[^"]+)""#));
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| literal_regex(r#"class="detLink"[^>]*>([^<]+)</a>"#));
static DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| literal_regex(r"Uploaded\s+(.+?),\s*Size\s+(.+?),"));
static COUNT: LazyLock<Regex> =
    LazyLock::new(|| literal_regex(r#"<td align="right">\s*(\d+)\s*</td>"#));

pub(super) fn parse(body: &str, now: DateTime<Utc>) -> Result<Vec<Entry>, ParseError> {
    if !body.contains(r#"id="searchResult""#) {
        if body.contains("No hits") {
            return Ok(Vec::new());
        }
        return Err(ParseError::Unrecognized {
            parser: PARSER,
            reason: "no searchResult table".to_string(),
        });
    }

    let lines: Vec<&str> = body.lines().collect();
    let entries = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| MAGNET.is_match(line))
        .filter_map(|(index, _)| {
            let entry = entry_at(&lines, index, now);
            if entry.is_none() {
                tracing::debug!(parser = PARSER, line = index + 1, "skipping malformed entry");
            }
            entry
        })
        .collect();

    Ok(entries)
}

fn entry_at(lines: &[&str], anchor: usize, now: DateTime<Utc>) -> Option<Entry> {
    let link = decode_entities(&MAGNET.captures(lines[anchor])?[1]);

    let name = lines[anchor.saturating_sub(TITLE_LOOKBACK)..=anchor]
        .iter()
        .rev()
        .find_map(|line| TITLE.captures(line))
        .map(|caps| cell_text(&caps[1]))?;

    let description = decode_entities(lines.get(anchor + 1)?);
    let caps = DESCRIPTION.captures(&description)?;
    let upload_date = dates::piratebay(&caps[1], now);
    let size = parse_size(&caps[2])?;

    let seeders = count(lines.get(anchor + 3)?)?;
    let leechers = count(lines.get(anchor + 4)?)?;

    Some(Entry {
        name,
        seeders,
        leechers,
        size,
        upload_date,
        link,
    })
}

fn count(line: &str) -> Option<u32> {
    COUNT.captures(line)?[1].parse().ok()
}
