//! Kickass result rows.
//!
//! Relative to the magnet link line: title +1, size +3, age +5 (in the cell's
//! `title` attribute), seeders +6, leechers +7.

use super::{Entry, ParseError, cell_text, dates, decode_entities, literal_regex, parse_size};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

const PARSER: &str = "kickass";

static MAGNET: LazyLock<Regex> = LazyLock::new(|| literal_regex(r#"href="(magnet:[^"]+)""#));
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| literal_regex(r#"class="cellMainLink"[^>]*>(.+?)</a>"#));
static SIZE_CELL: LazyLock<Regex> = LazyLock::new(|| literal_regex(r"<td[^>]*>(.+?)</td>"));
static AGE: LazyLock<Regex> =
    LazyLock::new(|| literal_regex(r#"<td class="center" title="([^"]+)""#));
static SEEDERS: LazyLock<Regex> =
    LazyLock::new(|| literal_regex(r#"<td class="green[^"]*">\s*(\d+)\s*</td>"#));
static LEECHERS: LazyLock<Regex> =
    LazyLock::new(|| literal_regex(r#"<td class="red[^"]*">\s*(\d+)\s*</td>"#));

pub(super) fn parse(body: &str, now: DateTime<Utc>) -> Result<Vec<Entry>, ParseError> {
    if body.contains("did not match any documents") {
        return Ok(Vec::new());
    }
    if !body.contains(r#"class="data""#) {
        return Err(ParseError::Unrecognized {
            parser: PARSER,
            reason: "no data table".to_string(),
        });
    }

    let lines: Vec<&str> = body.lines().collect();
    let mut entries = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if !MAGNET.is_match(line) {
            continue;
        }
        match entry_at(&lines, index, now) {
            Some(entry) => entries.push(entry),
            None => {
                tracing::debug!(parser = PARSER, line = index + 1, "skipping malformed entry")
            }
        }
    }

    Ok(entries)
}

fn entry_at(lines: &[&str], anchor: usize, now: DateTime<Utc>) -> Option<Entry> {
    let link = decode_entities(&MAGNET.captures(lines[anchor])?[1]);
    let name = cell_text(&TITLE.captures(lines.get(anchor + 1)?)?[1]);
    let size = parse_size(&cell_text(&SIZE_CELL.captures(lines.get(anchor + 3)?)?[1]))?;
    let upload_date = lines
        .get(anchor + 5)
        .and_then(|line| AGE.captures(line))
        .and_then(|caps| dates::kickass(&decode_entities(&caps[1]), now));
    let seeders = SEEDERS.captures(lines.get(anchor + 6)?)?[1].parse().ok()?;
    let leechers = LEECHERS.captures(lines.get(anchor + 7)?)?[1].parse().ok()?;

    Some(Entry {
        name,
        seeders,
        leechers,
        size,
        upload_date,
        link,
    })
}
