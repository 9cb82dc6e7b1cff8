//! RSS search feeds.
//!
//! Counts and sizes come from namespaced item extensions (`nyaa:seeders`,
//! `torrent:contentLength`, ...). The prefix is ignored so any torrent
//! namespace works.

use super::{Entry, ParseError, dates, decode_entities, parse_size};
use rss::Item;

const PARSER: &str = "torrentfeed";

pub(super) fn parse(body: &str) -> Result<Vec<Entry>, ParseError> {
    let channel = body
        .parse::<rss::Channel>()
        .map_err(|e| ParseError::Unrecognized {
            parser: PARSER,
            reason: e.to_string(),
        })?;

    let entries = channel
        .items()
        .iter()
        .filter_map(|item| {
            let entry = entry(item);
            if entry.is_none() {
                tracing::debug!(parser = PARSER, title = ?item.title(), "skipping malformed item");
            }
            entry
        })
        .collect();

    Ok(entries)
}

fn entry(item: &Item) -> Option<Entry> {
    let name = decode_entities(item.title()?.trim());

    let link = item
        .enclosure()
        .map(|enc| enc.url().to_string())
        .or_else(|| item.link().map(|link| link.to_string()))?;

    let size = extension(item, &["size", "contentLength"])
        .and_then(|value| parse_size(&value))
        .or_else(|| {
            item.enclosure()
                .and_then(|enc| enc.length().parse::<u64>().ok())
                .filter(|length| *length > 0)
        })?;

    let seeders = extension(item, &["seeders", "seeds"])
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0);
    let leechers = extension(item, &["leechers"])
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0);

    Some(Entry {
        name,
        seeders,
        leechers,
        size,
        upload_date: item.pub_date().and_then(dates::rfc2822),
        link,
    })
}

/// First value of an extension element with one of `names`, in any namespace
fn extension(item: &Item, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        item.extensions()
            .values()
            .filter_map(|elements| elements.get(*name))
            .flatten()
            .find_map(|ext| ext.value().map(|value| value.to_string()))
    })
}
