use super::*;
use chrono::TimeZone;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap()
}

const PIRATEBAY_PAGE: &str = r#"<html><body>
<table id="searchResult">
<thead id="tableHead"><tr class="header"><th>Type</th><th>Name</th><th>SE</th><th>LE</th></tr></thead>
<tr>
<td class="vertTh"><center><a href="/browse/200">Video</a></center></td>
<td>
<div class="detName">			<a href="/torrent/1/Example.Show.S01E02.720p" class="detLink" title="Details for Example.Show.S01E02.720p">Example.Show.S01E02.720p</a>
</div>
<a href="magnet:?xt=urn:btih:AAAA&amp;dn=Example.Show.S01E02.720p" title="Download this torrent using magnet"><img src="/static/img/icon-magnet.gif" alt="Magnet link" /></a>
<font class="detDesc">Uploaded Today&nbsp;09:15, Size 350.2&nbsp;MiB, ULed by <a class="detDesc" href="/user/up/">up</a></font>
</td>
<td align="right">120</td>
<td align="right">7</td>
</tr>
<tr>
<td class="vertTh"><center><a href="/browse/200">Video</a></center></td>
<td>
<div class="detName">			<a href="/torrent/2/Example.Show.S01E02.1080p" class="detLink" title="Details for Example.Show.S01E02.1080p">Example.Show.S01E02.1080p &amp; Extras</a>
</div>
<a href="magnet:?xt=urn:btih:BBBB" title="Download this torrent using magnet"><img src="/static/img/icon-magnet.gif" alt="Magnet link" /></a>
<font class="detDesc">Uploaded 12-25&nbsp;08:00, Size 1.4&nbsp;GiB, ULed by <a class="detDesc" href="/user/up/">up</a></font>
</td>
<td align="right">45</td>
<td align="right">3</td>
</tr>
<tr>
<td class="vertTh"><center><a href="/browse/200">Video</a></center></td>
<td>
<div class="detName">			<a href="/torrent/3/Example.Show.S01E02.Broken" class="detLink" title="Details">Example.Show.S01E02.Broken</a>
</div>
<a href="magnet:?xt=urn:btih:CCCC" title="Download this torrent using magnet"><img src="/static/img/icon-magnet.gif" alt="Magnet link" /></a>
<font class="detDesc">Uploaded Today&nbsp;09:15, Size unknown, ULed by <a class="detDesc" href="/user/up/">up</a></font>
</td>
<td align="right">1</td>
<td align="right">1</td>
</tr>
<tr>
<td class="vertTh"><center><a href="/browse/200">Video</a></center></td>
<td>
<div class="detName">			<a href="/torrent/4/Example.Show.S01E03.720p" class="detLink" title="Details for Example.Show.S01E03.720p">Example.Show.S01E03.720p</a>
</div>
<a href="magnet:?xt=urn:btih:DDDD" title="Download this torrent using magnet"><img src="/static/img/icon-magnet.gif" alt="Magnet link" /></a>
<font class="detDesc">Uploaded 03-01&nbsp;2019, Size 300&nbsp;MiB, ULed by <a class="detDesc" href="/user/up/">up</a></font>
</td>
<td align="right">9</td>
<td align="right">0</td>
</tr>
</table>
</body></html>"#;

const KICKASS_PAGE: &str = r#"<html><body>
<table class="data" cellpadding="0" cellspacing="0">
<tr class="firstr"><th>torrent name</th><th>size</th><th>files</th><th>age</th><th>seed</th><th>leech</th></tr>
<tr class="odd" id="torrent_example1"><td><div class="iaconbox center floatright">
<a title="Torrent magnet link" href="magnet:?xt=urn:btih:KKKK&amp;dn=example" class="imagnet icon16"></a>
<a href="/example-show-s02e01-720p-t1.html" class="cellMainLink">Example Show <strong class="red">S02E01</strong> 720p</a>
</div></td>
<td class="nobr center">700.5 <span>MB</span></td>
<td class="center">2</td>
<td class="center" title="Yesterday&nbsp;07:00">1&nbsp;day</td>
<td class="green center">88</td>
<td class="red lasttd center">12</td>
</tr>
<tr class="even" id="torrent_example2"><td><div class="iaconbox center floatright">
<a title="Torrent magnet link" href="magnet:?xt=urn:btih:LLLL" class="imagnet icon16"></a>
<a href="/example-show-2x01-t2.html" class="cellMainLink">Example Show 2x01 HDTV</a>
</div></td>
<td class="nobr center">350 <span>KB</span></td>
<td class="center">1</td>
<td class="center" title="Nov 3 2021">2&nbsp;years</td>
<td class="green center">4</td>
<td class="red lasttd center">0</td>
</tr>
<tr class="odd" id="torrent_example3"><td><div class="iaconbox center floatright">
<a title="Torrent magnet link" href="magnet:?xt=urn:btih:MMMM" class="imagnet icon16"></a>
<a href="/example-show-s02e01-t3.html" class="cellMainLink">Example Show S02E01 missing counts</a>
</div></td>
</tr>
</table>
</body></html>"#;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:nyaa="https://nyaa.si/xmlns/nyaa">
<channel>
<title>Search results</title>
<link>https://nyaa.si/</link>
<description>Search feed</description>
<item>
<title>Example Show S01E05 1080p</title>
<link>https://nyaa.si/download/1.torrent</link>
<pubDate>Fri, 15 Mar 2024 10:00:00 +0000</pubDate>
<nyaa:seeders>31</nyaa:seeders>
<nyaa:leechers>2</nyaa:leechers>
<nyaa:size>1.2 GiB</nyaa:size>
</item>
<item>
<title>Example Show S01E05 720p</title>
<enclosure url="https://nyaa.si/download/2.torrent" length="524288000" type="application/x-bittorrent"/>
<nyaa:seeders>5</nyaa:seeders>
</item>
<item>
<title>Example Show S01E06 720p</title>
<link>https://nyaa.si/download/3.torrent</link>
<nyaa:size>200 MiB</nyaa:size>
</item>
<item>
<title>Example Show S01E05 no link</title>
<nyaa:size>200 MiB</nyaa:size>
</item>
</channel>
</rss>"#;

const MIB: u64 = 1024 * 1024;

#[test]
fn piratebay_reads_entries_and_skips_broken_ones() {
    let candidates = SiteParser::PirateBay.parse(PIRATEBAY_PAGE, 1, 2, now()).unwrap();

    assert_eq!(candidates.len(), 2);

    let first = &candidates[0];
    assert_eq!(first.name, "Example.Show.S01E02.720p");
    assert_eq!(first.link, "magnet:?xt=urn:btih:AAAA&dn=Example.Show.S01E02.720p");
    assert_eq!(first.seeders, 120);
    assert_eq!(first.leechers, 7);
    assert_eq!(first.size, (350.2 * MIB as f64).round() as u64);
    assert_eq!(
        first.upload_date,
        Some(Utc.with_ymd_and_hms(2024, 3, 15, 9, 15, 0).unwrap())
    );
    assert_eq!((first.season, first.episode), (1, 2));
    assert_eq!(first.mirror, "piratebay");

    let second = &candidates[1];
    assert_eq!(second.name, "Example.Show.S01E02.1080p & Extras");
    assert_eq!(
        second.upload_date,
        Some(Utc.with_ymd_and_hms(2023, 12, 25, 8, 0, 0).unwrap())
    );
}

#[test]
fn piratebay_filters_by_episode_marker() {
    let candidates = SiteParser::PirateBay.parse(PIRATEBAY_PAGE, 1, 3, now()).unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].name, "Example.Show.S01E03.720p");
    assert_eq!(candidates[0].size, 300 * MIB);
    assert_eq!(
        candidates[0].upload_date,
        Some(Utc.with_ymd_and_hms(2019, 3, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn piratebay_no_hits_is_empty_not_an_error() {
    let page = "<html><h2>No hits. Try adding an asterisk in you search phrase.</h2></html>";
    assert!(SiteParser::PirateBay.parse(page, 1, 1, now()).unwrap().is_empty());
}

#[test]
fn piratebay_unrecognized_page_is_parse_error() {
    let err = SiteParser::PirateBay
        .parse("<html>Service unavailable</html>", 1, 1, now())
        .unwrap_err();
    assert!(matches!(err, ParseError::Unrecognized { parser: "piratebay", .. }));
}

#[test]
fn kickass_reads_both_marker_styles() {
    let candidates = SiteParser::Kickass.parse(KICKASS_PAGE, 2, 1, now()).unwrap();

    assert_eq!(candidates.len(), 2);

    let first = &candidates[0];
    assert_eq!(first.name, "Example Show S02E01 720p");
    assert_eq!(first.link, "magnet:?xt=urn:btih:KKKK&dn=example");
    assert_eq!(first.size, (700.5 * MIB as f64).round() as u64);
    assert_eq!(first.seeders, 88);
    assert_eq!(first.leechers, 12);
    assert_eq!(
        first.upload_date,
        Some(Utc.with_ymd_and_hms(2024, 3, 14, 7, 0, 0).unwrap())
    );

    let second = &candidates[1];
    assert_eq!(second.name, "Example Show 2x01 HDTV");
    assert_eq!(second.size, 350 * 1024);
    assert_eq!(
        second.upload_date,
        Some(Utc.with_ymd_and_hms(2021, 11, 3, 0, 0, 0).unwrap())
    );
}

#[test]
fn kickass_no_results_and_unrecognized() {
    let empty = "<html><h2>Your search did not match any documents</h2></html>";
    assert!(SiteParser::Kickass.parse(empty, 1, 1, now()).unwrap().is_empty());

    let err = SiteParser::Kickass.parse("<html></html>", 1, 1, now()).unwrap_err();
    assert!(matches!(err, ParseError::Unrecognized { parser: "kickass", .. }));
}

#[test]
fn feed_reads_extensions_and_enclosures() {
    let candidates = SiteParser::TorrentFeed.parse(FEED, 1, 5, now()).unwrap();

    assert_eq!(candidates.len(), 2);

    assert_eq!(candidates[0].name, "Example Show S01E05 1080p");
    assert_eq!(candidates[0].link, "https://nyaa.si/download/1.torrent");
    assert_eq!(candidates[0].seeders, 31);
    assert_eq!(candidates[0].leechers, 2);
    assert_eq!(candidates[0].size, (1.2 * (1024 * MIB) as f64).round() as u64);
    assert_eq!(
        candidates[0].upload_date,
        Some(Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap())
    );

    assert_eq!(candidates[1].link, "https://nyaa.si/download/2.torrent");
    assert_eq!(candidates[1].size, 500 * MIB);
    assert_eq!(candidates[1].leechers, 0);
    assert_eq!(candidates[1].upload_date, None);
}

#[test]
fn feed_that_is_not_xml_is_parse_error() {
    let err = SiteParser::TorrentFeed
        .parse("<html><body>oops", 1, 1, now())
        .unwrap_err();
    assert!(matches!(err, ParseError::Unrecognized { parser: "torrentfeed", .. }));
}

#[test]
fn episode_marker_matches_exact_numbers_only() {
    assert!(names_episode("Show.S01E02.720p", 1, 2));
    assert!(names_episode("Show s1e2", 1, 2));
    assert!(names_episode("Show S01 E02", 1, 2));
    assert!(names_episode("Show 1x02", 1, 2));
    assert!(!names_episode("Show.S01E12.720p", 1, 2));
    assert!(!names_episode("Show.S11E02.720p", 1, 2));
    assert!(!names_episode("Show 1x020", 1, 2));
    assert!(!names_episode("Show 1080p", 1, 2));
}

#[test]
fn sizes_use_binary_multiples() {
    assert_eq!(parse_size("1 KiB"), Some(1024));
    assert_eq!(parse_size("1 KB"), Some(1024));
    assert_eq!(parse_size("2&nbsp;MiB"), Some(2 * MIB));
    assert_eq!(parse_size("1.5 GB"), Some(3 * 512 * MIB));
    assert_eq!(parse_size("1,024 B"), Some(1024));
    assert_eq!(parse_size("12345"), Some(12345));
    assert_eq!(parse_size("lots"), None);
    assert_eq!(parse_size("5 PB"), None);
}

#[test]
fn entities_are_decoded() {
    assert_eq!(decode_entities("Tom &amp; Jerry&#39;s"), "Tom & Jerry's");
    assert_eq!(cell_text("350 <span>MB</span>"), "350 MB");
}

#[test]
fn parser_names_serialize_lowercase() {
    assert_eq!(
        serde_json::to_string(&SiteParser::TorrentFeed).unwrap(),
        r#""torrentfeed""#
    );
    let parsed: SiteParser = serde_json::from_str(r#""piratebay""#).unwrap();
    assert_eq!(parsed, SiteParser::PirateBay);
}
