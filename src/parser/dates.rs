//! Upload-date grammars used by result pages.
//!
//! Every grammar resolves to an absolute UTC timestamp anchored on `now`.
//! Dates shown without a year are taken to be in the current year, unless that
//! puts them in the future, in which case the prior year is used.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Pirate Bay grammar: `Today HH:MM`, `Y-day HH:MM`, `N mins ago`,
/// `MM-DD HH:MM` (this year) and `MM-DD YYYY`.
pub fn piratebay(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        ["Today", time] => at_time(now.date_naive(), time),
        ["Y-day", time] => at_time(now.date_naive().pred_opt()?, time),
        [minutes, "mins" | "min", "ago"] => {
            let minutes: i64 = minutes.parse().ok()?;
            Some(now - Duration::minutes(minutes))
        }
        [month_day, rest] => {
            let (month, day) = month_day.split_once('-')?;
            let month: u32 = month.parse().ok()?;
            let day: u32 = day.parse().ok()?;
            dated(month, day, rest, now)
        }
        _ => None,
    }
}

/// Kickass grammar: `Today HH:MM`, `Yesterday HH:MM`, `Mon DD HH:MM`
/// (this year) and `Mon DD YYYY`.
pub fn kickass(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        ["Today", time] => at_time(now.date_naive(), time),
        ["Yesterday", time] => at_time(now.date_naive().pred_opt()?, time),
        [month, day, rest] => {
            let month = month.parse::<chrono::Month>().ok()?.number_from_month();
            let day: u32 = day.trim_end_matches(',').parse().ok()?;
            dated(month, day, rest, now)
        }
        _ => None,
    }
}

/// RFC 2822 feed dates
pub fn rfc2822(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(text.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// `rest` is either `HH:MM` (this year, clamped) or a four-digit year
fn dated(month: u32, day: u32, rest: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if rest.contains(':') {
        let this_year = NaiveDate::from_ymd_opt(now.year(), month, day)
            .and_then(|date| at_time(date, rest));
        match this_year {
            Some(date) if date <= now => Some(date),
            _ => NaiveDate::from_ymd_opt(now.year() - 1, month, day)
                .and_then(|date| at_time(date, rest)),
        }
    } else {
        let year: i32 = rest.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(0, 0, 0)
            .map(|date| date.and_utc())
    }
}

fn at_time(date: NaiveDate, time: &str) -> Option<DateTime<Utc>> {
    let (hour, minute) = time.split_once(':')?;
    date.and_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
        .map(|date| date.and_utc())
}
