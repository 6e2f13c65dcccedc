//! `last_updated` stamps, stored as RFC 850 strings in UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

const RFC850: &str = "%A, %d-%b-%y %H:%M:%S UTC";

pub fn format_last_updated(at: DateTime<Utc>) -> String {
    at.format(RFC850).to_string()
}

pub fn parse_last_updated(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, RFC850)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Stamp for "now", never earlier than `previous`.
pub(crate) fn advance(previous: Option<&str>) -> String {
    let now = Utc::now();
    match previous.and_then(parse_last_updated) {
        Some(prev) if prev > now => format_last_updated(prev),
        _ => format_last_updated(now),
    }
}

/// The later of two stamps; unparseable stamps lose.
pub(crate) fn later<'a>(a: &'a str, b: &'a str) -> &'a str {
    match (parse_last_updated(a), parse_last_updated(b)) {
        (Some(x), Some(y)) if y > x => b,
        (Some(_), _) => a,
        (None, _) => b,
    }
}
