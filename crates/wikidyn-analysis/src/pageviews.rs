use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use wikidyn_core::PageviewRequest;

use crate::AnalysisError;

#[derive(Debug, Deserialize)]
struct MonthlyPayload {
    #[serde(default)]
    daily_views: BTreeMap<String, f64>,
}

/// Reads `{"daily_views": {"YYYY-MM-DD": n}}`. The upstream service pads
/// every month to 31 days, so keys that are not real calendar dates are
/// dropped.
pub fn parse_pageview_payload(body: &str) -> Result<BTreeMap<NaiveDate, f64>, AnalysisError> {
    let payload: MonthlyPayload = serde_json::from_str(body)?;
    let mut views = BTreeMap::new();
    for (key, count) in payload.daily_views {
        match NaiveDate::parse_from_str(&key, "%Y-%m-%d") {
            Ok(date) => {
                views.insert(date, count);
            }
            Err(_) => tracing::debug!(key = %key, "dropping impossible pageview date"),
        }
    }
    Ok(views)
}

/// Every `(year, month)` touched by `[min_date, max_date]`, in order.
pub fn months_between(min_date: NaiveDate, max_date: NaiveDate) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    let (mut year, mut month) = (min_date.year(), min_date.month());
    while (year, month) <= (max_date.year(), max_date.month()) {
        months.push((year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

/// `<endpoint><language>/<YYYYMM>/<encoded title>`.
pub fn pageview_url(endpoint: &str, request: &PageviewRequest) -> String {
    format!(
        "{endpoint}{}/{:04}{:02}/{}",
        request.language,
        request.year,
        request.month,
        percent_encode_title(&request.title)
    )
}

/// Percent-encodes UTF-8 bytes outside the unreserved set. `/` is kept so
/// subpage titles stay readable.
pub fn percent_encode_title(title: &str) -> String {
    let mut encoded = String::with_capacity(title.len());
    for byte in title.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                encoded.push(char::from(byte));
            }
            _ => {
                encoded.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    encoded
}

/// Later months win on overlapping days.
pub fn merge_pageviews(
    months: impl IntoIterator<Item = BTreeMap<NaiveDate, f64>>,
) -> BTreeMap<NaiveDate, f64> {
    let mut merged = BTreeMap::new();
    for month in months {
        merged.extend(month);
    }
    merged
}
