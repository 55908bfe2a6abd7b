mod contribution;
mod identity;
mod log_event;
mod markup;
mod revision;
mod source;

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

pub use contribution::{RawUserContribution, UserContribution};
pub use identity::{EditorIdentity, EditorKind, is_ipv4, is_masked_ipv4, resolve_editor};
pub use log_event::{Expiry, LogEvent, RawLogEvent, parse_expiry};
pub use markup::{LinkExtractor, MarkupLinkExtractor, NoLinks, count_words};
pub use revision::{DerivedFields, RawRevision, Revision, recompute_derived};
pub use source::{PageviewRequest, RevisionQuery, SourceError, WikiSource};

const MEDIAWIKI_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const COMPACT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// A record that cannot be normalized. Fatal to the record, never to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record has no timestamp")]
    MissingTimestamp,
    #[error("unparseable timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("record is missing required field '{0}'")]
    MissingField(&'static str),
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RecordError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RecordError::MissingTimestamp);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    [MEDIAWIKI_TIMESTAMP_FORMAT, COMPACT_TIMESTAMP_FORMAT]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RecordError::InvalidTimestamp(trimmed.to_owned()))
}

pub fn format_compact_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(COMPACT_TIMESTAMP_FORMAT).to_string()
}

fn required_timestamp(raw: Option<&str>) -> Result<DateTime<Utc>, RecordError> {
    raw.ok_or(RecordError::MissingTimestamp)
        .and_then(parse_timestamp)
}

fn required_text(raw: Option<String>, field: &'static str) -> Result<String, RecordError> {
    raw.map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(RecordError::MissingField(field))
}

fn blake3_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn parses_mediawiki_and_compact_timestamps() {
        let iso = parse_timestamp("2013-04-10T08:15:00Z").expect("iso timestamp");
        assert_eq!((iso.year(), iso.month(), iso.day()), (2013, 4, 10));
        assert_eq!((iso.hour(), iso.minute()), (8, 15));

        let compact = parse_timestamp("20130410081500").expect("compact timestamp");
        assert_eq!(iso, compact);
        assert_eq!(format_compact_timestamp(iso), "20130410081500");
    }

    #[test]
    fn rejects_empty_and_garbage_timestamps() {
        assert_eq!(parse_timestamp("  "), Err(RecordError::MissingTimestamp));
        assert_eq!(
            parse_timestamp("yesterday"),
            Err(RecordError::InvalidTimestamp("yesterday".to_owned()))
        );
        assert_eq!(required_timestamp(None), Err(RecordError::MissingTimestamp));
    }
}
