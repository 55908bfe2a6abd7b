use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{RecordError, required_text, required_timestamp};

static EXPIRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(expires\s?([^\)]*)\s\(UTC\)\)").expect("expiry pattern is valid")
});

const EXPIRY_FORMAT: &str = "%H:%M, %d %B %Y";

/// Administrative log entry (`logevents`) as returned upstream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawLogEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    /// Secondary free-text detail; older protection entries put the expiry here.
    #[serde(default, rename = "0")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "at")]
pub enum Expiry {
    Indefinite,
    At(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub action: String,
    pub kind: String,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: Expiry,
    /// The free-text field the expiry was read from, when one mentions it.
    pub expiry_text: Option<String>,
}

impl LogEvent {
    pub fn from_raw(raw: RawLogEvent) -> Result<Self, RecordError> {
        let start_timestamp = required_timestamp(raw.timestamp.as_deref())?;
        let action = required_text(raw.action, "action")?;
        let kind = required_text(raw.kind, "type")?;

        let expiry_text = [raw.comment, raw.detail]
            .into_iter()
            .flatten()
            .find(|text| text.contains("expires"));
        let end_timestamp = expiry_text
            .as_deref()
            .and_then(parse_expiry)
            .map_or(Expiry::Indefinite, Expiry::At);

        Ok(Self {
            action,
            kind,
            start_timestamp,
            end_timestamp,
            expiry_text,
        })
    }
}

/// Reads `(expires 12:00, 15 March 2013 (UTC))` out of a log comment.
pub fn parse_expiry(text: &str) -> Option<DateTime<Utc>> {
    let captured = EXPIRY.captures(text)?.get(1)?.as_str().trim();
    NaiveDateTime::parse_from_str(captured, EXPIRY_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
