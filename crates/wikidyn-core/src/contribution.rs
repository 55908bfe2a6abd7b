use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{RecordError, required_text, required_timestamp};

/// One entry of an editor's contribution list (`usercontribs`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawUserContribution {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, alias = "sizediff")]
    pub size_diff: Option<i64>,
    #[serde(default, alias = "ns")]
    pub namespace: Option<i64>,
    #[serde(default, alias = "revid")]
    pub revision_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContribution {
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub size_diff: i64,
    pub namespace: i64,
    pub revision_id: Option<u64>,
}

impl UserContribution {
    pub fn from_raw(raw: RawUserContribution) -> Result<Self, RecordError> {
        let timestamp = required_timestamp(raw.timestamp.as_deref())?;
        let title = required_text(raw.title, "title")?;
        Ok(Self {
            title,
            timestamp,
            size_diff: raw.size_diff.unwrap_or(0),
            namespace: raw.namespace.unwrap_or(0),
            revision_id: raw.revision_id,
        })
    }
}
