use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::identity::{EditorIdentity, resolve_editor};
use crate::markup::{LinkExtractor, count_words};
use crate::{RecordError, required_text, required_timestamp};

/// Revision as returned by the query collaborator.
///
/// Field names accept both the MediaWiki spelling (`pageid`, `revid`, `user`,
/// `size`, `*`) and the canonical one. `userhidden` and `anon` are presence
/// flags upstream; any value counts as set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRevision {
    #[serde(default, alias = "pageid")]
    pub page_id: Option<u64>,
    #[serde(default, alias = "revid")]
    pub revision_id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "editor_identity", alias = "username")]
    pub user: Option<String>,
    #[serde(
        default,
        alias = "userhidden",
        deserialize_with = "deserialize_presence",
        skip_serializing_if = "is_false"
    )]
    pub user_hidden: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_presence",
        skip_serializing_if = "is_false"
    )]
    pub anon: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, alias = "size")]
    pub size_bytes: Option<i64>,
    #[serde(default, alias = "*")]
    pub content: Option<String>,
}

/// Fields that depend on a revision's position within its page history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedFields {
    pub position: usize,
    pub edit_lag: TimeDelta,
    pub bytes_added: i64,
    /// Distinct editors seen up to and including this revision.
    pub unique_editor_count: usize,
    /// Whether this revision's editor enters the distinct-editor set here.
    pub introduces_editor: bool,
    pub article_age: TimeDelta,
}

impl Default for DerivedFields {
    fn default() -> Self {
        Self {
            position: 0,
            edit_lag: TimeDelta::zero(),
            bytes_added: 0,
            unique_editor_count: 0,
            introduces_editor: false,
            article_age: TimeDelta::zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub page_id: u64,
    pub revision_id: Option<u64>,
    pub title: String,
    pub editor: EditorIdentity,
    pub timestamp: DateTime<Utc>,
    pub size_bytes: i64,
    pub content: Option<String>,
    pub links: Vec<String>,
    derived: DerivedFields,
}

impl Revision {
    /// Applies the default-value policies: missing size is 0, missing content
    /// yields no links. Derived fields start zeroed until
    /// [`recompute_derived`] runs over the page history.
    pub fn from_raw(raw: RawRevision, extractor: &dyn LinkExtractor) -> Result<Self, RecordError> {
        let timestamp = required_timestamp(raw.timestamp.as_deref())?;
        let page_id = raw.page_id.ok_or(RecordError::MissingField("page_id"))?;
        let editor = resolve_editor(&raw)?;
        let title = required_text(raw.title, "title")?;
        let links = raw
            .content
            .as_deref()
            .map(|content| extractor.extract_links(content))
            .unwrap_or_default();

        Ok(Self {
            page_id,
            revision_id: raw.revision_id,
            title,
            editor,
            timestamp,
            size_bytes: raw.size_bytes.unwrap_or(0),
            content: raw.content,
            links,
            derived: DerivedFields::default(),
        })
    }

    pub fn editor_name(&self) -> &str {
        &self.editor.name
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn derived(&self) -> &DerivedFields {
        &self.derived
    }

    pub fn word_count(&self) -> usize {
        self.content.as_deref().map(count_words).unwrap_or(0)
    }
}

/// Recomputes derived fields for one page's history in its current order.
/// Callers sort ascending by timestamp first.
pub fn recompute_derived(history: &mut [Revision]) {
    let Some(origin) = history.first().map(|revision| revision.timestamp) else {
        return;
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut previous: Option<(DateTime<Utc>, i64)> = None;

    for (position, revision) in history.iter_mut().enumerate() {
        let introduces_editor = seen.insert(revision.editor.name.clone());
        let (edit_lag, bytes_added) = match previous {
            Some((timestamp, size)) => (revision.timestamp - timestamp, revision.size_bytes - size),
            None => (TimeDelta::zero(), revision.size_bytes),
        };

        revision.derived = DerivedFields {
            position,
            edit_lag,
            bytes_added,
            unique_editor_count: seen.len(),
            introduces_editor,
            article_age: revision.timestamp - origin,
        };
        previous = Some((revision.timestamp, revision.size_bytes));
    }
}

fn deserialize_presence<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IgnoredAny>::deserialize(deserializer)?.is_some())
}

fn is_false(value: &bool) -> bool {
    !*value
}
