use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::contribution::RawUserContribution;
use crate::log_event::RawLogEvent;
use crate::revision::RawRevision;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("page not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected payload: {0}")]
    Payload(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionQuery {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Request raw markup with each revision (needed for links and words).
    pub include_content: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageviewRequest {
    pub language: String,
    pub year: i32,
    pub month: u32,
    pub title: String,
}

/// Query collaborator: a MediaWiki client or anything that replays its
/// responses. Implementations own redirects, paging, retries and rate limits;
/// a failed fetch surfaces as an error, never as a partial record set.
pub trait WikiSource {
    fn page_revisions(&self, query: &RevisionQuery) -> Result<Vec<RawRevision>, SourceError>;

    fn user_contributions(
        &self,
        user: &str,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawUserContribution>, SourceError>;

    fn page_outlinks(&self, title: &str) -> Result<Vec<String>, SourceError>;

    fn page_categories(&self, title: &str) -> Result<Vec<String>, SourceError>;

    fn log_events(
        &self,
        title: &str,
        start: DateTime<Utc>,
    ) -> Result<Vec<RawLogEvent>, SourceError>;

    /// Raw JSON body of one month of daily pageviews.
    fn monthly_pageviews(&self, request: &PageviewRequest) -> Result<String, SourceError>;
}
