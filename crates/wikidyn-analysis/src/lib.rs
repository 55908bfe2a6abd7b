mod aggregate;
mod alters;
mod calendar;
mod collect;
mod frame;
mod normalize;
mod pageviews;

use chrono::NaiveDate;
use thiserror::Error;

pub use aggregate::{
    Reducer, aggregate_daily, max_unique_editors, median_size, median_words, revision_links,
    revision_date,
};
pub use alters::{PageAlter, UserAlter, page_alters, user_alters};
pub use calendar::{FillPolicy, MetricSeries, reindex};
pub use collect::{
    EditorsActivity, daily_pageviews, editing_dynamics, editing_dynamics_metadata_only,
    editors_other_activity, outlink_neighborhood, page_categories, page_log_events,
};
pub use frame::{
    MetricColumn, MetricsFrame, PageviewInput, assemble, assemble_metadata_only, csv_file_name,
};
pub use normalize::{
    NormalizeReport, SkippedRecord, normalize_contributions, normalize_log_events,
    normalize_revisions, normalize_revisions_detailed,
};
pub use pageviews::{
    merge_pageviews, months_between, parse_pageview_payload, pageview_url, percent_encode_title,
};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("config error: {0}")]
    Config(#[from] wikidyn_config::ConfigError),
    #[error("source error: {0}")]
    Source(#[from] wikidyn_core::SourceError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("date window is inverted: {min} is after {max}")]
    InvertedWindow { min: NaiveDate, max: NaiveDate },
    #[error("no talk namespace prefix configured for language '{0}'")]
    UnknownTalkPrefix(String),
    #[error("{0}")]
    Message(String),
}
