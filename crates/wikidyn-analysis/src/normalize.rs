use serde::Serialize;
use wikidyn_core::{
    LinkExtractor, LogEvent, RawLogEvent, RawRevision, RawUserContribution, RecordError, Revision,
    UserContribution, recompute_derived,
};

/// Normalized records plus the ones that were dropped on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Position of the record in the raw input.
    pub index: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: RecordError,
}

/// Sorts by `(page_id, timestamp)` and computes derived fields per page.
/// Malformed records are skipped and logged.
pub fn normalize_revisions(raw: Vec<RawRevision>, extractor: &dyn LinkExtractor) -> Vec<Revision> {
    normalize_revisions_detailed(raw, extractor).records
}

pub fn normalize_revisions_detailed(
    raw: Vec<RawRevision>,
    extractor: &dyn LinkExtractor,
) -> NormalizeReport<Revision> {
    let mut report = normalize_each(raw, "revision", |record| {
        Revision::from_raw(record, extractor)
    });

    report
        .records
        .sort_by(|left, right| (left.page_id, left.timestamp).cmp(&(right.page_id, right.timestamp)));
    for history in report
        .records
        .chunk_by_mut(|left, right| left.page_id == right.page_id)
    {
        recompute_derived(history);
    }

    tracing::debug!(
        revisions = report.records.len(),
        skipped = report.skipped.len(),
        "normalized revisions"
    );
    report
}

/// Contributions come back in edit order.
pub fn normalize_contributions(
    raw: Vec<RawUserContribution>,
) -> NormalizeReport<UserContribution> {
    let mut report = normalize_each(raw, "contribution", UserContribution::from_raw);
    report
        .records
        .sort_by_key(|contribution| contribution.timestamp);
    report
}

pub fn normalize_log_events(raw: Vec<RawLogEvent>) -> NormalizeReport<LogEvent> {
    let mut report = normalize_each(raw, "log_event", LogEvent::from_raw);
    report.records.sort_by_key(|event| event.start_timestamp);
    report
}

fn normalize_each<R, T>(
    raw: Vec<R>,
    kind: &'static str,
    convert: impl Fn(R) -> Result<T, RecordError>,
) -> NormalizeReport<T> {
    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = Vec::new();

    for (index, record) in raw.into_iter().enumerate() {
        match convert(record) {
            Ok(normalized) => records.push(normalized),
            Err(error) => {
                tracing::warn!(kind, index, error = %error, "skipping malformed record");
                skipped.push(SkippedRecord { index, error });
            }
        }
    }

    if records.is_empty() {
        tracing::debug!(kind, "no records to normalize");
    }
    NormalizeReport { records, skipped }
}

fn serialize_display<S>(error: &RecordError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(error)
}
