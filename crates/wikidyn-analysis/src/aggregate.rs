use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use wikidyn_core::Revision;

/// How one day's bucket of records collapses into a single value.
pub enum Reducer<T> {
    /// Number of records in the bucket.
    Count,
    /// Median of a numeric field; even-sized buckets average the middle pair.
    Median(fn(&T) -> f64),
    Max(fn(&T) -> f64),
    /// Distinct values across a list-valued field.
    UnionSize(fn(&T) -> &[String]),
}

impl<T> Reducer<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Median(_) => "median",
            Self::Max(_) => "max",
            Self::UnionSize(_) => "union_size",
        }
    }

    fn reduce(&self, bucket: &[&T]) -> f64 {
        match self {
            Self::Count => bucket.len() as f64,
            Self::Median(value_of) => {
                let mut values: Vec<f64> = bucket.iter().map(|record| value_of(*record)).collect();
                median(&mut values)
            }
            Self::Max(value_of) => bucket
                .iter()
                .map(|record| value_of(*record))
                .fold(f64::NEG_INFINITY, f64::max),
            Self::UnionSize(values_of) => {
                let distinct: BTreeSet<&str> = bucket
                    .iter()
                    .flat_map(|record| values_of(*record).iter().map(String::as_str))
                    .collect();
                distinct.len() as f64
            }
        }
    }
}

/// Buckets `records` by `date_of` and reduces each bucket. Dates with no
/// records are absent from the result; empty input gives an empty mapping.
pub fn aggregate_daily<T>(
    records: &[T],
    date_of: impl Fn(&T) -> NaiveDate,
    reducer: &Reducer<T>,
) -> BTreeMap<NaiveDate, f64> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&T>> = BTreeMap::new();
    for record in records {
        buckets.entry(date_of(record)).or_default().push(record);
    }

    let daily: BTreeMap<NaiveDate, f64> = buckets
        .into_iter()
        .map(|(date, bucket)| (date, reducer.reduce(&bucket)))
        .collect();

    tracing::debug!(
        reducer = reducer.name(),
        records = records.len(),
        days = daily.len(),
        "aggregated records by day"
    );
    daily
}

pub fn revision_date(revision: &Revision) -> NaiveDate {
    revision.date()
}

pub fn revision_links(revision: &Revision) -> &[String] {
    &revision.links
}

pub fn median_size() -> Reducer<Revision> {
    Reducer::Median(size_of)
}

pub fn median_words() -> Reducer<Revision> {
    Reducer::Median(words_of)
}

pub fn max_unique_editors() -> Reducer<Revision> {
    Reducer::Max(unique_editors_of)
}

fn size_of(revision: &Revision) -> f64 {
    revision.size_bytes as f64
}

fn words_of(revision: &Revision) -> f64 {
    revision.word_count() as f64
}

fn unique_editors_of(revision: &Revision) -> f64 {
    revision.derived().unique_editor_count as f64
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let middle = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[middle - 1] + values[middle]) / 2.0
    } else {
        values[middle]
    }
}
