use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Absence means no activity that day.
    Zero,
    /// Carry the nearest earlier observation, including one from before the
    /// window; undefined until something has been observed.
    ForwardFill,
    /// Gaps stay undefined and the series starts at its first observation.
    NoneThenDropLeading,
}

impl FillPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::ForwardFill => "forward_fill",
            Self::NoneThenDropLeading => "none_then_drop_leading",
        }
    }
}

/// One value slot per consecutive day from `start`. `None` is undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    start: NaiveDate,
    values: Vec<Option<f64>>,
}

impl MetricSeries {
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        let days = i64::try_from(self.values.len()).ok()?.checked_sub(1)?;
        self.start.checked_add_signed(TimeDelta::days(days))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// `None` both for undefined days and days outside the series.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        let offset = usize::try_from((date - self.start).num_days()).ok()?;
        self.values.get(offset).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.start.iter_days().zip(self.values.iter().copied())
    }

    pub fn is_all_undefined(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Lays `sparse` onto every day of `[min_date, max_date]`.
///
/// An empty mapping gives an all-undefined series over the whole window for
/// every policy, so callers can tell "no data" from "zero activity".
pub fn reindex(
    sparse: &BTreeMap<NaiveDate, f64>,
    min_date: NaiveDate,
    max_date: NaiveDate,
    policy: FillPolicy,
) -> Result<MetricSeries, AnalysisError> {
    if min_date > max_date {
        return Err(AnalysisError::InvertedWindow {
            min: min_date,
            max: max_date,
        });
    }
    let days = min_date.iter_days().take_while(|date| *date <= max_date);

    if sparse.is_empty() {
        tracing::debug!(
            policy = policy.as_str(),
            %min_date,
            %max_date,
            "no observations; series is undefined"
        );
        return Ok(MetricSeries {
            start: min_date,
            values: days.map(|_| None).collect(),
        });
    }

    let series = match policy {
        FillPolicy::Zero => MetricSeries {
            start: min_date,
            values: days
                .map(|date| Some(sparse.get(&date).copied().unwrap_or(0.0)))
                .collect(),
        },
        FillPolicy::ForwardFill => {
            let mut carried = sparse.range(..min_date).next_back().map(|(_, value)| *value);
            let values = days
                .map(|date| {
                    if let Some(observed) = sparse.get(&date) {
                        carried = Some(*observed);
                    }
                    carried
                })
                .collect();
            MetricSeries {
                start: min_date,
                values,
            }
        }
        FillPolicy::NoneThenDropLeading => {
            let first_observed = sparse
                .range(min_date..=max_date)
                .next()
                .map(|(date, _)| *date)
                .unwrap_or(min_date);
            MetricSeries {
                start: first_observed,
                values: first_observed
                    .iter_days()
                    .take_while(|date| *date <= max_date)
                    .map(|date| sparse.get(&date).copied())
                    .collect(),
            }
        }
    };
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2013, 4, day).expect("valid date")
    }

    #[test]
    fn zero_fill_covers_every_day_in_window() {
        let sparse = BTreeMap::from([(day(2), 3.0), (day(5), 1.0)]);
        let series = reindex(&sparse, day(1), day(6), FillPolicy::Zero).expect("reindex");

        assert_eq!(series.len(), 6);
        assert_eq!(
            series.values(),
            &[Some(0.0), Some(3.0), Some(0.0), Some(0.0), Some(1.0), Some(0.0)]
        );
        assert_eq!(
            series
                .values()
                .iter()
                .filter(|value| **value != Some(0.0))
                .count(),
            sparse.len()
        );
        assert_eq!(series.end(), Some(day(6)));
    }

    #[test]
    fn forward_fill_is_undefined_until_first_observation() {
        let sparse = BTreeMap::from([(day(3), 10.0), (day(5), 12.0)]);
        let series = reindex(&sparse, day(1), day(6), FillPolicy::ForwardFill).expect("reindex");

        assert_eq!(
            series.values(),
            &[None, None, Some(10.0), Some(10.0), Some(12.0), Some(12.0)]
        );
        for value in series.values().iter().flatten() {
            assert!(sparse.values().any(|observed| observed == value));
        }
    }

    #[test]
    fn forward_fill_seeds_from_observations_before_the_window() {
        let sparse = BTreeMap::from([(day(1), 7.0), (day(4), 9.0), (day(20), 1.0)]);
        let series = reindex(&sparse, day(3), day(5), FillPolicy::ForwardFill).expect("reindex");

        assert_eq!(series.values(), &[Some(7.0), Some(9.0), Some(9.0)]);
        assert_eq!(series.get(day(3)), Some(7.0));
    }

    #[test]
    fn none_then_drop_leading_moves_the_start() {
        let sparse = BTreeMap::from([(day(3), 40.0), (day(5), 44.0)]);
        let series =
            reindex(&sparse, day(1), day(6), FillPolicy::NoneThenDropLeading).expect("reindex");

        assert_eq!(series.start(), day(3));
        assert_eq!(series.values(), &[Some(40.0), None, Some(44.0), None]);
        assert_eq!(series.get(day(1)), None);
    }

    #[test]
    fn empty_mapping_is_all_undefined_for_every_policy() {
        let empty = BTreeMap::new();
        for policy in [
            FillPolicy::Zero,
            FillPolicy::ForwardFill,
            FillPolicy::NoneThenDropLeading,
        ] {
            let series = reindex(&empty, day(1), day(3), policy).expect("reindex");
            assert_eq!(series.len(), 3, "{}", policy.as_str());
            assert!(series.is_all_undefined());
        }
    }

    #[test]
    fn single_day_window_and_inverted_window() {
        let sparse = BTreeMap::from([(day(2), 5.0)]);
        let series = reindex(&sparse, day(2), day(2), FillPolicy::Zero).expect("reindex");
        assert_eq!(series.values(), &[Some(5.0)]);

        let inverted = reindex(&sparse, day(3), day(2), FillPolicy::Zero);
        assert!(matches!(
            inverted,
            Err(AnalysisError::InvertedWindow { .. })
        ));
    }
}
