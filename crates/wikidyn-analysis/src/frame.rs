use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wikidyn_core::Revision;

use crate::AnalysisError;
use crate::aggregate::{
    Reducer, aggregate_daily, max_unique_editors, median_size, median_words, revision_date,
    revision_links,
};
use crate::calendar::{FillPolicy, MetricSeries, reindex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricColumn {
    Article,
    Talk,
    Users,
    Size,
    Outlinks,
    Words,
    Pageviews,
}

impl MetricColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::Talk => "Talk",
            Self::Users => "Users",
            Self::Size => "Size",
            Self::Outlinks => "Outlinks",
            Self::Words => "Words",
            Self::Pageviews => "Pageviews",
        }
    }

    pub fn fill_policy(self) -> FillPolicy {
        match self {
            Self::Article | Self::Talk => FillPolicy::Zero,
            Self::Users | Self::Size | Self::Outlinks | Self::Words => FillPolicy::ForwardFill,
            Self::Pageviews => FillPolicy::NoneThenDropLeading,
        }
    }

    fn reducer(self) -> Reducer<Revision> {
        match self {
            Self::Article | Self::Talk | Self::Pageviews => Reducer::Count,
            Self::Users => max_unique_editors(),
            Self::Size => median_size(),
            Self::Outlinks => Reducer::UnionSize(revision_links),
            Self::Words => median_words(),
        }
    }
}

/// Daily pageview observations handed to [`assemble`].
pub type PageviewInput = BTreeMap<NaiveDate, f64>;

/// Date-indexed table over `[start, end]`, one independent series per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsFrame {
    start: NaiveDate,
    end: NaiveDate,
    columns: Vec<(MetricColumn, MetricSeries)>,
}

impl MetricsFrame {
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .map(|(column, _)| column.as_str())
            .collect()
    }

    pub fn column(&self, column: MetricColumn) -> Option<&MetricSeries> {
        self.columns
            .iter()
            .find(|(candidate, _)| *candidate == column)
            .map(|(_, series)| series)
    }

    pub fn value(&self, column: MetricColumn, date: NaiveDate) -> Option<f64> {
        self.column(column)?.get(date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|date| *date <= self.end)
    }

    /// Comma-separated rendering: an unnamed date column, then one column
    /// per metric. Undefined cells are left empty.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for name in self.column_names() {
            out.push(',');
            out.push_str(name);
        }
        out.push('\n');

        for date in self.dates() {
            out.push_str(&date.format("%Y-%m-%d").to_string());
            for (_, series) in &self.columns {
                out.push(',');
                if let Some(value) = series.get(date) {
                    out.push_str(&value.to_string());
                }
            }
            out.push('\n');
        }
        out
    }

    /// Writes `<title>.csv` into `dir` and returns the path.
    pub fn write_csv(&self, dir: &Path, title: &str) -> Result<PathBuf, AnalysisError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(csv_file_name(title));
        fs::write(&path, self.to_csv())?;
        tracing::info!(path = %path.display(), rows = self.dates().count(), "wrote metrics frame");
        Ok(path)
    }
}

/// `<title>.csv`, with path separators in the title replaced.
pub fn csv_file_name(title: &str) -> String {
    format!("{}.csv", title.trim().replace(['/', '\\'], "_"))
}

/// Six-column frame (`Article, Talk, Users, Size, Outlinks, Words`), plus
/// `Pageviews` when a pageview mapping is supplied.
pub fn assemble(
    article: &[Revision],
    talk: &[Revision],
    pageviews: Option<&PageviewInput>,
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> Result<MetricsFrame, AnalysisError> {
    let mut columns = Vec::with_capacity(7);
    for column in [
        MetricColumn::Article,
        MetricColumn::Talk,
        MetricColumn::Users,
        MetricColumn::Size,
        MetricColumn::Outlinks,
        MetricColumn::Words,
    ] {
        let records = if column == MetricColumn::Talk {
            talk
        } else {
            article
        };
        columns.push((column, revision_metric(records, column, min_date, max_date)?));
    }

    if let Some(pageviews) = pageviews {
        let column = MetricColumn::Pageviews;
        columns.push((
            column,
            reindex(pageviews, min_date, max_date, column.fill_policy())?,
        ));
    }

    Ok(MetricsFrame {
        start: min_date,
        end: max_date,
        columns,
    })
}

/// Three-column frame (`Article, Users, Size`) for sources that return no
/// content.
pub fn assemble_metadata_only(
    article: &[Revision],
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> Result<MetricsFrame, AnalysisError> {
    let columns = [MetricColumn::Article, MetricColumn::Users, MetricColumn::Size]
        .into_iter()
        .map(|column| {
            revision_metric(article, column, min_date, max_date).map(|series| (column, series))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MetricsFrame {
        start: min_date,
        end: max_date,
        columns,
    })
}

fn revision_metric(
    revisions: &[Revision],
    column: MetricColumn,
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> Result<MetricSeries, AnalysisError> {
    let daily = aggregate_daily(revisions, revision_date, &column.reducer());
    reindex(&daily, min_date, max_date, column.fill_policy())
}
