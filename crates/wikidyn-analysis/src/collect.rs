use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use wikidyn_config::CollectionConfig;
use wikidyn_core::{
    LogEvent, MarkupLinkExtractor, NoLinks, PageviewRequest, Revision, RevisionQuery,
    UserContribution, WikiSource,
};

use crate::AnalysisError;
use crate::alters::page_alters;
use crate::frame::{MetricsFrame, assemble, assemble_metadata_only};
use crate::normalize::{normalize_contributions, normalize_log_events, normalize_revisions};
use crate::pageviews::{merge_pageviews, months_between, parse_pageview_payload};

/// A page's revisions plus everything its editors did elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorsActivity {
    pub revisions: Vec<Revision>,
    pub contributions: BTreeMap<String, Vec<UserContribution>>,
}

/// Full-history article and talk revisions reduced to the six-column frame
/// over `[min_date, max_date]`.
pub fn editing_dynamics(
    source: &dyn WikiSource,
    config: &CollectionConfig,
    title: &str,
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> Result<MetricsFrame, AnalysisError> {
    let talk_prefix = config
        .talk_prefix(&config.language)
        .ok_or_else(|| AnalysisError::UnknownTalkPrefix(config.language.clone()))?;

    let article = full_history(source, config, title, max_date, true)?;
    let talk = full_history(source, config, &format!("{talk_prefix}{title}"), max_date, true)?;
    tracing::info!(
        title,
        article_revisions = article.len(),
        talk_revisions = talk.len(),
        "collected editing history"
    );

    assemble(&article, &talk, None, min_date, max_date)
}

/// Revision metadata only; yields the `Article, Users, Size` frame.
pub fn editing_dynamics_metadata_only(
    source: &dyn WikiSource,
    config: &CollectionConfig,
    title: &str,
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> Result<MetricsFrame, AnalysisError> {
    let article = full_history(source, config, title, max_date, false)?;
    tracing::info!(title, article_revisions = article.len(), "collected revision metadata");
    assemble_metadata_only(&article, min_date, max_date)
}

/// Fetches the page's revisions in `[start, end]`, then every editor's
/// contributions up to `end`. Editors in `ignore` and synthetic identities
/// (which cannot be queried) are left out.
pub fn editors_other_activity(
    source: &dyn WikiSource,
    title: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    ignore: &BTreeSet<String>,
) -> Result<EditorsActivity, AnalysisError> {
    let raw = source.page_revisions(&RevisionQuery {
        title: title.to_owned(),
        start,
        end,
        include_content: false,
    })?;
    let revisions = normalize_revisions(raw, &NoLinks);

    let synthetic: BTreeSet<&str> = revisions
        .iter()
        .filter(|revision| revision.editor.kind.is_synthetic())
        .map(Revision::editor_name)
        .collect();
    let editors: Vec<String> = page_alters(&revisions)
        .into_keys()
        .filter(|editor| !ignore.contains(editor) && !synthetic.contains(editor.as_str()))
        .collect();

    let mut contributions = BTreeMap::new();
    let total = editors.len();
    for (index, editor) in editors.into_iter().enumerate() {
        tracing::info!(editor = %editor, position = index + 1, total, "fetching editor contributions");
        let raw = source.user_contributions(&editor, end)?;
        contributions.insert(editor, normalize_contributions(raw).records);
    }

    Ok(EditorsActivity {
        revisions,
        contributions,
    })
}

/// Outlinks of `title` and of every page it links to. A failed fetch for one
/// alter is logged and that alter is left out; a failure for `title` itself
/// is an error.
pub fn outlink_neighborhood(
    source: &dyn WikiSource,
    title: &str,
) -> Result<BTreeMap<String, Vec<String>>, AnalysisError> {
    let ego_links = source.page_outlinks(title)?;
    let mut neighborhood = BTreeMap::new();

    for alter in &ego_links {
        if alter == title || neighborhood.contains_key(alter) {
            continue;
        }
        match source.page_outlinks(alter) {
            Ok(links) => {
                neighborhood.insert(alter.clone(), links);
            }
            Err(error) => {
                tracing::warn!(alter = %alter, error = %error, "skipping alter outlinks");
            }
        }
    }

    neighborhood.insert(title.to_owned(), ego_links);
    Ok(neighborhood)
}

/// Categories of `title` minus the configured exclusions.
pub fn page_categories(
    source: &dyn WikiSource,
    config: &CollectionConfig,
    title: &str,
) -> Result<Vec<String>, AnalysisError> {
    let categories = source.page_categories(title)?;
    Ok(categories
        .into_iter()
        .filter(|category| !config.excluded_categories.contains(category))
        .collect())
}

/// Administrative log of `title` since `start`, in time order.
pub fn page_log_events(
    source: &dyn WikiSource,
    title: &str,
    start: DateTime<Utc>,
) -> Result<Vec<LogEvent>, AnalysisError> {
    let raw = source.log_events(title, start)?;
    Ok(normalize_log_events(raw).records)
}

/// Month-by-month pageview fetch merged and clipped to `[min_date, max_date]`.
pub fn daily_pageviews(
    source: &dyn WikiSource,
    language: &str,
    title: &str,
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> Result<BTreeMap<NaiveDate, f64>, AnalysisError> {
    let mut months = Vec::new();
    for (year, month) in months_between(min_date, max_date) {
        let body = source.monthly_pageviews(&PageviewRequest {
            language: language.to_owned(),
            year,
            month,
            title: title.to_owned(),
        })?;
        months.push(parse_pageview_payload(&body)?);
    }

    let merged = merge_pageviews(months);
    Ok(merged
        .range(min_date..=max_date)
        .map(|(date, views)| (*date, *views))
        .collect())
}

fn full_history(
    source: &dyn WikiSource,
    config: &CollectionConfig,
    title: &str,
    max_date: NaiveDate,
    include_content: bool,
) -> Result<Vec<Revision>, AnalysisError> {
    let raw = source.page_revisions(&RevisionQuery {
        title: title.to_owned(),
        start: start_of_day(config.epoch_start),
        end: start_of_day(max_date) + TimeDelta::days(1) - TimeDelta::seconds(1),
        include_content,
    })?;
    if include_content {
        Ok(normalize_revisions(raw, &MarkupLinkExtractor))
    } else {
        Ok(normalize_revisions(raw, &NoLinks))
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
