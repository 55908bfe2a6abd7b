use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::Serialize;
use wikidyn_analysis::months_between;
use wikidyn_config::PageviewConfig;

use crate::cli::DumpsArgs;
use crate::write_json_to_stdout;

const DUMP_FILE_FORMAT: &str = "pagecounts-%Y%m%d-%H%M%S.gz";
const CHECKSUM_FILE_NAME: &str = "md5sums.txt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpPlan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub months: Vec<DumpMonth>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpMonth {
    pub year: i32,
    pub month: u32,
    pub index_url: String,
    pub checksum_url: String,
    pub local_dir: PathBuf,
    /// Dump files strictly inside the window; empty without a listing.
    pub files: Vec<String>,
}

pub fn run_dumps_command(config: &PageviewConfig, args: DumpsArgs) -> Result<()> {
    let today = Utc::now().date_naive();
    let start = args
        .start
        .unwrap_or_else(|| today - TimeDelta::days(1));
    let end = args.end.unwrap_or(today);
    let dir = args.dir.unwrap_or_else(|| config.data_dir.clone());

    let listing = match &args.listing {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read dump listing {}", path.display()))?
            .lines()
            .map(|line| line.trim().to_owned())
            .filter(|line| !line.is_empty())
            .collect(),
        None => Vec::new(),
    };

    let plan = plan_dumps(config, start, end, today, &dir, &listing)?;
    let response = serde_json::to_value(plan).context("failed to serialize dump plan")?;
    write_json_to_stdout(&response)
}

/// Month index pages, checksum files and local directories for the window,
/// with `listing` narrowed to the dumps that fall inside it.
pub fn plan_dumps(
    config: &PageviewConfig,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    dir: &Path,
    listing: &[String],
) -> Result<DumpPlan> {
    if start < config.dump_floor {
        bail!(
            "time range must start on or after {}",
            config.dump_floor.format("%d %b %Y")
        );
    }
    if end > today {
        bail!("time range must not end after today ({today})");
    }
    if start > end {
        bail!("start {start} is after end {end}");
    }

    let selected = select_dump_files(listing, start, end);
    let months = months_between(start, end)
        .into_iter()
        .map(|(year, month)| {
            let index_url = format!("{}{year:04}/{year:04}-{month:02}/", config.dump_base_url);
            let prefix = format!("pagecounts-{year:04}{month:02}");
            DumpMonth {
                year,
                month,
                checksum_url: format!("{index_url}{CHECKSUM_FILE_NAME}"),
                index_url,
                local_dir: dir.join(format!("{year:04}")).join(format!("{month:02}")),
                files: selected
                    .iter()
                    .filter(|name| name.starts_with(&prefix))
                    .cloned()
                    .collect(),
            }
        })
        .collect();

    Ok(DumpPlan { start, end, months })
}

/// Hourly dump names whose timestamp lies strictly between the start of
/// `start` and the start of `end`. Names that do not parse are ignored.
pub fn select_dump_files(listing: &[String], start: NaiveDate, end: NaiveDate) -> Vec<String> {
    let lower = start.and_time(NaiveTime::MIN);
    let upper = end.and_time(NaiveTime::MIN);

    let mut selected: Vec<String> = listing
        .iter()
        .filter(|name| {
            NaiveDateTime::parse_from_str(name, DUMP_FILE_FORMAT)
                .is_ok_and(|stamp| stamp > lower && stamp < upper)
        })
        .cloned()
        .collect();
    selected.sort();
    selected.dedup();
    selected
}
