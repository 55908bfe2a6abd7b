use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use wikidyn_analysis::{
    MetricsFrame, assemble, assemble_metadata_only, normalize_revisions_detailed,
    parse_pageview_payload,
};
use wikidyn_config::WikidynConfig;
use wikidyn_core::{MarkupLinkExtractor, NoLinks, RawRevision, Revision};

use crate::cli::DynamicsArgs;

pub fn run_dynamics_command(config: &WikidynConfig, args: DynamicsArgs) -> Result<()> {
    let frame = build_frame(&args)?;
    let dir = args.out.as_deref().unwrap_or(config.output.dir.as_path());
    let path = frame
        .write_csv(dir, &args.title)
        .with_context(|| format!("failed to write frame for '{}'", args.title))?;
    println!("{}", path.display());
    Ok(())
}

pub fn build_frame(args: &DynamicsArgs) -> Result<MetricsFrame> {
    if args.metadata_only {
        let article = read_revisions(&args.revisions, false)?;
        return assemble_metadata_only(&article, args.start, args.end)
            .context("failed to assemble metadata frame");
    }

    let article = read_revisions(&args.revisions, true)?;
    let talk = match &args.talk {
        Some(path) => read_revisions(path, true)?,
        None => Vec::new(),
    };
    let pageviews = args
        .pageviews
        .as_deref()
        .map(|path| {
            let body = read_input(path)?;
            parse_pageview_payload(&body)
                .with_context(|| format!("invalid pageview payload in {}", path.display()))
        })
        .transpose()?;

    assemble(&article, &talk, pageviews.as_ref(), args.start, args.end)
        .context("failed to assemble metrics frame")
}

fn read_revisions(path: &Path, with_links: bool) -> Result<Vec<Revision>> {
    let raw: Vec<RawRevision> = serde_json::from_str(&read_input(path)?)
        .with_context(|| format!("{} is not a JSON array of revisions", path.display()))?;
    let report = if with_links {
        normalize_revisions_detailed(raw, &MarkupLinkExtractor)
    } else {
        normalize_revisions_detailed(raw, &NoLinks)
    };
    if !report.skipped.is_empty() {
        tracing::warn!(
            path = %path.display(),
            skipped = report.skipped.len(),
            "some revisions were malformed and left out"
        );
    }
    Ok(report.records)
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
