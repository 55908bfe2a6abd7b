use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use wikidyn_analysis::{normalize_contributions, normalize_revisions};
use wikidyn_core::{NoLinks, RawRevision, RawUserContribution, UserContribution};
use wikidyn_graph::{
    WikiGraph, category_network, editor_trajectory, hyperlink_network, page_trajectory,
    shared_editing_network, shared_page_editing_network,
};

use crate::cli::{GraphArgs, GraphKind};
use crate::write_json_to_stdout;

pub fn run_graph_command(args: GraphArgs) -> Result<()> {
    let input = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read graph input {}", args.input.display()))?;
    if args.threshold.is_some() && !args.kind.requires_threshold() {
        tracing::warn!(
            kind = args.kind.as_str(),
            "--threshold is ignored for this graph kind"
        );
    }
    let mut graph = build_graph(args.kind, &input, args.threshold)?;
    if let Some(prune) = args.prune {
        graph = graph.pruned(prune);
    }

    tracing::info!(
        kind = args.kind.as_str(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built graph"
    );
    let response =
        serde_json::to_value(graph.export()).context("failed to serialize graph export")?;
    write_json_to_stdout(&response)
}

/// Input shapes: raw revisions for `editor-trajectory`, raw contributions
/// for `page-trajectory`, editor -> raw contributions for the shared-editing
/// kinds, page -> titles for `hyperlink` and `category`.
pub fn build_graph(kind: GraphKind, input: &str, threshold: Option<i64>) -> Result<WikiGraph> {
    let graph = match kind {
        GraphKind::EditorTrajectory => {
            let raw: Vec<RawRevision> = parse_input(kind, input)?;
            editor_trajectory(&normalize_revisions(raw, &NoLinks))
        }
        GraphKind::PageTrajectory => {
            let raw: Vec<RawUserContribution> = parse_input(kind, input)?;
            page_trajectory(&normalize_contributions(raw).records)
        }
        GraphKind::SharedEditing => shared_editing_network(
            &contributions_by_editor(kind, input)?,
            required(kind, threshold)?,
        ),
        GraphKind::SharedPageEditing => shared_page_editing_network(
            &contributions_by_editor(kind, input)?,
            required(kind, threshold)?,
        ),
        GraphKind::Hyperlink => hyperlink_network(&parse_input(kind, input)?),
        GraphKind::Category => category_network(&parse_input(kind, input)?),
    };
    Ok(graph)
}

fn contributions_by_editor(
    kind: GraphKind,
    input: &str,
) -> Result<BTreeMap<String, Vec<UserContribution>>> {
    let raw: BTreeMap<String, Vec<RawUserContribution>> = parse_input(kind, input)?;
    Ok(raw
        .into_iter()
        .map(|(editor, contributions)| (editor, normalize_contributions(contributions).records))
        .collect())
}

fn required(kind: GraphKind, threshold: Option<i64>) -> Result<i64> {
    threshold.ok_or_else(|| anyhow!("--threshold is required for {} graphs", kind.as_str()))
}

fn parse_input<T: DeserializeOwned>(kind: GraphKind, input: &str) -> Result<T> {
    serde_json::from_str(input)
        .with_context(|| format!("input is not a valid {} graph input", kind.as_str()))
}
