use std::collections::BTreeMap;

use wikidyn_core::{Revision, UserContribution};

use crate::graph::{Cleanup, EdgeAccumulator, NodeKind, WikiGraph};

/// Editor -> next editor over one article's history, weighted by how often
/// the hand-off happened. Left unpruned: consecutive edits by one editor stay
/// as self-loops until [`WikiGraph::pruned`] runs.
pub fn editor_trajectory(revisions: &[Revision]) -> WikiGraph {
    let mut ordered: Vec<&Revision> = revisions.iter().collect();
    ordered.sort_by_key(|revision| revision.timestamp);

    let mut edges = EdgeAccumulator::new();
    for pair in ordered.windows(2) {
        edges.increment(pair[0].editor_name(), pair[1].editor_name());
    }
    edges.finish(NodeKind::Editor, Cleanup::RAW)
}

/// Page -> next page over one editor's contributions. Left unpruned.
pub fn page_trajectory(contributions: &[UserContribution]) -> WikiGraph {
    let mut edges = EdgeAccumulator::new();
    for pair in in_edit_order(contributions).windows(2) {
        edges.increment(&pair[0].title, &pair[1].title);
    }
    edges.finish(NodeKind::Page, Cleanup::RAW)
}

/// Article -> article network: every editor's consecutive edits add weight to
/// the edge between the two articles. Pruned by `threshold`.
pub fn shared_editing_network(
    contributions_by_editor: &BTreeMap<String, Vec<UserContribution>>,
    threshold: i64,
) -> WikiGraph {
    let cleanup = Cleanup::threshold(threshold);
    let mut edges = EdgeAccumulator::new();
    for contributions in contributions_by_editor.values() {
        for pair in in_edit_order(contributions).windows(2) {
            edges.increment(&pair[0].title, &pair[1].title);
        }
    }
    edges.finish(NodeKind::Page, cleanup)
}

/// Editor -> editor network: editors adjacent in a page's (name-ordered)
/// editor list add weight to the edge between them. Pruned by `threshold`.
pub fn shared_page_editing_network(
    contributions_by_editor: &BTreeMap<String, Vec<UserContribution>>,
    threshold: i64,
) -> WikiGraph {
    let cleanup = Cleanup::threshold(threshold);
    let mut edges = EdgeAccumulator::new();
    for editors in invert_contributions(contributions_by_editor).values() {
        let names: Vec<&str> = editors.keys().map(String::as_str).collect();
        for pair in names.windows(2) {
            edges.increment(pair[0], pair[1]);
        }
    }
    edges.finish(NodeKind::Editor, cleanup)
}

/// Page -> linked page, restricted to the closed 1-step neighborhood: a link
/// only becomes an edge when its target is itself a key of the mapping.
pub fn hyperlink_network(links_by_page: &BTreeMap<String, Vec<String>>) -> WikiGraph {
    let mut edges = EdgeAccumulator::new();
    for (page, links) in links_by_page {
        for link in links.iter().filter(|link| links_by_page.contains_key(*link)) {
            edges.connect(page, link);
        }
    }
    edges.finish(NodeKind::Page, Cleanup::SIMPLE)
}

/// Bipartite page -> category membership graph. Every node carries its kind;
/// a title that is a key of the mapping is a page even when another page
/// lists it as a category.
pub fn category_network(categories_by_page: &BTreeMap<String, Vec<String>>) -> WikiGraph {
    let mut edges = EdgeAccumulator::new();
    for page in categories_by_page.keys() {
        edges.declare(page, NodeKind::Page);
    }
    for (page, categories) in categories_by_page {
        for category in categories {
            edges.declare(category, NodeKind::Category);
            edges.connect(page, category);
        }
    }
    edges.finish(NodeKind::Page, Cleanup::SIMPLE)
}

/// editor -> contributions becomes page -> {editor: edit count}.
pub fn invert_contributions(
    contributions_by_editor: &BTreeMap<String, Vec<UserContribution>>,
) -> BTreeMap<String, BTreeMap<String, u64>> {
    let mut by_page: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for (editor, contributions) in contributions_by_editor {
        for contribution in contributions {
            *by_page
                .entry(contribution.title.clone())
                .or_default()
                .entry(editor.clone())
                .or_insert(0) += 1;
        }
    }
    by_page
}

fn in_edit_order(contributions: &[UserContribution]) -> Vec<&UserContribution> {
    let mut ordered: Vec<&UserContribution> = contributions.iter().collect();
    ordered.sort_by_key(|contribution| contribution.timestamp);
    ordered
}
