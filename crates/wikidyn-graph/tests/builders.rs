use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use wikidyn_core::{NoLinks, RawRevision, Revision, UserContribution};
use wikidyn_graph::{
    NodeKind, category_network, editor_trajectory, hyperlink_network, invert_contributions,
    page_trajectory, shared_editing_network, shared_page_editing_network,
};

fn contribution(title: &str, day: u32) -> UserContribution {
    UserContribution {
        title: title.to_owned(),
        timestamp: Utc
            .with_ymd_and_hms(2013, 4, day, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
        size_diff: 0,
        namespace: 0,
        revision_id: None,
    }
}

fn revision(user: &str, timestamp: &str) -> Revision {
    Revision::from_raw(
        RawRevision {
            page_id: Some(1),
            title: Some("X".to_owned()),
            user: Some(user.to_owned()),
            timestamp: Some(timestamp.to_owned()),
            ..RawRevision::default()
        },
        &NoLinks,
    )
    .expect("valid revision")
}

fn two_editor_contributions() -> BTreeMap<String, Vec<UserContribution>> {
    BTreeMap::from([
        (
            "u1".to_owned(),
            vec![contribution("X", 1), contribution("Y", 2)],
        ),
        (
            "u2".to_owned(),
            vec![
                contribution("Y", 3),
                contribution("Z", 4),
                contribution("Y", 5),
            ],
        ),
    ])
}

#[test]
fn shared_editing_network_keeps_edges_at_threshold_one() {
    let graph = shared_editing_network(&two_editor_contributions(), 1);

    assert_eq!(graph.edge_weight("X", "Y"), Some(1));
    assert_eq!(graph.edge_weight("Y", "Z"), Some(1));
    assert_eq!(graph.edge_weight("Z", "Y"), Some(1));
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.node_kind("X"), Some(NodeKind::Page));
}

#[test]
fn shared_editing_network_is_empty_at_threshold_two() {
    let graph = shared_editing_network(&two_editor_contributions(), 2);
    assert!(graph.is_empty());
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn shared_editing_network_walks_contributions_in_edit_order() {
    let contributions = BTreeMap::from([(
        "u1".to_owned(),
        vec![contribution("B", 2), contribution("A", 1), contribution("A", 3)],
    )]);
    let graph = shared_editing_network(&contributions, 1);

    assert!(graph.contains_edge("A", "B"));
    assert!(graph.contains_edge("B", "A"));
    assert!(!graph.has_self_loops());
}

#[test]
fn shared_editing_network_removes_self_loops_and_isolates() {
    let contributions = BTreeMap::from([
        (
            "u1".to_owned(),
            vec![contribution("A", 1), contribution("A", 2), contribution("A", 3)],
        ),
        ("u2".to_owned(), vec![contribution("B", 1), contribution("C", 2)]),
    ]);
    let graph = shared_editing_network(&contributions, 1);

    assert!(!graph.contains_node("A"));
    assert_eq!(graph.edge_weight("B", "C"), Some(1));
    for node in graph.nodes() {
        assert!(graph.in_degree(&node.name) + graph.out_degree(&node.name) >= 1);
    }
    for (_, _, weight) in graph.edges() {
        assert!(weight >= 1);
    }
}

#[test]
fn hyperlink_network_stays_inside_the_one_step_neighborhood() {
    let links = BTreeMap::from([
        ("A".to_owned(), vec!["B".to_owned(), "C".to_owned()]),
        ("B".to_owned(), vec!["A".to_owned(), "B".to_owned()]),
    ]);
    let graph = hyperlink_network(&links);

    assert!(graph.contains_edge("A", "B"));
    assert!(graph.contains_edge("B", "A"));
    assert!(!graph.contains_edge("A", "C"));
    assert!(!graph.contains_node("C"));
    assert!(!graph.has_self_loops());
    assert_eq!(graph.edge_weight("A", "B"), Some(1));
}

#[test]
fn hyperlink_network_does_not_accumulate_duplicate_links() {
    let links = BTreeMap::from([
        ("A".to_owned(), vec!["B".to_owned(), "B".to_owned()]),
        ("B".to_owned(), Vec::new()),
    ]);
    let graph = hyperlink_network(&links);
    assert_eq!(graph.edge_weight("A", "B"), Some(1));
}

#[test]
fn category_network_tags_every_node_with_its_kind() {
    let categories = BTreeMap::from([
        (
            "Boston Marathon".to_owned(),
            vec![
                "Category:Marathons".to_owned(),
                "Category:Sport in Boston".to_owned(),
            ],
        ),
        ("Copley Square".to_owned(), vec!["Category:Sport in Boston".to_owned()]),
        ("Orphan".to_owned(), Vec::new()),
    ]);
    let graph = category_network(&categories);

    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.node_kind("Boston Marathon"), Some(NodeKind::Page));
    assert_eq!(graph.node_kind("Copley Square"), Some(NodeKind::Page));
    assert_eq!(
        graph.node_kind("Category:Sport in Boston"),
        Some(NodeKind::Category)
    );
    assert_eq!(graph.in_degree("Category:Sport in Boston"), 2);
    assert!(!graph.contains_node("Orphan"));

    let export = graph.export();
    assert!(export.directed);
    assert_eq!(export.nodes.len(), 4);
    assert!(
        export
            .nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Category)
            .all(|node| node.name.starts_with("Category:"))
    );
}

#[test]
fn category_network_keeps_page_kind_for_categorized_keys() {
    let categories = BTreeMap::from([
        ("A".to_owned(), vec!["B".to_owned()]),
        ("B".to_owned(), vec!["C".to_owned()]),
    ]);
    let graph = category_network(&categories);

    assert_eq!(graph.node_kind("A"), Some(NodeKind::Page));
    assert_eq!(graph.node_kind("B"), Some(NodeKind::Page));
    assert_eq!(graph.node_kind("C"), Some(NodeKind::Category));
    assert_eq!(graph.out_degree("B"), 1);
    assert_eq!(graph.in_degree("B"), 1);
}

#[test]
fn editor_trajectory_keeps_self_loops_until_pruned() {
    let revisions = vec![
        revision("u1", "2013-04-01T00:00:00Z"),
        revision("u1", "2013-04-02T00:00:00Z"),
        revision("u2", "2013-04-03T00:00:00Z"),
    ];
    let graph = editor_trajectory(&revisions);

    assert!(graph.has_self_loops());
    assert_eq!(graph.edge_weight("u1", "u1"), Some(1));

    let pruned = graph.pruned(1);
    assert!(!pruned.has_self_loops());
    assert_eq!(pruned.edge_weight("u1", "u2"), Some(1));
}

#[test]
fn editor_trajectory_accumulates_hand_offs_in_time_order() {
    let revisions = vec![
        revision("u1", "2013-04-03T00:00:00Z"),
        revision("u2", "2013-04-01T00:00:00Z"),
        revision("u1", "2013-04-02T00:00:00Z"),
        revision("u2", "2013-04-04T00:00:00Z"),
        revision("u2", "2013-04-05T00:00:00Z"),
    ];
    // time order: u2, u1, u1, u2, u2
    let graph = editor_trajectory(&revisions);

    assert_eq!(graph.edge_weight("u2", "u1"), Some(1));
    assert_eq!(graph.edge_weight("u1", "u1"), Some(1));
    assert_eq!(graph.edge_weight("u1", "u2"), Some(1));
    assert_eq!(graph.edge_weight("u2", "u2"), Some(1));
    assert_eq!(graph.node_kind("u1"), Some(NodeKind::Editor));

    let pruned = graph.pruned(1);
    assert!(!pruned.has_self_loops());
    assert_eq!(pruned.edge_count(), 2);
}

#[test]
fn editor_trajectory_of_single_revision_is_empty() {
    let graph = editor_trajectory(&[revision("u1", "2013-04-03T00:00:00Z")]);
    assert!(graph.is_empty());
}

#[test]
fn page_trajectory_follows_one_editor() {
    let contributions = vec![
        contribution("A", 1),
        contribution("B", 2),
        contribution("A", 3),
        contribution("B", 4),
    ];
    let graph = page_trajectory(&contributions);
    assert_eq!(graph.edge_weight("A", "B"), Some(2));
    assert_eq!(graph.edge_weight("B", "A"), Some(1));
}

#[test]
fn invert_contributions_counts_edits_per_page_and_editor() {
    let inverted = invert_contributions(&two_editor_contributions());
    assert_eq!(inverted["Y"]["u1"], 1);
    assert_eq!(inverted["Y"]["u2"], 2);
    assert_eq!(inverted["X"].len(), 1);
}

#[test]
fn shared_page_editing_network_links_co_editors() {
    let graph = shared_page_editing_network(&two_editor_contributions(), 1);
    // only page Y has two editors: u1 -> u2
    assert_eq!(graph.edge_weight("u1", "u2"), Some(1));
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.node_kind("u2"), Some(NodeKind::Editor));

    assert!(shared_page_editing_network(&two_editor_contributions(), 2).is_empty());
}
