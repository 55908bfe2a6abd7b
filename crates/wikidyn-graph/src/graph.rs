use std::collections::{BTreeMap, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Page,
    Category,
    Editor,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Category => "category",
            Self::Editor => "editor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    pub kind: NodeKind,
}

/// Edge predicates applied when an accumulated edge set becomes a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cleanup {
    pub min_weight: Option<i64>,
    pub drop_self_loops: bool,
}

impl Cleanup {
    /// Keeps every accumulated edge, self-loops included.
    pub const RAW: Self = Self {
        min_weight: None,
        drop_self_loops: false,
    };

    pub const SIMPLE: Self = Self {
        min_weight: None,
        drop_self_loops: true,
    };

    /// Edges survive iff `weight >= threshold` and they are not self-loops.
    /// A threshold of zero or below keeps every weight.
    pub fn threshold(threshold: i64) -> Self {
        if threshold <= 0 {
            tracing::warn!(
                threshold,
                "graph threshold <= 0 keeps every edge; result equals the unthresholded graph"
            );
        }
        Self {
            min_weight: Some(threshold),
            drop_self_loops: true,
        }
    }

    fn keeps(&self, source: &str, target: &str, weight: u64) -> bool {
        let heavy_enough = self
            .min_weight
            .is_none_or(|min| i128::from(weight) >= i128::from(min));
        heavy_enough && !(self.drop_self_loops && source == target)
    }
}

/// Weighted edge multiset built up before any cleanup runs.
#[derive(Debug, Clone, Default)]
pub struct EdgeAccumulator {
    weights: BTreeMap<(String, String), u64>,
    kinds: BTreeMap<String, NodeKind>,
}

impl EdgeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation of `source -> target`.
    pub fn increment(&mut self, source: &str, target: &str) {
        *self
            .weights
            .entry((source.to_owned(), target.to_owned()))
            .or_insert(0) += 1;
    }

    /// Records that `source -> target` exists without accumulating weight.
    pub fn connect(&mut self, source: &str, target: &str) {
        self.weights
            .entry((source.to_owned(), target.to_owned()))
            .or_insert(1);
    }

    /// First declaration wins.
    pub fn declare(&mut self, name: &str, kind: NodeKind) {
        self.kinds.entry(name.to_owned()).or_insert(kind);
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight(&self, source: &str, target: &str) -> Option<u64> {
        self.weights
            .get(&(source.to_owned(), target.to_owned()))
            .copied()
    }

    /// Filters the accumulated edges through `cleanup` and builds the graph
    /// from the survivors. Nodes exist only as endpoints of surviving edges,
    /// so isolates never appear.
    pub fn finish(self, default_kind: NodeKind, cleanup: Cleanup) -> WikiGraph {
        let accumulated = self.weights.len();
        let surviving = self
            .weights
            .iter()
            .filter(|((source, target), weight)| cleanup.keeps(source, target, **weight))
            .map(|((source, target), weight)| (source.as_str(), target.as_str(), *weight));
        let graph = WikiGraph::from_edges(surviving, |name| {
            self.kinds.get(name).copied().unwrap_or(default_kind)
        });

        tracing::debug!(
            accumulated,
            surviving = graph.edge_count(),
            nodes = graph.node_count(),
            "built graph from accumulated edges"
        );
        graph
    }
}

/// Finished directed graph. Read-only once built; `pruned` returns a new one.
#[derive(Debug, Clone, Default)]
pub struct WikiGraph {
    graph: DiGraph<GraphNode, u64>,
    index: HashMap<String, NodeIndex>,
}

impl WikiGraph {
    fn from_edges<'a>(
        edges: impl Iterator<Item = (&'a str, &'a str, u64)>,
        kind_of: impl Fn(&str) -> NodeKind,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut index: HashMap<String, NodeIndex> = HashMap::new();

        let mut node_for = |graph: &mut DiGraph<GraphNode, u64>, name: &str| -> NodeIndex {
            if let Some(existing) = index.get(name) {
                return *existing;
            }
            let idx = graph.add_node(GraphNode {
                name: name.to_owned(),
                kind: kind_of(name),
            });
            index.insert(name.to_owned(), idx);
            idx
        };

        for (source, target, weight) in edges {
            let from = node_for(&mut graph, source);
            let to = node_for(&mut graph, target);
            graph.add_edge(from, to, weight);
        }

        Self { graph, index }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node_kind(&self, name: &str) -> Option<NodeKind> {
        self.index.get(name).map(|idx| self.graph[*idx].kind)
    }

    pub fn edge_weight(&self, source: &str, target: &str) -> Option<u64> {
        let from = *self.index.get(source)?;
        let to = *self.index.get(target)?;
        self.graph
            .find_edge(from, to)
            .map(|edge| self.graph[edge])
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edge_weight(source, target).is_some()
    }

    pub fn out_degree(&self, name: &str) -> usize {
        self.degree(name, Direction::Outgoing)
    }

    pub fn in_degree(&self, name: &str) -> usize {
        self.degree(name, Direction::Incoming)
    }

    fn degree(&self, name: &str, direction: Direction) -> usize {
        self.index
            .get(name)
            .map(|idx| self.graph.edges_directed(*idx, direction).count())
            .unwrap_or(0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, u64)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].name.as_str(),
                self.graph[edge.target()].name.as_str(),
                *edge.weight(),
            )
        })
    }

    pub fn has_self_loops(&self) -> bool {
        self.graph
            .edge_references()
            .any(|edge| edge.source() == edge.target())
    }

    /// Threshold, self-loop and isolate cleanup over a copy of this graph.
    pub fn pruned(&self, threshold: i64) -> WikiGraph {
        let cleanup = Cleanup::threshold(threshold);
        let surviving = self
            .edges()
            .filter(|(source, target, weight)| cleanup.keeps(source, target, *weight));
        WikiGraph::from_edges(surviving, |name| {
            self.node_kind(name).unwrap_or(NodeKind::Page)
        })
    }

    pub fn as_petgraph(&self) -> &DiGraph<GraphNode, u64> {
        &self.graph
    }

    /// Node-link shape handed to export collaborators, sorted for stable output.
    pub fn export(&self) -> GraphExport {
        let mut nodes: Vec<GraphNode> = self.nodes().cloned().collect();
        nodes.sort_by(|left, right| left.name.cmp(&right.name));

        let mut edges: Vec<ExportEdge> = self
            .edges()
            .map(|(source, target, weight)| ExportEdge {
                source: source.to_owned(),
                target: target.to_owned(),
                weight,
            })
            .collect();
        edges.sort_by(|left, right| {
            (left.source.as_str(), left.target.as_str())
                .cmp(&(right.source.as_str(), right.target.as_str()))
        });

        GraphExport {
            directed: true,
            nodes,
            edges,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub directed: bool,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<ExportEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEdge {
    pub source: String,
    pub target: String,
    pub weight: u64,
}
