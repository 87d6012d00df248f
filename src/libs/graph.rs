use crate::libs::hit::{HitRecord, Strand};
use crate::libs::interval::Interval;
use crate::libs::merge::{merge_intervals, HitRef, Side};
use fxhash::FxHashMap;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::{Bfs, EdgeRef, NodeIndexable};
use std::collections::BTreeMap;

/// A union interval on one sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub accession: String,
    pub union: Interval,
    pub hits: Vec<HitRef>,
}

/// A homology edge created from one hit.
///
/// The graph is undirected, but the edge keeps track of which endpoint holds the query side.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub hit: usize,
    pub query: NodeIndex,
    pub subject: NodeIndex,
    pub query_range: Interval,
    pub subject_range: Interval,
    pub bitscore: f64,
    pub strand: Strand,
}

impl Edge {
    /// The aligned interval on `node`, which must be one of the endpoints
    pub fn range_on(&self, node: NodeIndex) -> Interval {
        if node == self.query {
            self.query_range
        } else {
            self.subject_range
        }
    }

    pub fn other(&self, node: NodeIndex) -> NodeIndex {
        if node == self.query {
            self.subject
        } else {
            self.query
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BuildOpt {
    /// Hits with a query or subject span below this are ignored
    pub min_len: u64,
}

impl Default for BuildOpt {
    fn default() -> Self {
        Self { min_len: 20 }
    }
}

pub struct AlignmentGraph {
    pub hits: Vec<HitRecord>,
    pub graph: StableUnGraph<Node, Edge>,
}

impl AlignmentGraph {
    /// Merges hit intervals into union nodes and connects them with one edge per hit.
    pub fn build(hits: Vec<HitRecord>, opt: &BuildOpt) -> Self {
        let total = hits.len();
        let mut n_self = 0;
        let mut n_short = 0;
        let mut hits: Vec<HitRecord> = hits
            .into_iter()
            .filter(|h| {
                if h.is_self() {
                    n_self += 1;
                    false
                } else if h.query_range.span() < opt.min_len || h.subject_range.span() < opt.min_len {
                    n_short += 1;
                    false
                } else {
                    true
                }
            })
            .collect();
        log::debug!(
            "{} hits read, {} self hits and {} short hits dropped",
            total,
            n_self,
            n_short
        );
        hits.sort_by(|a, b| a.cmp_key(b));

        let mut intervals_of: BTreeMap<&str, Vec<(Interval, HitRef)>> = BTreeMap::new();
        for (i, hit) in hits.iter().enumerate() {
            intervals_of
                .entry(hit.query.as_str())
                .or_default()
                .push((hit.query_range, HitRef { hit: i, side: Side::Query }));
            intervals_of
                .entry(hit.subject.as_str())
                .or_default()
                .push((hit.subject_range, HitRef { hit: i, side: Side::Subject }));
        }

        let mut graph: StableUnGraph<Node, Edge> = StableUnGraph::default();
        let mut node_of: FxHashMap<HitRef, NodeIndex> = FxHashMap::default();
        for (accession, mut items) in intervals_of {
            for union_node in merge_intervals(&mut items) {
                let idx = graph.add_node(Node {
                    accession: accession.to_string(),
                    union: union_node.union,
                    hits: union_node.members.clone(),
                });
                for hit_ref in union_node.members {
                    node_of.insert(hit_ref, idx);
                }
            }
        }

        for (i, hit) in hits.iter().enumerate() {
            let query = node_of[&HitRef { hit: i, side: Side::Query }];
            let subject = node_of[&HitRef { hit: i, side: Side::Subject }];
            graph.add_edge(
                query,
                subject,
                Edge {
                    hit: i,
                    query,
                    subject,
                    query_range: hit.query_range,
                    subject_range: hit.subject_range,
                    bitscore: hit.bitscore,
                    strand: hit.strand,
                },
            );
        }
        log::info!(
            "Alignment graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Self { hits, graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.graph[idx]
    }

    pub fn edge(&self, idx: EdgeIndex) -> &Edge {
        &self.graph[idx]
    }

    /// Connected components by breadth-first search, started from the lowest unvisited node.
    ///
    /// Members are sorted by node index; components are ordered by their first member.
    pub fn components(&self) -> Vec<Vec<NodeIndex>> {
        let mut seen = vec![false; self.graph.node_bound()];
        let mut components = vec![];
        for start in self.graph.node_indices() {
            if seen[start.index()] {
                continue;
            }
            let mut members = vec![];
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(n) = bfs.next(&self.graph) {
                seen[n.index()] = true;
                members.push(n);
            }
            members.sort();
            components.push(members);
        }
        components
    }

    /// All edges incident to any of `nodes`, sorted by index
    pub fn incident_edges(&self, nodes: &[NodeIndex]) -> Vec<EdgeIndex> {
        let mut edges: Vec<EdgeIndex> = nodes
            .iter()
            .flat_map(|&n| self.graph.edges(n).map(|e| e.id()))
            .collect();
        edges.sort();
        edges.dedup();
        edges
    }
}
