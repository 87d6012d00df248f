use crate::libs::graph::AlignmentGraph;
use fxhash::FxHashMap;

/// Highest bitscore among the edges of each query sequence
pub fn max_bitscores(graph: &AlignmentGraph) -> FxHashMap<String, f64> {
    let mut max_of: FxHashMap<String, f64> = FxHashMap::default();
    for edge in graph.graph.edge_weights() {
        let query = &graph.node(edge.query).accession;
        let entry = max_of.entry(query.clone()).or_insert(edge.bitscore);
        if edge.bitscore > *entry {
            *entry = edge.bitscore;
        }
    }
    max_of
}

/// Keeps an edge iff `bitscore >= fraction * max_bitscore(query)`.
///
/// Nodes are left in place; the ones without edges end up as singletons.
/// Returns the number of removed edges.
pub fn filter_edges(graph: &mut AlignmentGraph, fraction: f64) -> usize {
    let max_of = max_bitscores(graph);
    let before = graph.edge_count();

    let cutoff: FxHashMap<_, f64> = graph
        .graph
        .edge_indices()
        .map(|e| {
            let query = &graph.node(graph.edge(e).query).accession;
            (e, fraction * max_of[query])
        })
        .collect();
    graph
        .graph
        .retain_edges(|frozen, e| frozen[e].bitscore >= cutoff[&e]);

    let removed = before - graph.edge_count();
    log::info!(
        "Threshold {}: {} of {} edges removed",
        fraction,
        removed,
        before
    );
    removed
}
