//! Splitting the filtered alignment graph into maximal collinear groups.
//!
//! Every connected component is laid out on a common column axis: a block at node `v` maps
//! genomic position `p` to column `o(v) * p + c(v)`, with `o(v)` its orientation relative to
//! the reference block. The layout comes from a maximum-bitscore spanning tree. Edges that do
//! not fit the layout, and same-sequence blocks that collide on it, are conflicts; the weakest
//! edge behind a conflict is removed and the affected component is split again, until every
//! piece is consistent.
//!
//! All column arithmetic uses doubled coordinates, so interval midpoints stay integral.

use crate::libs::block::{Block, Direction, Mhg};
use crate::libs::error::{MhgError, Result};
use crate::libs::graph::AlignmentGraph;
use crate::libs::interval::Interval;
use fxhash::FxHashMap;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::{Bfs, EdgeRef, NodeIndexable};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

#[derive(Debug, Clone, Copy)]
pub struct PartitionOpt {
    /// Largest disagreement, in bases, tolerated between two placements of the same column
    pub max_shift: u64,
}

impl Default for PartitionOpt {
    fn default() -> Self {
        Self { max_shift: 50 }
    }
}

/// A stabilized, internally consistent component
#[derive(Debug, Clone)]
pub struct Group {
    /// Spanning-tree discovery order; the first one is the reference block
    pub nodes: Vec<NodeIndex>,
    pub directions: Vec<Direction>,
    pub homology: Vec<Interval>,
    /// Surviving edges, sorted
    pub edges: Vec<EdgeIndex>,
    /// Sum of the surviving edges' bitscores
    pub score: f64,
}

impl Group {
    pub fn to_mhg(&self, frozen: &AlignmentGraph) -> Mhg {
        let blocks = self
            .nodes
            .iter()
            .zip(&self.directions)
            .zip(&self.homology)
            .map(|((&n, &direction), &homology)| {
                let node = frozen.node(n);
                Block {
                    accession: node.accession.clone(),
                    union: node.union,
                    homology,
                    direction,
                }
            })
            .collect();
        Mhg { blocks }
    }
}

/// Partitions the frozen graph into MHGs.
///
/// Components are processed in parallel on the current rayon pool. Groups with fewer than two
/// blocks are dropped. The result is sorted by the first block's accession and start.
pub fn partition(frozen: &AlignmentGraph, opt: &PartitionOpt) -> Result<Vec<Mhg>> {
    let components = frozen.components();
    log::info!("{} connected components", components.len());

    let stabilized: Vec<Vec<Group>> = components
        .par_iter()
        .enumerate()
        .map(|(i, nodes)| {
            if nodes.len() < 2 {
                return Ok(vec![]);
            }
            let edges = frozen.incident_edges(nodes);
            stabilize(frozen, i, nodes, &edges, opt)
        })
        .collect::<Result<Vec<_>>>()?;

    let groups: Vec<Group> = stabilized
        .into_iter()
        .flatten()
        .filter(|g| g.nodes.len() >= 2)
        .collect();
    let mut groups = resolve_overlaps(frozen, groups, opt)?;
    groups.sort_by_key(|g| g.nodes[0]);
    log::info!("{} MHGs", groups.len());

    Ok(groups.iter().map(|g| g.to_mhg(frozen)).collect())
}

/// Runs the remove-weakest-edge loop on one component until all its pieces are consistent.
///
/// `nodes` and `edges` select the subgraph of `frozen` to work on; edges with an endpoint
/// outside `nodes` are ignored. Singleton pieces are returned too.
pub fn stabilize(
    frozen: &AlignmentGraph,
    component: usize,
    nodes: &[NodeIndex],
    edges: &[EdgeIndex],
    opt: &PartitionOpt,
) -> Result<Vec<Group>> {
    let mut local = LocalGraph::new(frozen, nodes, edges);
    let budget = local.graph.edge_count();
    let mut removed = 0;

    let all: Vec<LocalNode> = local.graph.node_indices().collect();
    let mut queue = local.split(&all);
    let mut stable = vec![];

    while let Some(members) = queue.pop() {
        match local.check(&members, opt) {
            Check::Consistent(group) => stable.push(group),
            Check::Conflict(responsible) => {
                let weakest = responsible
                    .into_iter()
                    .min_by(|&a, &b| local.cmp_strength(a, b));
                let weakest = match weakest {
                    Some(e) if removed < budget => e,
                    _ => {
                        return Err(MhgError::ConflictUnresolvable { component, removed });
                    }
                };
                log::trace!(
                    "component {}: removing edge {} (bitscore {})",
                    component,
                    local.graph[weakest].index(),
                    local.bitscore(weakest)
                );
                local.graph.remove_edge(weakest);
                removed += 1;
                queue.extend(local.split(&members));
            }
        }
    }

    if removed > 0 {
        log::debug!(
            "component {}: {} of {} edges removed, {} pieces",
            component,
            removed,
            budget,
            stable.len()
        );
    }
    stable.sort_by_key(|g| g.nodes[0]);

    Ok(stable)
}

/// Keeps the highest-scoring of any groups claiming overlapping homology on one sequence.
///
/// A losing group gives up its clashing blocks; the rest of it is stabilized again and
/// competes in the next round.
pub fn resolve_overlaps(
    frozen: &AlignmentGraph,
    groups: Vec<Group>,
    opt: &PartitionOpt,
) -> Result<Vec<Group>> {
    let mut claimed: BTreeMap<&str, Vec<Interval>> = BTreeMap::new();
    let mut accepted = vec![];
    let mut pending = groups;
    let mut round = 0;

    while !pending.is_empty() {
        pending.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.nodes[0].cmp(&b.nodes[0])));
        let mut reopened = vec![];

        for group in pending.drain(..) {
            let clashing: Vec<bool> = group
                .nodes
                .iter()
                .zip(&group.homology)
                .map(|(&n, h)| {
                    claimed
                        .get(frozen.node(n).accession.as_str())
                        .map(|ivs| ivs.iter().any(|iv| iv.overlaps(h)))
                        .unwrap_or(false)
                })
                .collect();

            if !clashing.contains(&true) {
                for (&n, &h) in group.nodes.iter().zip(&group.homology) {
                    claimed
                        .entry(frozen.node(n).accession.as_str())
                        .or_default()
                        .push(h);
                }
                accepted.push(group);
                continue;
            }

            let mut keep: Vec<NodeIndex> = group
                .nodes
                .iter()
                .zip(&clashing)
                .filter(|(_, &c)| !c)
                .map(|(&n, _)| n)
                .collect();
            log::debug!(
                "group at node {} lost {} blocks to a higher-scoring group",
                group.nodes[0].index(),
                group.nodes.len() - keep.len()
            );
            if keep.len() < 2 {
                continue;
            }
            keep.sort();
            let pieces = stabilize(frozen, round, &keep, &group.edges, opt)?;
            reopened.extend(pieces.into_iter().filter(|g| g.nodes.len() >= 2));
        }

        pending = reopened;
        round += 1;
    }

    Ok(accepted)
}

type LocalNode = NodeIndex;
type LocalEdge = EdgeIndex;

/// Mutable copy of a component. Weights are handles into the frozen graph.
struct LocalGraph<'a> {
    frozen: &'a AlignmentGraph,
    graph: StableUnGraph<NodeIndex, EdgeIndex>,
}

enum Check {
    Consistent(Group),
    Conflict(Vec<LocalEdge>),
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    orient: i64,
    offset: i64,
    parent: Option<(LocalNode, LocalEdge)>,
    depth: usize,
}

impl Placement {
    fn column(&self, pos2: i64) -> i64 {
        self.orient * pos2 + self.offset
    }

    /// Column range of an interval, low end first
    fn project(&self, iv: &Interval) -> (i64, i64) {
        let a = self.column(2 * iv.start as i64);
        let b = self.column(2 * iv.end as i64);
        (a.min(b), a.max(b))
    }
}

/// Spanning-tree frontier entry; the heap pops the highest bitscore, then the lowest index
struct Candidate {
    bitscore: f64,
    edge: EdgeIndex,
    local: LocalEdge,
    from: LocalNode,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bitscore
            .total_cmp(&other.bitscore)
            .then(other.edge.cmp(&self.edge))
    }
}

impl<'a> LocalGraph<'a> {
    fn new(frozen: &'a AlignmentGraph, nodes: &[NodeIndex], edges: &[EdgeIndex]) -> Self {
        let mut nodes = nodes.to_vec();
        nodes.sort();

        let mut graph = StableUnGraph::with_capacity(nodes.len(), edges.len());
        let mut local_of: FxHashMap<NodeIndex, LocalNode> = FxHashMap::default();
        for n in nodes {
            local_of.insert(n, graph.add_node(n));
        }

        let mut edges = edges.to_vec();
        edges.sort();
        for e in edges {
            let edge = frozen.edge(e);
            if let (Some(&a), Some(&b)) = (local_of.get(&edge.query), local_of.get(&edge.subject)) {
                graph.add_edge(a, b, e);
            }
        }

        Self { frozen, graph }
    }

    fn bitscore(&self, e: LocalEdge) -> f64 {
        self.frozen.edge(self.graph[e]).bitscore
    }

    /// Weaker edges sort first: lower bitscore, then lower index
    fn cmp_strength(&self, a: LocalEdge, b: LocalEdge) -> Ordering {
        self.bitscore(a)
            .total_cmp(&self.bitscore(b))
            .then(self.graph[a].cmp(&self.graph[b]))
    }

    /// Connected pieces of `members`, which must be closed under adjacency
    fn split(&self, members: &[LocalNode]) -> Vec<Vec<LocalNode>> {
        let mut seen = vec![false; self.graph.node_bound()];
        let mut pieces = vec![];
        for &start in members {
            if seen[start.index()] {
                continue;
            }
            let mut piece = vec![];
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(n) = bfs.next(&self.graph) {
                seen[n.index()] = true;
                piece.push(n);
            }
            piece.sort();
            pieces.push(piece);
        }
        pieces
    }

    fn edges_of(&self, members: &[LocalNode]) -> Vec<LocalEdge> {
        let mut edges: Vec<LocalEdge> = members
            .iter()
            .flat_map(|&n| self.graph.edges(n).map(|e| e.id()))
            .collect();
        edges.sort_by_key(|&e| self.graph[e]);
        edges.dedup();
        edges
    }

    /// The interval the frozen edge behind `e` aligns on local node `n`
    fn range_on(&self, e: LocalEdge, n: LocalNode) -> Interval {
        self.frozen.edge(self.graph[e]).range_on(self.graph[n])
    }

    fn other_end(&self, e: LocalEdge, n: LocalNode) -> LocalNode {
        match self.graph.edge_endpoints(e) {
            Some((a, b)) if a == n => b,
            Some((a, _)) => a,
            None => n,
        }
    }

    /// Grows a maximum spanning tree from the lowest member and places every block on it.
    fn layout(&self, members: &[LocalNode]) -> (Vec<LocalNode>, FxHashMap<LocalNode, Placement>) {
        let reference = members[0];
        let mut placed: FxHashMap<LocalNode, Placement> = FxHashMap::default();
        placed.insert(
            reference,
            Placement {
                orient: 1,
                offset: 0,
                parent: None,
                depth: 0,
            },
        );
        let mut order = vec![reference];

        let mut heap = BinaryHeap::new();
        let push_frontier = |heap: &mut BinaryHeap<Candidate>, n: LocalNode| {
            for e in self.graph.edges(n) {
                heap.push(Candidate {
                    bitscore: self.bitscore(e.id()),
                    edge: *e.weight(),
                    local: e.id(),
                    from: n,
                });
            }
        };
        push_frontier(&mut heap, reference);

        while let Some(cand) = heap.pop() {
            let to = self.other_end(cand.local, cand.from);
            if placed.contains_key(&to) {
                continue;
            }
            let from = placed[&cand.from];
            let edge = self.frozen.edge(cand.edge);
            let orient = from.orient * edge.strand.sign();
            let column = from.column(self.range_on(cand.local, cand.from).mid2());
            let offset = column - orient * self.range_on(cand.local, to).mid2();

            placed.insert(
                to,
                Placement {
                    orient,
                    offset,
                    parent: Some((cand.from, cand.local)),
                    depth: from.depth + 1,
                },
            );
            order.push(to);
            push_frontier(&mut heap, to);
        }

        (order, placed)
    }

    fn tree_path(
        &self,
        placed: &FxHashMap<LocalNode, Placement>,
        mut x: LocalNode,
        mut y: LocalNode,
    ) -> Vec<LocalEdge> {
        let mut path = vec![];
        let step = |n: LocalNode, path: &mut Vec<LocalEdge>| -> LocalNode {
            match placed[&n].parent {
                Some((p, e)) => {
                    path.push(e);
                    p
                }
                None => n,
            }
        };
        while placed[&x].depth > placed[&y].depth {
            x = step(x, &mut path);
        }
        while placed[&y].depth > placed[&x].depth {
            y = step(y, &mut path);
        }
        while x != y {
            x = step(x, &mut path);
            y = step(y, &mut path);
        }
        path
    }

    fn check(&self, members: &[LocalNode], opt: &PartitionOpt) -> Check {
        let slack = 2 * opt.max_shift as i64;
        let (order, placed) = self.layout(members);
        let edges = self.edges_of(members);

        // edges closing a cycle must agree with the tree
        for &e in &edges {
            let (a, b) = match self.graph.edge_endpoints(e) {
                Some(ends) => ends,
                None => continue,
            };
            if placed[&a].parent == Some((b, e)) || placed[&b].parent == Some((a, e)) {
                continue;
            }
            let edge = self.frozen.edge(self.graph[e]);
            let (pa, pb) = (placed[&a], placed[&b]);
            let flipped = pb.orient != pa.orient * edge.strand.sign();
            let shift = (pa.column(self.range_on(e, a).mid2())
                - pb.column(self.range_on(e, b).mid2()))
            .abs();
            if flipped || shift > slack {
                let mut cycle = self.tree_path(&placed, a, b);
                cycle.push(e);
                return Check::Conflict(cycle);
            }
        }

        let homology: FxHashMap<LocalNode, Interval> = members
            .iter()
            .map(|&n| {
                let hull = self
                    .graph
                    .edges(n)
                    .map(|e| self.range_on(e.id(), n))
                    .reduce(|acc, iv| acc.hull(&iv))
                    .unwrap_or(self.frozen.node(self.graph[n]).union);
                (n, hull)
            })
            .collect();

        // blocks of one sequence must not collide and must keep their genomic order
        let mut by_accession: BTreeMap<&str, Vec<LocalNode>> = BTreeMap::new();
        for &n in members {
            by_accession
                .entry(self.frozen.node(self.graph[n]).accession.as_str())
                .or_default()
                .push(n);
        }
        for blocks in by_accession.values_mut() {
            blocks.sort_by_key(|n| homology[n].start);
            for (i, &x) in blocks.iter().enumerate() {
                for &y in &blocks[i + 1..] {
                    let (px, py) = (placed[&x], placed[&y]);
                    let (hx, hy) = (homology[&x], homology[&y]);
                    let (x_lo, x_hi) = px.project(&hx);
                    let (y_lo, y_hi) = py.project(&hy);
                    let overlap = x_hi.min(y_hi) - x_lo.max(y_lo);
                    let ascending =
                        (py.column(hy.mid2()) - px.column(hx.mid2())) * px.orient > 0;
                    if px.orient != py.orient || overlap > slack || !ascending {
                        return Check::Conflict(self.tree_path(&placed, x, y));
                    }
                }
            }
        }

        let score: f64 = edges.iter().map(|&e| self.bitscore(e)).sum();
        let mut group_edges: Vec<EdgeIndex> = edges.iter().map(|&e| self.graph[e]).collect();
        group_edges.sort();

        Check::Consistent(Group {
            nodes: order.iter().map(|&n| self.graph[n]).collect(),
            directions: order
                .iter()
                .map(|n| {
                    if placed[n].orient == 1 {
                        Direction::Forward
                    } else {
                        Direction::Reverse
                    }
                })
                .collect(),
            homology: order.iter().map(|n| homology[n]).collect(),
            edges: group_edges,
            score,
        })
    }
}
