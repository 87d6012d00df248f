use crate::libs::interval::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Query,
    Subject,
}

/// One side of one hit: which raw interval a union node absorbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HitRef {
    pub hit: usize,
    pub side: Side,
}

/// Merged span of overlapping or adjacent intervals on one sequence
#[derive(Debug, Clone, PartialEq)]
pub struct UnionNode {
    pub union: Interval,
    pub members: Vec<HitRef>,
}

/// Sweeps the intervals of one accession and merges overlapping or adjacent ones.
///
/// Intervals are sorted by start, longer first on ties. The returned nodes are ordered by
/// start and pairwise separated by at least one base.
///
/// ```
/// use mhg::libs::interval::Interval;
/// use mhg::libs::merge::{merge_intervals, HitRef, Side};
/// let mut items = vec![
///     (Interval::new(30, 60), HitRef { hit: 0, side: Side::Query }),
///     (Interval::new(10, 40), HitRef { hit: 1, side: Side::Subject }),
///     (Interval::new(61, 70), HitRef { hit: 2, side: Side::Query }),
///     (Interval::new(100, 120), HitRef { hit: 3, side: Side::Query }),
/// ];
/// let nodes = merge_intervals(&mut items);
/// assert_eq!(nodes.len(), 2);
/// assert_eq!(nodes[0].union, Interval::new(10, 70));
/// assert_eq!(nodes[0].members.len(), 3);
/// ```
pub fn merge_intervals(items: &mut [(Interval, HitRef)]) -> Vec<UnionNode> {
    items.sort_by(|a, b| {
        a.0.start
            .cmp(&b.0.start)
            .then(b.0.end.cmp(&a.0.end))
            .then(a.1.cmp(&b.1))
    });

    let mut nodes: Vec<UnionNode> = vec![];
    for (iv, hit_ref) in items.iter() {
        match nodes.last_mut() {
            Some(cur) if cur.union.touches(iv) => {
                cur.union = cur.union.hull(iv);
                cur.members.push(*hit_ref);
            }
            _ => nodes.push(UnionNode {
                union: *iv,
                members: vec![*hit_ref],
            }),
        }
    }

    nodes
}
