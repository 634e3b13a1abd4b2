//! Convex-hull extension of split networks.

use crate::graph::{EdgeId, NodeId, NodeMap};
use crate::layout::{assign_angles_to_splits, assign_coordinates_to_nodes, DEFAULT_TOTAL_ANGLE};
use crate::splits::{normalize_cycle, SplitsBlock, SplitsGraph};
use crate::util::geometry::Point;
use crate::util::{Canceled, ProgressListener};
use bitvec::prelude::*;
use std::collections::HashMap;

const HULL_SIDE_A: u8 = 1;
const HULL_SIDE_B: u8 = 2;
const HULL_BOTH: u8 = HULL_SIDE_A | HULL_SIDE_B;

// =#========================================================================#=
// CONVEX HULL
// =#========================================================================#=
/// Incremental split-network construction by convex-hull extension.
///
/// Unlike [EqualAngle](crate::layout::EqualAngle), this construction
/// handles arbitrary (also non-circular) splits, at the price of larger
/// networks. Splits already marked in `used_splits` are assumed present
/// in the graph and left untouched, so the usual pipeline runs equal
/// angle first and this pass on what remains.
///
/// For each new split, every node is classified by BFS into the convex
/// hull of side A, of side B, or both; the "both" nodes form the boundary
/// and are duplicated, with taxa and neighbor edges redistributed onto
/// the copy on side B and a new edge carrying the split between original
/// and copy.
#[derive(Debug, Clone)]
pub struct ConvexHull {
    /// Use split weights as edge lengths (otherwise unit lengths).
    pub use_weights: bool,
    /// Total arc over which the taxa are spread, in degrees.
    pub total_angle: f64,
}

impl Default for ConvexHull {
    fn default() -> Self {
        ConvexHull {
            use_weights: true,
            total_angle: DEFAULT_TOTAL_ANGLE,
        }
    }
}

impl ConvexHull {
    /// Creates the algorithm with default settings.
    pub fn new() -> Self {
        ConvexHull::default()
    }

    /// Inserts all splits not yet in `used_splits` into the graph, then
    /// re-embeds it.
    ///
    /// If the graph is empty, it is seeded with a single node holding all
    /// taxa. Angles already assigned to a split's edges are reused during
    /// embedding, preserving adjusted layouts when splits are added
    /// incrementally.
    ///
    /// Cancellation is polled once per split and once per node during
    /// coordinate assignment.
    pub fn apply(
        &self,
        progress: &mut dyn ProgressListener,
        ntax: usize,
        splits: &SplitsBlock,
        graph: &mut SplitsGraph,
        node2point: &mut NodeMap<Point>,
        used_splits: &mut BitVec,
    ) -> Result<(), Canceled> {
        used_splits.resize(splits.nsplits() + 1, false);
        if used_splits.count_ones() == splits.nsplits() {
            return Ok(());
        }
        progress.set_tasks("Convex hull extension", "Placing splits");

        if graph.node_count() == 0 {
            let start = graph.new_node();
            for t in 1..=ntax {
                graph.add_taxon(start, t);
            }
        }

        // remaining splits in order of increasing size, ties by id
        let mut order: Vec<(usize, usize)> = splits
            .iter()
            .filter(|&(s, _)| !used_splits[s])
            .map(|(s, split)| (split.size(), s))
            .collect();
        order.sort_unstable();
        progress.set_maximum(order.len() as u64);

        for (i, &(_, s)) in order.iter().enumerate() {
            progress.set_progress(i as u64)?;
            self.insert_split(splits, s, graph, used_splits);
            used_splits.set(s, true);
        }

        progress.set_subtask("Embedding");
        self.embed(ntax, splits, graph, node2point, progress)
    }

    /// Inserts one split by duplicating its hull boundary.
    fn insert_split(
        &self,
        splits: &SplitsBlock,
        s: usize,
        graph: &mut SplitsGraph,
        used_splits: &BitVec,
    ) {
        let split = splits.get(s);
        let side_a = split.a();
        let side_b = split.b();

        // splits that divide a side can be crossed inside that side's hull
        let mut crossable_a = bitvec![0; splits.nsplits() + 1];
        let mut crossable_b = bitvec![0; splits.nsplits() + 1];
        for s1 in used_splits.iter_ones() {
            let other = splits.get(s1);
            if intersects(other.a(), side_a) && intersects(other.b(), side_a) {
                crossable_a.set(s1, true);
            }
            if intersects(other.a(), side_b) && intersects(other.b(), side_b) {
                crossable_b.set(s1, true);
            }
        }

        let start_a = graph
            .taxon2node(side_a.iter_ones().next().expect("side A is non-empty"))
            .expect("all taxa are placed");
        let start_b = graph
            .taxon2node(side_b.iter_ones().next().expect("side B is non-empty"))
            .expect("all taxa are placed");

        let mut hull: NodeMap<u8> = NodeMap::new();
        mark_hull(graph, start_a, &crossable_a, HULL_SIDE_A, &mut hull);
        mark_hull(graph, start_b, &crossable_b, HULL_SIDE_B, &mut hull);

        let boundary: Vec<NodeId> = graph
            .nodes()
            .filter(|&v| hull.get_or(v, 0) == HULL_BOTH)
            .collect();
        let old_edges: Vec<EdgeId> = graph.edges().collect();

        let mut copies: HashMap<NodeId, NodeId> = HashMap::new();
        for &v in &boundary {
            copies.insert(v, graph.new_node());
        }

        // side-B taxa move to the copy
        for &v in &boundary {
            let to_move: Vec<usize> = graph
                .taxa(v)
                .iter()
                .copied()
                .filter(|&t| side_b[t])
                .collect();
            for t in to_move {
                graph.remove_taxon(t);
                graph.add_taxon(copies[&v], t);
            }
        }

        // rewire: edges inside both hulls are duplicated onto the copies,
        // edges into side B only are re-pointed to the copy
        for e in old_edges {
            let p = graph.source(e);
            let q = graph.target(e);
            let hp = hull.get_or(p, 0);
            let hq = hull.get_or(q, 0);
            if hp == HULL_BOTH && hq == HULL_BOTH {
                let f = graph
                    .new_edge(copies[&p], copies[&q])
                    .expect("copies are distinct");
                copy_edge_attributes(graph, e, f);
            } else if hp == HULL_BOTH && hq == HULL_SIDE_B {
                let f = graph
                    .new_edge(copies[&p], q)
                    .expect("copy and neighbor are distinct");
                copy_edge_attributes(graph, e, f);
                graph.delete_edge(e);
            } else if hq == HULL_BOTH && hp == HULL_SIDE_B {
                let f = graph
                    .new_edge(p, copies[&q])
                    .expect("copy and neighbor are distinct");
                copy_edge_attributes(graph, e, f);
                graph.delete_edge(e);
            }
        }

        // the new split's edge class: one edge per boundary node
        for &v in &boundary {
            let f = graph
                .new_edge(v, copies[&v])
                .expect("original and copy are distinct");
            graph.set_split(f, s as i32);
            graph.set_weight(f, split.weight());
        }
    }

    /// Assigns angles (reusing any angle a split's edges already carry)
    /// and recomputes all coordinates.
    fn embed(
        &self,
        ntax: usize,
        splits: &SplitsBlock,
        graph: &mut SplitsGraph,
        node2point: &mut NodeMap<Point>,
        progress: &mut dyn ProgressListener,
    ) -> Result<(), Canceled> {
        let cycle = normalize_cycle(splits.cycle());
        let split2angle = assign_angles_to_splits(ntax, splits, &cycle, self.total_angle);

        let mut existing: HashMap<i32, f64> = HashMap::new();
        for e in graph.edges() {
            let s = graph.split(e);
            if s > 0 && graph.angle(e) != 0.0 {
                existing.entry(s).or_insert_with(|| graph.angle(e));
            }
        }

        let edges: Vec<EdgeId> = graph.edges().collect();
        for e in edges {
            let s = graph.split(e);
            if s > 0 {
                let angle = existing
                    .get(&s)
                    .copied()
                    .unwrap_or(split2angle[s as usize]);
                graph.set_angle(e, angle);
            }
        }

        node2point.clear();
        assign_coordinates_to_nodes(self.use_weights, graph, 1, node2point, progress)
    }
}

// ============================================================================
// Hull helpers
// ============================================================================
/// Marks all nodes reachable from `start` crossing only edges whose split
/// is in `crossable` with the given hull side bit.
fn mark_hull(
    graph: &SplitsGraph,
    start: NodeId,
    crossable: &BitVec,
    side_bit: u8,
    hull: &mut NodeMap<u8>,
) {
    let mut stack = vec![start];
    while let Some(v) = stack.pop() {
        let mark = hull.get_or(v, 0);
        if mark & side_bit != 0 {
            continue;
        }
        hull.insert(v, mark | side_bit);
        for e in graph.adjacent_edges(v) {
            let s = graph.split(e);
            if s > 0 && crossable.get(s as usize).is_some_and(|b| *b) {
                stack.push(graph.opposite(v, e));
            }
        }
    }
}

fn copy_edge_attributes(graph: &mut SplitsGraph, from: EdgeId, to: EdgeId) {
    graph.set_split(to, graph.split(from));
    let weight = graph.weight(from);
    graph.set_weight(to, weight);
    let angle = graph.angle(from);
    graph.set_angle(to, angle);
}

fn intersects(x: &BitSlice, y: &BitSlice) -> bool {
    x.iter_ones().any(|i| y.get(i).is_some_and(|b| *b))
}
