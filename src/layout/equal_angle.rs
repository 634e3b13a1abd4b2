//! Equal-angle construction of split networks from circular splits.

use crate::graph::{EdgeId, InsertPosition, NodeId, NodeMap};
use crate::layout::{assign_angles_to_splits, assign_coordinates_to_nodes, DEFAULT_TOTAL_ANGLE};
use crate::splits::splits_graph::TEMPORARY_SPLIT;
use crate::splits::{is_circular, normalize_cycle, SplitsBlock, SplitsGraph};
use crate::util::geometry::Point;
use crate::util::{Canceled, ProgressListener};
use bitvec::prelude::*;
use log::warn;
use std::collections::HashSet;

// =#========================================================================#=
// EQUAL ANGLE
// =#========================================================================#=
/// Equal-angle layout: builds a planar split network for circular splits
/// and assigns angles and coordinates.
///
/// The construction starts from a star on the normalized cycle, then
/// wraps each non-trivial circular split along the current boundary path,
/// splicing a parallel chain of new nodes into the cyclic adjacency
/// order. Non-circular splits are skipped (they are not representable
/// here; use [ConvexHull](crate::layout::ConvexHull) to add them
/// afterwards on top of the `used_splits` this pass reports).
#[derive(Debug, Clone)]
pub struct EqualAngle {
    /// Use split weights as edge lengths (otherwise unit lengths).
    pub use_weights: bool,
    /// Total arc over which the taxa are spread, in degrees.
    pub total_angle: f64,
}

impl Default for EqualAngle {
    fn default() -> Self {
        EqualAngle {
            use_weights: true,
            total_angle: DEFAULT_TOTAL_ANGLE,
        }
    }
}

impl EqualAngle {
    /// Creates the algorithm with default settings.
    pub fn new() -> Self {
        EqualAngle::default()
    }

    /// Builds the split network for the given splits into `graph`.
    ///
    /// # Arguments
    /// * `ntax` - number of taxa (ids `1..=ntax`)
    /// * `splits` - splits with a cycle covering all taxa
    /// * `graph` - output graph, cleared first
    /// * `node2point` - output coordinates, cleared first
    /// * `forbidden_splits` - split ids whose existing angles must not be
    ///   touched
    /// * `used_splits` - output set of split ids represented in the graph
    ///
    /// # Returns
    /// `Err(Canceled)` if the progress listener requested cancellation;
    /// the graph then holds the consistent partial state built so far.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        progress: &mut dyn ProgressListener,
        ntax: usize,
        splits: &SplitsBlock,
        graph: &mut SplitsGraph,
        node2point: &mut NodeMap<Point>,
        forbidden_splits: &BitVec,
        used_splits: &mut BitVec,
    ) -> Result<(), Canceled> {
        progress.set_tasks("Equal angle", "Init");
        graph.clear();
        node2point.clear();
        used_splits.clear();
        used_splits.resize(splits.nsplits() + 1, false);

        let cycle = normalize_cycle(splits.cycle());
        progress.set_maximum(splits.nsplits() as u64);

        init_graph(ntax, splits, &cycle, graph, used_splits);

        // non-trivial splits ordered by the size of the part containing
        // taxon 1, ties by id
        let mut interior: Vec<(usize, usize)> = splits
            .iter()
            .filter(|(_, split)| split.size() > 1)
            .map(|(s, split)| (split.part_containing(1).count_ones(), s))
            .collect();
        interior.sort_unstable();

        progress.set_subtask("Placing splits");
        for &(_, s) in &interior {
            if is_circular(splits.get(s), &cycle) {
                wrap_split(ntax, splits, s, &cycle, graph);
                used_splits.set(s, true);
            }
            progress.increment_progress()?;
        }

        remove_temporary_trivial_edges(graph);

        progress.set_subtask("Assigning angles");
        let split2angle = assign_angles_to_splits(ntax, splits, &cycle, self.total_angle);
        let edges: Vec<EdgeId> = graph.edges().collect();
        for e in edges {
            let s = graph.split(e);
            if s > 0 && !forbidden_splits.get(s as usize).is_some_and(|b| *b) {
                graph.set_angle(e, split2angle[s as usize]);
            }
        }

        progress.set_subtask("Assigning coordinates");
        assign_coordinates_to_nodes(self.use_weights, graph, 1, node2point, progress)
    }
}

// ============================================================================
// Construction steps
// ============================================================================
/// Builds the initial star: one center node, one leaf per taxon in cycle
/// order. Trivial splits become real edges carrying their weight (and are
/// marked used); leaves without a trivial split hang on temporary
/// sentinel edges.
fn init_graph(
    ntax: usize,
    splits: &SplitsBlock,
    cycle: &[usize],
    graph: &mut SplitsGraph,
    used_splits: &mut BitVec,
) {
    let mut taxon2trivial = vec![0usize; ntax + 1];
    for (s, split) in splits.iter() {
        if split.is_trivial() {
            let part = if split.a().count_ones() == 1 {
                split.a()
            } else {
                split.b()
            };
            let t = part.iter_ones().next().expect("trivial part has a member");
            taxon2trivial[t] = s;
        }
    }

    let center = graph.new_node();
    for i in 1..=ntax {
        let t = cycle[i];
        let v = graph.new_node();
        graph.add_taxon(v, t);
        let e = graph
            .new_edge(center, v)
            .expect("center and leaf are distinct");
        let s = taxon2trivial[t];
        if s != 0 {
            graph.set_weight(e, splits.get(s).weight());
            graph.set_split(e, s as i32);
            used_splits.set(s, true);
        } else {
            graph.set_split(e, TEMPORARY_SPLIT);
        }
    }
}

/// Wraps split `s` along the boundary path from the first to the last
/// cycle member of its part away from taxon 1, inserting a parallel chain
/// of new nodes and re-hanging the traversed leaf edges onto it.
///
/// Each new split edge is spliced in directly after the edge by which the
/// boundary node was entered, which keeps the cyclic adjacency planar.
/// If the walk revisits a node the split system is not planar here; the
/// wrap is abandoned with a warning.
fn wrap_split(ntax: usize, splits: &SplitsBlock, s: usize, cycle: &[usize], graph: &mut SplitsGraph) {
    let part = splits.get(s).part_not_containing(1);
    let mut first_taxon = 0;
    let mut last_taxon = 0;
    for i in 1..=ntax {
        let t = cycle[i];
        if part[t] {
            if first_taxon == 0 {
                first_taxon = t;
            }
            last_taxon = t;
        }
    }

    let first_leaf = graph.taxon2node(first_taxon).expect("taxon has a node");
    let last_leaf = graph.taxon2node(last_taxon).expect("taxon has a node");
    let target_leaf_edge = graph
        .first_adjacent_edge(last_leaf)
        .expect("leaf has an edge");

    let mut e = graph
        .first_adjacent_edge(first_leaf)
        .expect("leaf has an edge");
    let mut v = graph.opposite(first_leaf, e);
    let mut leaf_edges: Vec<EdgeId> = vec![e];
    let mut previous_new: Option<NodeId> = None;
    let mut visited: HashSet<NodeId> = HashSet::new();
    let split_weight = splits.get(s).weight();

    loop {
        if !visited.insert(v) {
            warn!("wrapping split {s} revisited node {v}, abandoning this split");
            return;
        }
        // collect the leaf edges following the entering edge in cyclic order
        let entered_by = e;
        let mut f = graph.next_adjacent_edge_cyclic(v, entered_by);
        while is_leaf_edge(graph, v, f) {
            leaf_edges.push(f);
            if f == target_leaf_edge {
                break;
            }
            f = graph.next_adjacent_edge_cyclic(v, f);
            if f == entered_by {
                warn!("wrapping split {s} wrapped around node {v}, abandoning this split");
                return;
            }
        }
        let next_boundary = if is_leaf_edge(graph, v, f) { None } else { Some(f) };

        let w = graph.new_node();
        let h = graph
            .new_edge_at(
                w,
                InsertPosition::Append,
                v,
                InsertPosition::After(entered_by),
            )
            .expect("new chain node is distinct");
        graph.set_split(h, s as i32);
        graph.set_weight(h, split_weight);

        if let Some(u) = previous_new {
            // parallel copy of the boundary edge between consecutive
            // chain nodes
            let h = graph.new_edge(w, u).expect("chain nodes are distinct");
            graph.set_split(h, graph.split(entered_by));
            let weight = graph.weight(entered_by);
            graph.set_weight(h, weight);
        }

        for &leaf_edge in &leaf_edges {
            let leaf = graph.opposite(v, leaf_edge);
            let h = graph.new_edge(w, leaf).expect("leaf is distinct");
            graph.set_split(h, graph.split(leaf_edge));
            let weight = graph.weight(leaf_edge);
            graph.set_weight(h, weight);
            graph.delete_edge(leaf_edge);
        }
        leaf_edges.clear();

        match next_boundary {
            Some(f) => {
                v = graph.opposite(v, f);
                e = f;
                previous_new = Some(w);
            }
            None => break,
        }
    }
}

fn is_leaf_edge(graph: &SplitsGraph, v: NodeId, e: EdgeId) -> bool {
    graph.degree(graph.opposite(v, e)) == 1
}

/// Deletes the sentinel edges left for taxa without trivial splits,
/// re-attaching their taxa to the surviving neighbor.
fn remove_temporary_trivial_edges(graph: &mut SplitsGraph) {
    let temporary: Vec<EdgeId> = graph
        .edges()
        .filter(|&e| graph.split(e) == TEMPORARY_SPLIT)
        .collect();
    for e in temporary {
        let source = graph.source(e);
        let target = graph.target(e);
        let (leaf, keep) = if graph.degree(source) == 1 {
            (source, target)
        } else {
            (target, source)
        };
        let taxa: Vec<usize> = graph.taxa(leaf).to_vec();
        graph.clear_taxa(leaf);
        for t in taxa {
            graph.add_taxon(keep, t);
        }
        graph.delete_node(leaf);
    }
}
