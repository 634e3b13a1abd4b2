//! Event-sweep construction of the outline of a split network.

use crate::graph::{EdgeId, NodeId, NodeMap};
use crate::layout::{assign_angles_to_splits, DEFAULT_TOTAL_ANGLE};
use crate::splits::{normalize_cycle, ASplit, SplitsBlock, SplitsGraph};
use crate::util::geometry::{modulo360, translate_by_angle, Point};
use crate::util::{Canceled, ProgressListener};
use bitvec::prelude::*;
use log::warn;
use std::collections::HashMap;

// =#========================================================================#=
// NETWORK OUTLINE
// =#========================================================================#=
/// Outline layout: builds the boundary of the split network by a single
/// sweep around the cycle.
///
/// Every split contributes a *start* event at the first cycle position of
/// its part away from taxon 1 and an *end* event at the last. Sweeping
/// the sorted event list while maintaining the set of currently open
/// splits traces the outline polygon: each distinct open-split set is
/// interned as one graph node, and re-entering a previously seen set
/// closes a face, recorded as a loop.
///
/// Taxa without a trivial split get a temporary one so that every taxon
/// receives a node; the temporary edges are contracted away at the end.
#[derive(Debug, Clone)]
pub struct NetworkOutline {
    /// Use split weights as edge lengths (otherwise unit lengths).
    pub use_weights: bool,
    /// Total arc over which the taxa are spread, in degrees.
    pub total_angle: f64,
}

impl Default for NetworkOutline {
    fn default() -> Self {
        NetworkOutline {
            use_weights: true,
            total_angle: DEFAULT_TOTAL_ANGLE,
        }
    }
}

impl NetworkOutline {
    /// Creates the algorithm with default settings.
    pub fn new() -> Self {
        NetworkOutline::default()
    }

    /// Builds the outline network into `graph`.
    ///
    /// # Arguments
    /// * `ntax` - number of taxa (ids `1..=ntax`)
    /// * `splits` - circular splits with a cycle covering all taxa
    /// * `graph` - output graph, cleared first
    /// * `node2point` - output coordinates, cleared first
    /// * `used_splits` - output set of split ids represented in the graph
    /// * `loops` - output list of faces closed during the sweep, each as
    ///   the cycle of nodes around the face
    ///
    /// Splits that are not circular with respect to the cycle cannot
    /// appear on the outline; they are skipped with a warning.
    ///
    /// Cancellation is polled once per event.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        progress: &mut dyn ProgressListener,
        ntax: usize,
        splits: &SplitsBlock,
        graph: &mut SplitsGraph,
        node2point: &mut NodeMap<Point>,
        used_splits: &mut BitVec,
        loops: &mut Vec<Vec<NodeId>>,
    ) -> Result<(), Canceled> {
        progress.set_tasks("Outline", "Sweeping");
        graph.clear();
        node2point.clear();
        loops.clear();
        used_splits.clear();
        used_splits.resize(splits.nsplits() + 1, false);

        let original_nsplits = splits.nsplits();
        let mut extended = splits.clone();
        add_missing_trivial_splits(ntax, &mut extended);

        let cycle = normalize_cycle(splits.cycle());
        let split2angle = assign_angles_to_splits(ntax, &extended, &cycle, self.total_angle);

        let events = build_events(ntax, &extended, &cycle);
        progress.set_maximum(events.len() as u64);

        let mut current: BitVec = bitvec![0; extended.nsplits() + 1];
        let mut location = Point::ZERO;
        let start = graph.new_node();
        node2point.insert(start, location);

        let mut splits2node: HashMap<BitVec, NodeId> = HashMap::new();
        splits2node.insert(current.clone(), start);

        let mut previous_node = start;
        let mut previous_split: Option<usize> = None;

        for event in &events {
            progress.increment_progress()?;
            let s = event.split;
            let weight = if self.use_weights { event.weight } else { 1.0 };
            let angle = match event.kind {
                EventKind::Start => split2angle[s],
                EventKind::End => split2angle[s] + 180.0,
            };
            current.set(s, event.kind == EventKind::Start);
            location = translate_by_angle(location, angle, weight);

            let (v, created) = match splits2node.get(&current) {
                Some(&v) => {
                    location = node2point.get(v).copied().unwrap_or(location);
                    (v, false)
                }
                None => {
                    let v = graph.new_node();
                    splits2node.insert(current.clone(), v);
                    node2point.insert(v, location);
                    (v, true)
                }
            };

            if v != previous_node && !graph.is_adjacent(v, previous_node) {
                let e = graph
                    .new_edge(previous_node, v)
                    .expect("sweep nodes are distinct");
                graph.set_split(e, s as i32);
                graph.set_weight(e, weight);
                graph.set_angle(e, modulo360(angle));
                if s <= original_nsplits {
                    used_splits.set(s, true);
                }
                if !created {
                    // the sweep returned to a known node: a face closed
                    loops.push(trace_loop(graph, v, e));
                }
            }

            // between a split's start and its immediately following end
            // lies the node of its far-side taxa
            if previous_split == Some(s) && event.kind == EventKind::End {
                let part = extended.get(s).part_not_containing(1);
                for t in part.iter_ones() {
                    graph.add_taxon(previous_node, t);
                }
            }

            previous_node = v;
            previous_split = Some(s);
        }

        for t in 1..=ntax {
            if graph.taxon2node(t).is_none() {
                graph.add_taxon(start, t);
            }
        }

        remove_temporary_trivial_edges(original_nsplits, graph, node2point);
        Ok(())
    }
}

// ============================================================================
// Events
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Start,
    End,
}

#[derive(Debug, Clone)]
struct Event {
    kind: EventKind,
    split: usize,
    weight: f64,
    /// First and last cycle positions of the split's part away from
    /// taxon 1.
    first_pos: usize,
    last_pos: usize,
}

impl Event {
    fn position(&self) -> usize {
        match self.kind {
            EventKind::Start => self.first_pos,
            EventKind::End => self.last_pos,
        }
    }

    fn far_size(&self) -> usize {
        self.last_pos - self.first_pos + 1
    }
}

/// Builds the sorted event list: starts ordered by first position with
/// larger far sides first on ties (outer splits open first), ends ordered
/// by last position with smaller far sides first (inner splits close
/// first), and starts before ends at equal positions.
fn build_events(ntax: usize, splits: &SplitsBlock, cycle: &[usize]) -> Vec<Event> {
    let mut starts: Vec<Event> = Vec::new();
    let mut ends: Vec<Event> = Vec::new();
    for (s, split) in splits.iter() {
        let part = split.part_not_containing(cycle[1]);
        let mut first = 0;
        let mut last = 0;
        let mut count = 0;
        for i in 1..=ntax {
            if part[cycle[i]] {
                if first == 0 {
                    first = i;
                }
                last = i;
                count += 1;
            }
        }
        if count == 0 || last - first + 1 != count {
            warn!("split {s} is not circular with respect to the cycle, skipping it");
            continue;
        }
        starts.push(Event {
            kind: EventKind::Start,
            split: s,
            weight: split.weight(),
            first_pos: first,
            last_pos: last,
        });
        ends.push(Event {
            kind: EventKind::End,
            split: s,
            weight: split.weight(),
            first_pos: first,
            last_pos: last,
        });
    }

    starts.sort_by_key(|event| (event.first_pos, usize::MAX - event.far_size()));
    ends.sort_by_key(|event| (event.last_pos, event.far_size()));

    // merge, starts first at equal positions
    let mut events = Vec::with_capacity(starts.len() + ends.len());
    let mut i = 0;
    let mut j = 0;
    while i < starts.len() || j < ends.len() {
        let take_start = i < starts.len()
            && (j >= ends.len() || starts[i].position() <= ends[j].position());
        if take_start {
            events.push(starts[i].clone());
            i += 1;
        } else {
            events.push(ends[j].clone());
            j += 1;
        }
    }
    events
}

/// Appends one trivial split for every taxon that has none, with weight 0
/// so the temporary edges do not distort the outline.
fn add_missing_trivial_splits(ntax: usize, splits: &mut SplitsBlock) {
    let mut covered = vec![false; ntax + 1];
    for (_, split) in splits.iter() {
        if split.is_trivial() {
            let part = if split.a().count_ones() == 1 {
                split.a()
            } else {
                split.b()
            };
            covered[part.iter_ones().next().expect("trivial part has a member")] = true;
        }
    }
    for t in 1..=ntax {
        if !covered[t] {
            splits.push(ASplit::new(&[t], ntax, 0.0));
        }
    }
}

/// Walks around the face just closed by `closing`, starting at `v`, using
/// the cyclic adjacency order.
fn trace_loop(graph: &SplitsGraph, v: NodeId, closing: EdgeId) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let mut w = v;
    let mut e = closing;
    let mut steps = 0;
    loop {
        nodes.push(w);
        w = graph.opposite(w, e);
        e = graph.next_adjacent_edge_cyclic(w, e);
        steps += 1;
        if w == v || steps > 2 * graph.edge_count() {
            break;
        }
    }
    nodes
}

/// Contracts the edges of the temporary trivial splits, moving their taxa
/// onto the surviving neighbor.
fn remove_temporary_trivial_edges(
    original_nsplits: usize,
    graph: &mut SplitsGraph,
    node2point: &mut NodeMap<Point>,
) {
    let temporary: Vec<EdgeId> = graph
        .edges()
        .filter(|&e| graph.split(e) > original_nsplits as i32)
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
        node2point.remove(leaf);
        graph.delete_node(leaf);
    }
}
