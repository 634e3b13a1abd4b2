//! Daylight optimization: per-node angular relaxation of a split network.

use crate::graph::{EdgeId, EdgeMap, NodeId, NodeMap};
use crate::layout::assign_coordinates_to_nodes;
use crate::splits::SplitsGraph;
use crate::util::geometry::{angle_between, modulo360, Point};
use crate::util::{Canceled, ProgressListener};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

// =#========================================================================#=
// DAYLIGHT OPTIMIZER
// =#========================================================================#=
/// Iteratively equalizes the "daylight" around the nodes of an embedded
/// split network.
///
/// For each node, the rest of the graph decomposes into connected *sight
/// components* (connected components of the graph minus the node). When
/// the components' angular extents seen from the node leave a gap and
/// there is more than one component, the gap is distributed evenly
/// between them by rotating each component's edge angles, and the
/// coordinates are recomputed.
///
/// Nodes are processed in a randomized order reseeded from the iteration
/// number, so runs are reproducible.
#[derive(Debug, Clone)]
pub struct DaylightOptimizer {
    /// Number of optimization rounds over all nodes.
    pub iterations: usize,
    /// Use split weights as edge lengths when recomputing coordinates.
    pub use_weights: bool,
}

impl Default for DaylightOptimizer {
    fn default() -> Self {
        DaylightOptimizer {
            iterations: 5,
            use_weights: true,
        }
    }
}

impl DaylightOptimizer {
    /// Creates the optimizer with default settings.
    pub fn new() -> Self {
        DaylightOptimizer::default()
    }

    /// Optimizes the daylight of all nodes, updating edge angles and
    /// `node2point` in place.
    ///
    /// Stops early when a full round changes nothing. Cancellation is
    /// polled once per node; on cancellation the last consistently
    /// computed coordinates remain in `node2point`.
    pub fn apply(
        &self,
        progress: &mut dyn ProgressListener,
        graph: &mut SplitsGraph,
        node2point: &mut NodeMap<Point>,
    ) -> Result<(), Canceled> {
        progress.set_tasks("Daylight optimizer", "Optimizing");
        progress.set_maximum((self.iterations * graph.node_count()) as u64);

        for iteration in 0..self.iterations {
            let mut nodes: Vec<NodeId> = graph.nodes().collect();
            let mut rng = ChaCha8Rng::seed_from_u64(iteration as u64);
            nodes.shuffle(&mut rng);

            let mut improved = false;
            for v in nodes {
                progress.increment_progress()?;
                if graph.degree(v) > 1
                    && optimize_daylight_at(graph, v, node2point)
                {
                    assign_coordinates_to_nodes(
                        self.use_weights,
                        graph,
                        1,
                        node2point,
                        progress,
                    )?;
                    improved = true;
                }
            }
            if !improved {
                break;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Per-node optimization
// ============================================================================
/// Rotates the sight components around `v` so that the daylight between
/// them is equal. Returns whether anything changed.
fn optimize_daylight_at(
    graph: &mut SplitsGraph,
    v: NodeId,
    node2point: &NodeMap<Point>,
) -> bool {
    let center = match node2point.get(v) {
        Some(&p) => p,
        None => return false,
    };

    // partition all edges into sight components and record each
    // component's angular extent seen from v
    let mut edge2component: EdgeMap<usize> = EdgeMap::new();
    let mut extents: Vec<(f64, f64)> = Vec::new(); // (min, max) per component
    let mut visited: HashSet<NodeId> = HashSet::from([v]);

    let incident: Vec<EdgeId> = graph.adjacent_edges(v).collect();
    for e in incident {
        if edge2component.contains(e) {
            continue;
        }
        let component = extents.len() + 1;
        edge2component.insert(e, component);
        let mut min_angle = f64::MAX;
        let mut max_angle = f64::MIN;
        let mut stack = vec![graph.opposite(v, e)];
        while let Some(w) = stack.pop() {
            if !visited.insert(w) {
                continue;
            }
            if let Some(&p) = node2point.get(w) {
                let angle = angle_between(center, p);
                min_angle = min_angle.min(angle);
                max_angle = max_angle.max(angle);
            }
            for f in graph.adjacent_edges(w) {
                if !edge2component.contains(f) {
                    edge2component.insert(f, component);
                    let u = graph.opposite(w, f);
                    if u != v && !visited.contains(&u) {
                        stack.push(u);
                    }
                }
            }
        }
        if min_angle > max_angle {
            // component with no placed nodes
            min_angle = 0.0;
            max_angle = 0.0;
        }
        extents.push((min_angle, max_angle));
    }

    let component_count = extents.len();
    if component_count <= 1 {
        return false;
    }
    let total: f64 = extents.iter().map(|&(lo, hi)| hi - lo).sum();
    if total >= 360.0 {
        return false;
    }

    // new start of component c: extents of earlier components plus the
    // accumulated daylight gaps
    // new start of component c: end of the previous component plus one
    // daylight gap; component 1 is the anchor and keeps its start
    let gap = (360.0 - total) / component_count as f64;
    let mut rotation = vec![0.0; component_count + 1];
    let mut alpha = extents[0].0;
    for (c, &(lo, hi)) in extents.iter().enumerate() {
        rotation[c + 1] = alpha - lo;
        alpha += (hi - lo) + gap;
    }
    if rotation.iter().all(|r| r.abs() < 1e-9) {
        return false;
    }

    let edges: Vec<(EdgeId, usize)> = edge2component.iter().map(|(e, &c)| (e, c)).collect();
    for (e, c) in edges {
        let angle = modulo360(graph.angle(e) + rotation[c]);
        graph.set_angle(e, angle);
    }
    true
}
