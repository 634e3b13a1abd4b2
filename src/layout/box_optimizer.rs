//! Box optimization: per-split angular relaxation of a split network.

use crate::graph::{EdgeId, NodeId, NodeMap};
use crate::layout::assign_coordinates_to_nodes;
use crate::splits::SplitsGraph;
use crate::util::geometry::{angle_diff, modulo360, Point};
use crate::util::{Canceled, ProgressListener};
use std::collections::HashSet;

/// Smallest angular margin kept to every neighboring edge, in degrees.
const COLLISION_MARGIN: f64 = 0.01;

/// Rotations smaller than this are not applied, in degrees.
const MIN_ROTATION: f64 = 0.001;

// =#========================================================================#=
// BOX OPTIMIZER
// =#========================================================================#=
/// Iteratively optimizes the angle of each split's parallel edge class.
///
/// The edges of one split form a band of parallel "boxes" with the splits
/// crossing it along its two chains. The total box area as a function of
/// the split's angle `x` has the form `A·cos x + B·sin x`, which is
/// maximized in closed form; the optimum is then clamped to the
/// no-collision bounds obtained by scanning, on both chains, the angular
/// gaps between the split's edge and its cyclic neighbors. After every
/// accepted rotation the coordinates are recomputed.
#[derive(Debug, Clone)]
pub struct BoxOptimizer {
    /// Number of optimization rounds over all splits.
    pub iterations: usize,
    /// Use split weights as edge lengths when recomputing coordinates.
    pub use_weights: bool,
}

impl Default for BoxOptimizer {
    fn default() -> Self {
        BoxOptimizer {
            iterations: 3,
            use_weights: true,
        }
    }
}

impl BoxOptimizer {
    /// Creates the optimizer with default settings.
    pub fn new() -> Self {
        BoxOptimizer::default()
    }

    /// Optimizes the angles of all splits present in the graph, updating
    /// edge angles and `node2point` in place.
    ///
    /// Stops early when a full round changes nothing. Cancellation is
    /// polled once per split per round.
    pub fn apply(
        &self,
        progress: &mut dyn ProgressListener,
        graph: &mut SplitsGraph,
        node2point: &mut NodeMap<Point>,
    ) -> Result<(), Canceled> {
        progress.set_tasks("Box optimizer", "Optimizing");
        let split_ids = graph.split_ids();
        progress.set_maximum((self.iterations * split_ids.len()) as u64);

        for _ in 0..self.iterations {
            let mut improved = false;
            for &s in &split_ids {
                progress.increment_progress()?;
                if optimize_split_angle(graph, s) {
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
// Per-split optimization
// ============================================================================
/// Rotates the edge class of split `s` to the clamped optimum of the box
/// area functional. Returns whether anything changed.
fn optimize_split_angle(graph: &mut SplitsGraph, s: i32) -> bool {
    let band: Vec<EdgeId> = graph.edges().filter(|&e| graph.split(e) == s).collect();
    let Some(&first) = band.first() else {
        return false;
    };
    let x = graph.angle(first);

    // the side of the band holding taxon 1
    let Some(start) = graph.taxon2node(1) else {
        return false;
    };
    let near = collect_side(graph, start, s);
    if band
        .iter()
        .any(|&e| near.contains(&graph.source(e)) == near.contains(&graph.target(e)))
    {
        // band does not separate the graph here, nothing safe to rotate
        return false;
    }

    // collision bounds: the band edge must stay inside the angular gap to
    // its neighbors at every chain node, on both sides
    let mut ccw_margin: f64 = 180.0;
    let mut cw_margin: f64 = 180.0;
    let mut chain_nodes: Vec<(NodeId, f64)> = Vec::new(); // (node, band angle seen from it)
    for &e in &band {
        let (near_end, far_end) = if near.contains(&graph.source(e)) {
            (graph.source(e), graph.target(e))
        } else {
            (graph.target(e), graph.source(e))
        };
        chain_nodes.push((near_end, x));
        chain_nodes.push((far_end, x + 180.0));
    }
    for &(v, band_angle) in &chain_nodes {
        for f in graph.adjacent_edges(v) {
            if graph.split(f) == s {
                continue;
            }
            let d = modulo360(graph.angle(f) - band_angle);
            if d > 0.0 && d < 180.0 {
                ccw_margin = ccw_margin.min(d);
            } else if d > 180.0 {
                cw_margin = cw_margin.min(360.0 - d);
            } else {
                return false; // collinear neighbor, no room
            }
        }
    }

    // box area functional over the crossing splits along the near chain:
    // sum of w_f * sin(x - angle_f) = A cos x + B sin x
    let near_chain: HashSet<NodeId> = chain_nodes
        .iter()
        .filter(|&&(_, a)| a == x)
        .map(|&(v, _)| v)
        .collect();
    let mut a_coeff = 0.0;
    let mut b_coeff = 0.0;
    let mut seen: HashSet<EdgeId> = HashSet::new();
    for &v in &near_chain {
        for f in graph.adjacent_edges(v) {
            if graph.split(f) == s || !seen.insert(f) {
                continue;
            }
            if !near_chain.contains(&graph.opposite(v, f)) {
                continue;
            }
            let weight = graph.weight(f).max(0.0);
            // orient the crossing edge so the current configuration has a
            // positive box area, then maximize from there
            let mut crossing = graph.angle(f);
            if (x - crossing).to_radians().sin() < 0.0 {
                crossing += 180.0;
            }
            let radians = crossing.to_radians();
            a_coeff -= weight * radians.sin();
            b_coeff += weight * radians.cos();
        }
    }
    if a_coeff == 0.0 && b_coeff == 0.0 {
        return false;
    }

    let optimum = modulo360(b_coeff.atan2(a_coeff).to_degrees());
    let hi = (ccw_margin - COLLISION_MARGIN).max(0.0);
    let lo = -(cw_margin - COLLISION_MARGIN).max(0.0);
    let delta = angle_diff(x, optimum).clamp(lo, hi);
    if delta.abs() < MIN_ROTATION {
        return false;
    }

    let rotated = modulo360(x + delta);
    for &e in &band {
        graph.set_angle(e, rotated);
    }
    true
}

/// Collects the nodes reachable from `start` without crossing an edge of
/// split `s`.
fn collect_side(graph: &SplitsGraph, start: NodeId, s: i32) -> HashSet<NodeId> {
    let mut side = HashSet::from([start]);
    let mut stack = vec![start];
    while let Some(v) = stack.pop() {
        for e in graph.adjacent_edges(v) {
            if graph.split(e) == s {
                continue;
            }
            let w = graph.opposite(v, e);
            if side.insert(w) {
                stack.push(w);
            }
        }
    }
    side
}
