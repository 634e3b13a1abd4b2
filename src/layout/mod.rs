//! Planar layout algorithms for split networks.
//!
//! All algorithms consume a taxon count, a [SplitsBlock](crate::splits::SplitsBlock)
//! with a circular ordering, and produce a populated
//! [SplitsGraph](crate::splits::SplitsGraph) with per-edge angles and a
//! node→point coordinate map:
//!
//! * [EqualAngle] - classic equal-angle construction for circular splits
//! * [ConvexHull] - incremental insertion that also handles non-circular
//!   splits
//! * [NetworkOutline] - event-sweep construction of the outline network
//! * [DaylightOptimizer] - post-hoc angular relaxation per node
//! * [BoxOptimizer] - post-hoc angular relaxation per split
//!
//! Cancellation is cooperative through a
//! [ProgressListener](crate::util::ProgressListener); a canceled run
//! returns [Canceled](crate::util::Canceled) and leaves the graph
//! structurally consistent with all previously computed coordinates
//! intact.

pub mod box_optimizer;
pub mod convex_hull;
pub mod daylight;
pub mod equal_angle;
pub mod outline;

pub use box_optimizer::BoxOptimizer;
pub use convex_hull::ConvexHull;
pub use daylight::DaylightOptimizer;
pub use equal_angle::EqualAngle;
pub use outline::NetworkOutline;

use crate::graph::{NodeId, NodeMap};
use crate::splits::{SplitsBlock, SplitsGraph};
use crate::util::geometry::{modulo360, translate_by_angle, Point};
use crate::util::{Canceled, ProgressListener};
use std::collections::HashSet;

/// Default total arc over which taxa are spread, in degrees.
pub const DEFAULT_TOTAL_ANGLE: f64 = 360.0;

/// Offset that puts the first cycle position at the 9-o'clock direction.
const ANGLE_OFFSET: f64 = 270.0;

// ============================================================================
// Shared angle & coordinate assignment
// ============================================================================
/// Computes the drawing angle of every split: taxa are spread evenly over
/// `total_angle`, and a split's angle is the circular midpoint of the
/// first and last cycle positions of its part away from taxon 1.
///
/// Returns a vector indexed by 1-based split id.
pub fn assign_angles_to_splits(
    ntax: usize,
    splits: &SplitsBlock,
    cycle: &[usize],
    total_angle: f64,
) -> Vec<f64> {
    let mut split2angle = vec![0.0; splits.nsplits() + 1];
    for (s, split) in splits.iter() {
        let part = split.part_not_containing(cycle[1]);
        let mut first = 0;
        let mut last = 0;
        for i in 1..=ntax {
            if part[cycle[i]] {
                if first == 0 {
                    first = i;
                }
                last = i;
            }
        }
        split2angle[s] =
            modulo360(ANGLE_OFFSET + total_angle * (first + last) as f64 / (2.0 * ntax as f64));
    }
    split2angle
}

/// Assigns 2D coordinates to all nodes by depth-first traversal from the
/// node of `start_taxon`, translating along each edge by its angle and
/// (optionally) weight.
///
/// A set of splits already crossed on the current path guards against
/// re-traversing a split: whichever parallel edge of a split is used to
/// reach a node, the resulting coordinate is the same.
///
/// Cancellation is polled once per visited node.
pub fn assign_coordinates_to_nodes(
    use_weights: bool,
    graph: &SplitsGraph,
    start_taxon: usize,
    node2point: &mut NodeMap<Point>,
    progress: &mut dyn ProgressListener,
) -> Result<(), Canceled> {
    let Some(start) = graph.taxon2node(start_taxon).or_else(|| graph.first_node()) else {
        return Ok(());
    };
    node2point.insert(start, Point::ZERO);
    let mut splits_in_path: HashSet<i32> = HashSet::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    assign_coordinates_rec(
        use_weights,
        graph,
        start,
        &mut splits_in_path,
        &mut visited,
        node2point,
        progress,
    )
}

fn assign_coordinates_rec(
    use_weights: bool,
    graph: &SplitsGraph,
    v: NodeId,
    splits_in_path: &mut HashSet<i32>,
    visited: &mut HashSet<NodeId>,
    node2point: &mut NodeMap<Point>,
    progress: &mut dyn ProgressListener,
) -> Result<(), Canceled> {
    if !visited.insert(v) {
        return Ok(());
    }
    progress.check_for_cancel()?;
    for e in graph.adjacent_edges(v) {
        let s = graph.split(e);
        if !splits_in_path.contains(&s) {
            let w = graph.opposite(v, e);
            let distance = if use_weights { graph.weight(e) } else { 1.0 };
            let p = translate_by_angle(
                node2point.get(v).copied().unwrap_or(Point::ZERO),
                graph.angle(e),
                distance,
            );
            node2point.insert(w, p);
            splits_in_path.insert(s);
            assign_coordinates_rec(
                use_weights,
                graph,
                w,
                splits_in_path,
                visited,
                node2point,
                progress,
            )?;
            splits_in_path.remove(&s);
        }
    }
    Ok(())
}
