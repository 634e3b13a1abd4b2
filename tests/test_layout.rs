use splitwick::graph::NodeMap;
use splitwick::layout::{
    BoxOptimizer, ConvexHull, DaylightOptimizer, EqualAngle, NetworkOutline,
};
use splitwick::splits::{split_id_set, ASplit, SplitsBlock, SplitsGraph};
use splitwick::util::geometry::Point;
use splitwick::util::{CancelableProgress, Canceled, SilentProgress};

fn star_splits(ntax: usize, weights: &[f64]) -> SplitsBlock {
    let mut splits = SplitsBlock::new();
    for t in 1..=ntax {
        splits.push(ASplit::new(&[t], ntax, weights[t - 1]));
    }
    let mut cycle = vec![0];
    cycle.extend(1..=ntax);
    splits.set_cycle(cycle);
    splits
}

// --- TESTS EQUAL ANGLE ---
#[test]
fn test_equal_angle_star() {
    let weights = [1.0, 2.0, 3.0, 4.0];
    let splits = star_splits(4, &weights);
    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());

    EqualAngle::new()
        .apply(
            &mut SilentProgress,
            4,
            &splits,
            &mut graph,
            &mut points,
            &split_id_set(0),
            &mut used,
        )
        .unwrap();

    assert_eq!(graph.node_count(), 5);
    assert_eq!(graph.edge_count(), 4);
    for t in 1..=4 {
        let v = graph.taxon2node(t).unwrap();
        assert_eq!(graph.degree(v), 1);
        let e = graph.adjacent_edges(v).next().unwrap();
        assert_eq!(graph.weight(e), weights[t - 1]);
        assert_eq!(graph.split(e), t as i32);
        assert!(points.contains(v));
    }
    // all trivial splits are represented by leaf edges
    assert_eq!(used.count_ones(), 4);
}

#[test]
fn test_equal_angle_wraps_interior_split() {
    let mut splits = star_splits(4, &[1.0; 4]);
    let s = splits.push(ASplit::new(&[1, 2], 4, 2.0));
    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());

    EqualAngle::new()
        .apply(
            &mut SilentProgress,
            4,
            &splits,
            &mut graph,
            &mut points,
            &split_id_set(0),
            &mut used,
        )
        .unwrap();

    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.edge_count(), 5);
    assert!(used[s]);

    let band: Vec<_> = graph.edges().filter(|&e| graph.split(e) == s as i32).collect();
    assert_eq!(band.len(), 1);
    assert_eq!(graph.weight(band[0]), 2.0);

    // all nodes are placed, and every edge of one split points the same way
    for v in graph.nodes() {
        assert!(points.contains(v));
    }
}

#[test]
fn test_equal_angle_taxon_coordinates_respect_weights() {
    let weights = [1.0, 2.0, 3.0, 4.0];
    let splits = star_splits(4, &weights);
    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());

    EqualAngle::new()
        .apply(
            &mut SilentProgress,
            4,
            &splits,
            &mut graph,
            &mut points,
            &split_id_set(0),
            &mut used,
        )
        .unwrap();

    // taxon 1 anchors the layout; the center sits at leaf-edge distance
    let t1 = graph.taxon2node(1).unwrap();
    let p1 = *points.get(t1).unwrap();
    assert_eq!(p1, Point::ZERO);

    let center = graph.opposite(t1, graph.adjacent_edges(t1).next().unwrap());
    let pc = *points.get(center).unwrap();
    assert!((pc.distance_to(p1) - weights[0]).abs() < 1e-9);

    for t in 2..=4 {
        let v = graph.taxon2node(t).unwrap();
        let pv = *points.get(v).unwrap();
        assert!((pv.distance_to(pc) - weights[t - 1]).abs() < 1e-9);
    }
}

// --- TESTS CONVEX HULL ---
#[test]
fn test_convex_hull_incompatible_pair_forms_box() {
    let mut splits = SplitsBlock::new();
    splits.push(ASplit::new(&[1, 2], 4, 1.0));
    splits.push(ASplit::new(&[1, 3], 4, 1.0));
    splits.set_cycle(vec![0, 1, 2, 3, 4]);

    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());

    ConvexHull::new()
        .apply(
            &mut SilentProgress,
            4,
            &splits,
            &mut graph,
            &mut points,
            &mut used,
        )
        .unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(used.count_ones(), 2);

    // one node per taxon, arranged in a 4-cycle with opposite edges of
    // the same split
    for t in 1..=4 {
        let v = graph.taxon2node(t).unwrap();
        assert_eq!(graph.taxa(v), &[t]);
        assert_eq!(graph.degree(v), 2);
        assert!(points.contains(v));
    }
    let split1_edges = graph.edges().filter(|&e| graph.split(e) == 1).count();
    let split2_edges = graph.edges().filter(|&e| graph.split(e) == 2).count();
    assert_eq!(split1_edges, 2);
    assert_eq!(split2_edges, 2);

    // the two taxa on the same side of split 1 are not separated by it
    let n1 = graph.taxon2node(1).unwrap();
    let n2 = graph.taxon2node(2).unwrap();
    assert!(graph
        .adjacent_edges(n1)
        .any(|e| graph.split(e) == 2 && graph.opposite(n1, e) == n2));
}

#[test]
fn test_convex_hull_skips_used_splits() {
    let mut splits = SplitsBlock::new();
    splits.push(ASplit::new(&[1, 2], 4, 1.0));
    splits.set_cycle(vec![0, 1, 2, 3, 4]);

    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());
    used.set(1, true);

    ConvexHull::new()
        .apply(
            &mut SilentProgress,
            4,
            &splits,
            &mut graph,
            &mut points,
            &mut used,
        )
        .unwrap();

    // everything was already placed: nothing to do, graph left empty
    assert_eq!(graph.node_count(), 0);
}

// --- TESTS OUTLINE ---
#[test]
fn test_outline_of_compatible_splits_is_a_tree() {
    let mut splits = star_splits(4, &[1.0; 4]);
    splits.push(ASplit::new(&[3, 4], 4, 2.0));
    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());
    let mut loops = Vec::new();

    NetworkOutline::new()
        .apply(
            &mut SilentProgress,
            4,
            &splits,
            &mut graph,
            &mut points,
            &mut used,
            &mut loops,
        )
        .unwrap();

    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.edge_count(), 5);
    assert!(loops.is_empty());
    assert_eq!(used.count_ones(), 5);
    for t in 1..=4 {
        let v = graph.taxon2node(t).unwrap();
        assert!(points.contains(v));
    }
}

#[test]
fn test_outline_records_loop_for_crossing_splits() {
    let mut splits = star_splits(4, &[1.0; 4]);
    splits.push(ASplit::new(&[1, 2], 4, 1.0));
    splits.push(ASplit::new(&[2, 3], 4, 1.0));
    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());
    let mut loops = Vec::new();

    NetworkOutline::new()
        .apply(
            &mut SilentProgress,
            4,
            &splits,
            &mut graph,
            &mut points,
            &mut used,
            &mut loops,
        )
        .unwrap();

    assert_eq!(graph.node_count(), 8);
    assert_eq!(graph.edge_count(), 9);
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].len(), 4);

    // the crossing splits appear twice each on the outline
    for s in [5, 6] {
        let count = graph.edges().filter(|&e| graph.split(e) == s).count();
        assert_eq!(count, 2);
    }
}

// --- TESTS DAYLIGHT OPTIMIZER ---
#[test]
fn test_daylight_leaves_balanced_star_alone() {
    let splits = star_splits(4, &[1.0; 4]);
    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());
    EqualAngle::new()
        .apply(
            &mut SilentProgress,
            4,
            &splits,
            &mut graph,
            &mut points,
            &split_id_set(0),
            &mut used,
        )
        .unwrap();
    let before: Vec<f64> = graph.edges().map(|e| graph.angle(e)).collect();

    DaylightOptimizer::new()
        .apply(&mut SilentProgress, &mut graph, &mut points)
        .unwrap();

    let after: Vec<f64> = graph.edges().map(|e| graph.angle(e)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_daylight_spreads_cramped_components() {
    // three leaves crammed into a 20 degree wedge around the taxon-1 node
    let mut graph = SplitsGraph::new();
    let center = graph.new_node();
    graph.add_taxon(center, 1);
    let mut points: NodeMap<Point> = NodeMap::new();
    points.insert(center, Point::ZERO);
    let mut edges = Vec::new();
    for (t, angle) in [(2, 0.0), (3, 10.0), (4, 20.0)] {
        let leaf = graph.new_node();
        graph.add_taxon(leaf, t);
        let e = graph.new_edge(center, leaf).unwrap();
        graph.set_split(e, t as i32 - 1);
        graph.set_angle(e, angle);
        points.insert(leaf, splitwick::util::geometry::translate_by_angle(Point::ZERO, angle, 1.0));
        edges.push(e);
    }

    DaylightOptimizer::new()
        .apply(&mut SilentProgress, &mut graph, &mut points)
        .unwrap();

    // the three sight components end up evenly spread
    assert!((graph.angle(edges[0]) - 0.0).abs() < 1e-9);
    assert!((graph.angle(edges[1]) - 120.0).abs() < 1e-9);
    assert!((graph.angle(edges[2]) - 240.0).abs() < 1e-9);
}

// --- TESTS BOX OPTIMIZER ---
#[test]
fn test_box_optimizer_squares_up_a_box() {
    let mut splits = SplitsBlock::new();
    splits.push(ASplit::new(&[1, 2], 4, 1.0));
    splits.push(ASplit::new(&[1, 3], 4, 1.0));
    splits.set_cycle(vec![0, 1, 2, 3, 4]);

    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());
    ConvexHull::new()
        .apply(
            &mut SilentProgress,
            4,
            &splits,
            &mut graph,
            &mut points,
            &mut used,
        )
        .unwrap();

    BoxOptimizer::new()
        .apply(&mut SilentProgress, &mut graph, &mut points)
        .unwrap();

    // the two split classes end up perpendicular, maximizing the box area
    let mut angle1 = None;
    let mut angle2 = None;
    for e in graph.edges() {
        match graph.split(e) {
            1 => angle1 = Some(graph.angle(e)),
            2 => angle2 = Some(graph.angle(e)),
            _ => {}
        }
    }
    let separation = (angle1.unwrap() - angle2.unwrap()).rem_euclid(360.0);
    let perpendicular = (separation - 90.0).abs().min((separation - 270.0).abs());
    assert!(perpendicular < 0.1, "separation was {separation}");
}

// --- TESTS CANCELLATION ---
#[test]
fn test_equal_angle_cancellation_leaves_graph_consistent() {
    let mut splits = star_splits(6, &[1.0; 6]);
    splits.push(ASplit::new(&[1, 2], 6, 1.0));
    splits.push(ASplit::new(&[1, 2, 3], 6, 1.0));
    splits.push(ASplit::new(&[1, 2, 3, 4], 6, 1.0));

    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());
    let mut progress = CancelableProgress::cancel_after(2);

    let result = EqualAngle::new().apply(
        &mut progress,
        6,
        &splits,
        &mut graph,
        &mut points,
        &split_id_set(0),
        &mut used,
    );

    assert_eq!(result, Err(Canceled));
    // the partial graph is structurally sound
    assert!(graph.node_count() > 0);
    for e in graph.edges() {
        assert!(graph.contains_node(graph.source(e)));
        assert!(graph.contains_node(graph.target(e)));
    }
    for (t, v) in graph.taxon_associations() {
        assert!(graph.contains_node(v));
        assert!(graph.taxa(v).contains(&t));
    }
}

#[test]
fn test_daylight_cancellation() {
    let splits = star_splits(4, &[1.0; 4]);
    let mut graph = SplitsGraph::new();
    let mut points: NodeMap<Point> = NodeMap::new();
    let mut used = split_id_set(splits.nsplits());
    EqualAngle::new()
        .apply(
            &mut SilentProgress,
            4,
            &splits,
            &mut graph,
            &mut points,
            &split_id_set(0),
            &mut used,
        )
        .unwrap();
    let placed_before = graph.nodes().filter(|&v| points.contains(v)).count();

    let mut progress = CancelableProgress::cancel_after(1);
    let result = DaylightOptimizer::new().apply(&mut progress, &mut graph, &mut points);

    assert_eq!(result, Err(Canceled));
    assert_eq!(progress.tasks().0, "Daylight optimizer");
    assert!(progress.progress() > 0);
    // previously computed coordinates are still there
    let placed_after = graph.nodes().filter(|&v| points.contains(v)).count();
    assert_eq!(placed_before, placed_after);
}
