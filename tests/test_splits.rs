use splitwick::splits::{is_circular, normalize_cycle, ASplit, SplitsBlock, SplitsGraph};

// --- TESTS ASPLIT ---
#[test]
fn test_split_parts_and_size() {
    let split = ASplit::new(&[1, 3], 5, 2.0);

    assert_eq!(split.ntax(), 5);
    assert_eq!(split.size(), 2);
    assert!(!split.is_trivial());
    assert_eq!(split.weight(), 2.0);
    assert_eq!(split.confidence(), 1.0);

    assert!(split.a()[1] && split.a()[3]);
    assert!(split.b()[2] && split.b()[4] && split.b()[5]);
    assert!(split.part_containing(1)[3]);
    assert!(split.part_not_containing(1)[2]);
    assert!(split.separates(1, 2));
    assert!(!split.separates(1, 3));
}

#[test]
fn test_trivial_split() {
    let split = ASplit::new(&[4], 4, 1.5).with_confidence(0.9);
    assert!(split.is_trivial());
    assert_eq!(split.size(), 1);
    assert_eq!(split.confidence(), 0.9);
}

// --- TESTS CYCLE UTILITIES ---
#[test]
fn test_normalize_cycle_rotates_to_taxon_one() {
    // taxon 1 in the middle; neighbors are 4 (previous) and 2 (next), so
    // the direction is kept
    let cycle = vec![0, 3, 4, 1, 2, 5];
    assert_eq!(normalize_cycle(&cycle), vec![0, 1, 2, 5, 3, 4]);
}

#[test]
fn test_normalize_cycle_reverses_for_canonical_direction() {
    // neighbors of taxon 1 are 2 (previous) and 4 (next): reversed
    let cycle = vec![0, 3, 2, 1, 4, 5];
    assert_eq!(normalize_cycle(&cycle), vec![0, 1, 2, 3, 5, 4]);
}

#[test]
fn test_is_circular() {
    let cycle = vec![0, 1, 2, 3, 4];
    assert!(is_circular(&ASplit::new(&[2, 3], 4, 1.0), &cycle));
    assert!(is_circular(&ASplit::new(&[1, 2], 4, 1.0), &cycle));
    assert!(!is_circular(&ASplit::new(&[2, 4], 4, 1.0), &cycle));
}

// --- TESTS SPLITS BLOCK ---
#[test]
fn test_block_ids_are_one_based() {
    let mut block = SplitsBlock::new();
    let s1 = block.push(ASplit::new(&[1], 3, 1.0));
    let s2 = block.push(ASplit::new(&[1, 2], 3, 2.0));

    assert_eq!(s1, 1);
    assert_eq!(s2, 2);
    assert_eq!(block.nsplits(), 2);
    assert_eq!(block.get(2).weight(), 2.0);
    block.set_cycle(vec![0, 1, 2, 3]);
    assert_eq!(block.cycle(), &[0, 1, 2, 3]);
}

// --- TESTS SPLITS GRAPH ---
#[test]
fn test_split_and_angle_defaults() {
    let mut graph = SplitsGraph::new();
    let a = graph.new_node();
    let b = graph.new_node();
    let e = graph.new_edge(a, b).unwrap();

    assert_eq!(graph.split(e), 0);
    assert_eq!(graph.angle(e), 0.0);
    graph.set_split(e, 3);
    graph.set_angle(e, 45.0);
    assert_eq!(graph.split(e), 3);
    assert_eq!(graph.angle(e), 45.0);
    assert_eq!(graph.split_ids(), vec![3]);
}

/// Builds the network of two crossed splits on four taxa: a square whose
/// corner nodes carry the taxa directly.
fn crossed_splits_square() -> SplitsGraph {
    let mut graph = SplitsGraph::new();
    let n1 = graph.new_node(); // taxon 1
    let n2 = graph.new_node(); // taxon 2
    let n3 = graph.new_node(); // taxon 3
    let n4 = graph.new_node(); // taxon 4
    graph.add_taxon(n1, 1);
    graph.add_taxon(n2, 2);
    graph.add_taxon(n3, 3);
    graph.add_taxon(n4, 4);

    // split 1 separates {1,2} | {3,4}; split 2 separates {1,3} | {2,4}
    for (x, y, s) in [(n1, n3, 1), (n2, n4, 1), (n1, n2, 2), (n3, n4, 2)] {
        let e = graph.new_edge(x, y).unwrap();
        graph.set_split(e, s);
        graph.set_weight(e, s as f64);
    }
    graph
}

#[test]
fn test_separators_found_from_taxon_one() {
    let graph = crossed_splits_square();
    let separators = graph.separators(1);

    assert_eq!(separators.len(), 2);
    for &(v, e) in &separators {
        assert_eq!(graph.split(e), 1);
        let taxa = graph.taxa(v);
        assert!(taxa == [1] || taxa == [2]);
    }
}

#[test]
fn test_remove_split_contracts_edge_class() {
    let mut graph = crossed_splits_square();
    graph.remove_split(1);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    let e = graph.edges().next().unwrap();
    assert_eq!(graph.split(e), 2);

    // taxa from both sides of the removed split are merged
    let n13 = graph.taxon2node(1).unwrap();
    assert_eq!(graph.taxon2node(3), Some(n13));
    let n24 = graph.taxon2node(2).unwrap();
    assert_eq!(graph.taxon2node(4), Some(n24));
    assert_ne!(n13, n24);
}
