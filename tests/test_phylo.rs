use splitwick::newick::parse_newick_str;
use splitwick::phylo::{PhyloGraph, PhyloTree};

// --- TESTS TAXON BOOKKEEPING ---
#[test]
fn test_add_taxon_is_idempotent() {
    let mut graph = PhyloGraph::new();
    let v = graph.new_node();
    graph.add_taxon(v, 3);
    graph.add_taxon(v, 3);

    assert_eq!(graph.taxa(v), &[3]);
    assert_eq!(graph.taxon2node(3), Some(v));
    assert_eq!(graph.taxon_count(), 1);
}

#[test]
fn test_add_taxon_to_second_node_is_ignored() {
    let mut graph = PhyloGraph::new();
    let v = graph.new_node();
    let w = graph.new_node();
    graph.add_taxon(v, 1);
    graph.add_taxon(w, 1);

    assert_eq!(graph.taxon2node(1), Some(v));
    assert!(graph.taxa(w).is_empty());
}

#[test]
fn test_remove_taxon_handles_sparse_ids() {
    let mut graph = PhyloGraph::new();
    let v = graph.new_node();
    graph.add_taxon(v, 1000);

    assert!(graph.remove_taxon(1000));
    assert!(!graph.remove_taxon(1000));
    assert!(!graph.remove_taxon(5));
    assert!(graph.taxa(v).is_empty());
    assert_eq!(graph.taxon2node(1000), None);
}

#[test]
fn test_taxon_invariant_under_mutation() {
    let mut graph = PhyloGraph::new();
    let v = graph.new_node();
    let w = graph.new_node();
    graph.add_taxon(v, 1);
    graph.add_taxon(v, 2);
    graph.add_taxon(w, 3);
    graph.clear_taxa(v);
    graph.add_taxon(v, 2);
    graph.delete_node(w);

    // both directions of the association must agree
    for (t, node) in graph.taxon_associations() {
        assert!(graph.taxa(node).contains(&t));
    }
    for node in graph.nodes() {
        for &t in graph.taxa(node) {
            assert_eq!(graph.taxon2node(t), Some(node));
        }
    }
    assert_eq!(graph.taxon2node(1), None);
    assert_eq!(graph.taxon2node(3), None);
    assert_eq!(graph.taxon2node(2), Some(v));
}

// --- TESTS DEEP COPY ---
#[test]
fn test_copy_preserves_structure_and_attributes() {
    let mut graph = PhyloGraph::new();
    let a = graph.new_node();
    let b = graph.new_node();
    let c = graph.new_node();
    let ab = graph.new_edge(a, b).unwrap();
    let ac = graph.new_edge(a, c).unwrap();
    graph.set_label(b, "B");
    graph.set_weight(ab, 2.5);
    graph.set_confidence(ab, 0.95);
    graph.set_edge_label(ac, "branch");
    graph.add_taxon(b, 1);

    let mut copy = PhyloGraph::new();
    let (node_map, edge_map) = copy.copy_from(&graph);

    assert_eq!(copy.node_count(), 3);
    assert_eq!(copy.edge_count(), 2);
    assert_eq!(copy.label(node_map[&b]), Some("B"));
    assert_eq!(copy.weight(edge_map[&ab]), 2.5);
    assert_eq!(copy.confidence(edge_map[&ab]), 0.95);
    assert_eq!(copy.confidence(edge_map[&ac]), 1.0);
    assert!(!copy.has_explicit_weight(edge_map[&ac]));
    assert_eq!(copy.edge_label(edge_map[&ac]), Some("branch"));
    assert_eq!(copy.taxon2node(1), Some(node_map[&b]));
    assert_eq!(copy.source(edge_map[&ab]), node_map[&a]);
}

#[test]
fn test_copy_preserves_adjacency_order() {
    let mut graph = PhyloGraph::new();
    let hub = graph.new_node();
    let n1 = graph.new_node();
    let n2 = graph.new_node();
    let n3 = graph.new_node();
    let e1 = graph.new_edge(hub, n1).unwrap();
    let _e2 = graph.new_edge(hub, n2).unwrap();
    // splice between the two existing edges
    let _e3 = graph
        .new_edge_at(
            hub,
            splitwick::graph::InsertPosition::After(e1),
            n3,
            splitwick::graph::InsertPosition::Append,
        )
        .unwrap();

    let mut copy = PhyloGraph::new();
    let (node_map, edge_map) = copy.copy_from(&graph);

    let original: Vec<_> = graph
        .adjacent_edges(hub)
        .map(|e| edge_map[&e])
        .collect();
    let copied: Vec<_> = copy.adjacent_edges(node_map[&hub]).collect();
    assert_eq!(original, copied);
}

// --- TESTS DIVERTEX REMOVAL ---
#[test]
fn test_del_divertex_sums_weights() {
    let mut tree = PhyloTree::new();
    let a = tree.new_node();
    let v = tree.new_node();
    let b = tree.new_node();
    let e1 = tree.new_edge(a, v).unwrap();
    let e2 = tree.new_edge(v, b).unwrap();
    tree.set_weight(e1, 1.5);
    tree.set_weight(e2, 2.25);

    let f = tree.del_divertex(v);

    assert_eq!(tree.node_count(), 2);
    assert_eq!(tree.edge_count(), 1);
    assert_eq!(tree.weight(f), 3.75);
    assert_eq!(tree.source(f), a);
    assert_eq!(tree.target(f), b);
}

#[test]
fn test_del_divertex_without_weights_keeps_default() {
    let mut tree = PhyloTree::new();
    let a = tree.new_node();
    let v = tree.new_node();
    let b = tree.new_node();
    tree.new_edge(a, v).unwrap();
    tree.new_edge(v, b).unwrap();

    let f = tree.del_divertex(v);
    assert!(!tree.has_explicit_weight(f));
    assert_eq!(tree.weight(f), 1.0);
}

#[test]
#[should_panic]
fn test_del_divertex_rejects_other_degrees() {
    let mut tree = PhyloTree::new();
    let a = tree.new_node();
    let v = tree.new_node();
    tree.new_edge(a, v).unwrap();
    tree.del_divertex(v);
}

// --- TESTS REROOTING ---
#[test]
fn test_set_root_on_edge_splices_new_root() {
    let mut tree = parse_newick_str("((A:1,B:1):2,C:3);").unwrap();
    let a = tree
        .nodes()
        .find(|&v| tree.label(v) == Some("A"))
        .unwrap();
    let edge_to_a = tree.adjacent_edges(a).next().unwrap();

    tree.set_root_on_edge(edge_to_a, 0.25, 0.75);
    tree.redirect_edges_away_from_root();

    let root = tree.root().unwrap();
    assert_eq!(tree.degree(root), 2);
    assert_eq!(tree.out_degree(root), 2);
    let weights: Vec<f64> = tree
        .adjacent_edges(root)
        .map(|e| tree.weight(e))
        .collect();
    assert!(weights.contains(&0.25) && weights.contains(&0.75));
}

#[test]
fn test_set_root_on_adjacent_edge_keeps_root() {
    let mut tree = parse_newick_str("((A:1,B:1):2,(C:1,D:1):2);").unwrap();
    let root = tree.root().unwrap();
    assert_eq!(tree.degree(root), 2);
    let node_count = tree.node_count();
    let e = tree.adjacent_edges(root).next().unwrap();

    tree.set_root_on_edge(e, 1.5, 2.5);

    // no new node: the existing degree-2 root was reused
    assert_eq!(tree.root(), Some(root));
    assert_eq!(tree.node_count(), node_count);
    let weights: Vec<f64> = tree
        .adjacent_edges(root)
        .map(|f| tree.weight(f))
        .collect();
    assert!(weights.contains(&1.5) && weights.contains(&2.5));
}

#[test]
fn test_erase_root_collapses_divertex() {
    let mut tree = parse_newick_str("((A:1,B:1):2,C:3);").unwrap();
    let node_count = tree.node_count();

    tree.erase_root();

    assert_eq!(tree.root(), None);
    assert_eq!(tree.node_count(), node_count - 1);
}

// --- TESTS TREE STATE ---
#[test]
fn test_children_and_leaves() {
    let tree = parse_newick_str("((A:1,B:1):2,C:3);").unwrap();
    let root = tree.root().unwrap();
    let children = tree.children(root);
    assert_eq!(children.len(), 2);
    assert!(!tree.is_leaf(root));

    let c = tree.nodes().find(|&v| tree.label(v) == Some("C")).unwrap();
    assert!(tree.is_leaf(c));
    assert!(children.contains(&c));
}

#[test]
fn test_tree_weight_and_guide_children() {
    let mut tree = parse_newick_str("((A:1,B:1):2,C:3);").unwrap();
    assert_eq!(tree.tree_weight(), 1.0);
    tree.set_tree_weight(0.8);
    assert_eq!(tree.tree_weight(), 0.8);

    let root = tree.root().unwrap();
    let children = tree.children(root);
    assert!(tree.guide_tree_children(root).is_empty());
    tree.set_guide_tree_children(root, children.clone());
    assert_eq!(tree.guide_tree_children(root), children.as_slice());
}

// --- TESTS STRUCTURE CHECKS ---
#[test]
fn test_tree_is_dag() {
    let tree = parse_newick_str("((A:1,B:1):1,C:1);").unwrap();
    assert!(tree.is_dag());
}

#[test]
fn test_cycle_is_not_dag() {
    let mut tree = PhyloTree::new();
    let a = tree.new_node();
    let b = tree.new_node();
    let c = tree.new_node();
    tree.new_edge(a, b).unwrap();
    tree.new_edge(b, c).unwrap();
    tree.new_edge(c, a).unwrap();
    assert!(!tree.is_dag());
}

#[test]
fn test_reticulate_network_is_dag() {
    let tree = parse_newick_str("((x#H1:0,A:1):1,(x#H1:1,B:1):1);").unwrap();
    assert!(tree.is_dag());
}
