use splitwick::graph::{EdgeId, Graph, GraphError, InsertPosition, NodeMap};

// --- TESTS GRAPH STRUCTURE ---
#[test]
fn test_new_nodes_and_edges() {
    let mut graph = Graph::new();
    let a = graph.new_node();
    let b = graph.new_node();
    let c = graph.new_node();
    let ab = graph.new_edge(a, b).unwrap();
    let ac = graph.new_edge(a, c).unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.source(ab), a);
    assert_eq!(graph.target(ab), b);
    assert_eq!(graph.opposite(a, ab), b);
    assert_eq!(graph.opposite(b, ab), a);
    assert_eq!(graph.degree(a), 2);
    assert_eq!(graph.out_degree(a), 2);
    assert_eq!(graph.in_degree(b), 1);
    assert_eq!(graph.first_node(), Some(a));
    assert_eq!(graph.adjacent_edges(a).collect::<Vec<_>>(), vec![ab, ac]);
}

#[test]
fn test_self_edge_rejected() {
    let mut graph = Graph::new();
    let a = graph.new_node();
    assert_eq!(graph.new_edge(a, a), Err(GraphError::SelfEdge(a)));
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_ids_are_never_reused() {
    let mut graph = Graph::new();
    let a = graph.new_node();
    let b = graph.new_node();
    let ab = graph.new_edge(a, b).unwrap();
    graph.delete_edge(ab);
    graph.delete_node(b);
    let c = graph.new_node();
    let ac = graph.new_edge(a, c).unwrap();

    assert_ne!(c, b);
    assert_ne!(ac, ab);
    assert!(!graph.contains_edge(ab));
    assert!(!graph.contains_node(b));
}

#[test]
fn test_delete_node_removes_incident_edges() {
    let mut graph = Graph::new();
    let a = graph.new_node();
    let b = graph.new_node();
    let c = graph.new_node();
    let ab = graph.new_edge(a, b).unwrap();
    let bc = graph.new_edge(b, c).unwrap();
    let ac = graph.new_edge(a, c).unwrap();

    graph.delete_node(b);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert!(!graph.contains_edge(ab));
    assert!(!graph.contains_edge(bc));
    assert!(graph.contains_edge(ac));
    assert_eq!(graph.adjacent_edges(a).collect::<Vec<_>>(), vec![ac]);
}

// --- TESTS CYCLIC ADJACENCY ORDER ---
#[test]
fn test_insert_positions() {
    let mut graph = Graph::new();
    let hub = graph.new_node();
    let n1 = graph.new_node();
    let n2 = graph.new_node();
    let n3 = graph.new_node();
    let n4 = graph.new_node();

    let e1 = graph.new_edge(hub, n1).unwrap();
    let e2 = graph.new_edge(hub, n2).unwrap();
    let e3 = graph
        .new_edge_at(
            hub,
            InsertPosition::After(e1),
            n3,
            InsertPosition::Append,
        )
        .unwrap();
    let e4 = graph
        .new_edge_at(
            hub,
            InsertPosition::Before(e1),
            n4,
            InsertPosition::Append,
        )
        .unwrap();

    assert_eq!(
        graph.adjacent_edges(hub).collect::<Vec<_>>(),
        vec![e4, e1, e3, e2]
    );
}

#[test]
fn test_cyclic_successor_wraps() {
    let mut graph = Graph::new();
    let hub = graph.new_node();
    let mut edges: Vec<EdgeId> = Vec::new();
    for _ in 0..3 {
        let leaf = graph.new_node();
        edges.push(graph.new_edge(hub, leaf).unwrap());
    }

    assert_eq!(graph.next_adjacent_edge_cyclic(hub, edges[0]), edges[1]);
    assert_eq!(graph.next_adjacent_edge_cyclic(hub, edges[1]), edges[2]);
    assert_eq!(graph.next_adjacent_edge_cyclic(hub, edges[2]), edges[0]);
}

#[test]
fn test_deletion_preserves_order() {
    let mut graph = Graph::new();
    let hub = graph.new_node();
    let mut edges: Vec<EdgeId> = Vec::new();
    for _ in 0..4 {
        let leaf = graph.new_node();
        edges.push(graph.new_edge(hub, leaf).unwrap());
    }

    graph.delete_edge(edges[1]);

    assert_eq!(
        graph.adjacent_edges(hub).collect::<Vec<_>>(),
        vec![edges[0], edges[2], edges[3]]
    );
    assert_eq!(graph.next_adjacent_edge_cyclic(hub, edges[3]), edges[0]);
}

// --- TESTS ATTRIBUTE MAPS ---
#[test]
fn test_node_map_basics() {
    let mut graph = Graph::new();
    let a = graph.new_node();
    let b = graph.new_node();

    let mut map: NodeMap<u32> = NodeMap::new();
    map.insert(a, 7);
    assert_eq!(map.get(a), Some(&7));
    assert_eq!(map.get(b), None);
    assert_eq!(map.get_or(b, 99), 99);
    assert!(map.contains(a));
    assert_eq!(map.remove(a), Some(7));
    assert!(map.is_empty());
}

#[test]
fn test_stale_map_entries_check_liveness() {
    let mut graph = Graph::new();
    let a = graph.new_node();
    let mut map: NodeMap<&str> = NodeMap::new();
    map.insert(a, "gone");
    graph.delete_node(a);

    // the entry survives, but the graph knows the node is dead
    assert!(map.contains(a));
    assert!(!graph.contains_node(a));
}
