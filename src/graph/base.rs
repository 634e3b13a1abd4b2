//! Core graph structure with nodes, directed edges, and ordered adjacency.

use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =#========================================================================#=
// ELEMENT IDS
// =#========================================================================#=
/// Identity of a node in a [Graph].
///
/// Ids are assigned monotonically and never reused while the graph lives,
/// so a stale id of a deleted node can never alias a later node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u32);

/// Identity of an edge in a [Graph].
///
/// Same id discipline as [NodeId]: monotonic, never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EdgeId(u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Where to splice a new edge into an endpoint's cyclic adjacency list.
///
/// Embedding algorithms use [`Before`](InsertPosition::Before) and
/// [`After`](InsertPosition::After) to place an edge at a specific angular
/// position without disturbing the existing order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InsertPosition {
    /// Append at the end of the adjacency list (default).
    #[default]
    Append,
    /// Insert directly before the given reference edge.
    Before(EdgeId),
    /// Insert directly after the given reference edge.
    After(EdgeId),
}

// =#========================================================================#=
// ERRORS
// =#========================================================================#=
/// Structural errors raised by graph mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Self edges (loops) are not supported.
    #[error("illegal self edge at node {0}")]
    SelfEdge(NodeId),
}

// =#========================================================================#=
// GRAPH
// =#========================================================================#=
#[derive(Debug)]
struct NodeEntry {
    /// Incident edges in cyclic insertion order.
    adjacency: SmallVec<[EdgeId; 4]>,
}

#[derive(Debug)]
struct EdgeEntry {
    source: NodeId,
    target: NodeId,
}

/// A mutable multigraph with directed edges and stable element identities.
///
/// # Structure
/// - Nodes and edges are stored in id order, so [`nodes()`](Graph::nodes)
///   and [`edges()`](Graph::edges) iterate deterministically in creation
///   order.
/// - Each node keeps its incident edges in *cyclic insertion order*; this
///   order is preserved under deletion and can be controlled on insertion
///   via [`new_edge_at`](Graph::new_edge_at).
/// - Edges carry a direction (source, target), but adjacency lists contain
///   both in- and out-edges.
///
/// # Mutation discipline
/// Structural mutation must not happen while iterating the graph's node or
/// edge lists; iterators borrow the graph, so the borrow checker enforces
/// this. To delete while traversing, collect the ids first.
///
/// # Liveness
/// Accessors taking an id panic if the element has been deleted; callers
/// holding possibly-stale ids (e.g. from an auxiliary [NodeMap](super::NodeMap))
/// check with [`contains_node`](Graph::contains_node) /
/// [`contains_edge`](Graph::contains_edge) first.
#[derive(Default, Debug)]
pub struct Graph {
    nodes: BTreeMap<NodeId, NodeEntry>,
    edges: BTreeMap<EdgeId, EdgeEntry>,
    next_node_id: u32,
    next_edge_id: u32,
}

// ============================================================================
// Construction & Mutation (pub)
// ============================================================================
impl Graph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Graph::default()
    }

    /// Removes all nodes and edges.
    ///
    /// Ids continue from where they left off, so ids from before the clear
    /// stay dead.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Creates a new node and returns its id.
    pub fn new_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(
            id,
            NodeEntry {
                adjacency: SmallVec::new(),
            },
        );
        id
    }

    /// Creates a new edge from `source` to `target`, appended to both
    /// endpoints' adjacency lists.
    ///
    /// # Returns
    /// * `Ok(EdgeId)` - the new edge
    /// * `Err(GraphError::SelfEdge)` - if `source == target`
    ///
    /// # Panics
    /// Panics if either endpoint is not alive.
    pub fn new_edge(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, GraphError> {
        self.new_edge_at(source, InsertPosition::Append, target, InsertPosition::Append)
    }

    /// Creates a new edge from `source` to `target`, spliced into each
    /// endpoint's cyclic adjacency list at the given position.
    ///
    /// # Arguments
    /// * `at_source` - position in `source`'s adjacency list
    /// * `at_target` - position in `target`'s adjacency list
    ///
    /// # Returns
    /// * `Ok(EdgeId)` - the new edge
    /// * `Err(GraphError::SelfEdge)` - if `source == target`
    ///
    /// # Panics
    /// Panics if an endpoint is not alive, or if a reference edge of a
    /// [`Before`](InsertPosition::Before)/[`After`](InsertPosition::After)
    /// position is not incident to that endpoint.
    pub fn new_edge_at(
        &mut self,
        source: NodeId,
        at_source: InsertPosition,
        target: NodeId,
        at_target: InsertPosition,
    ) -> Result<EdgeId, GraphError> {
        if source == target {
            return Err(GraphError::SelfEdge(source));
        }
        assert!(self.contains_node(source), "dead source node {source}");
        assert!(self.contains_node(target), "dead target node {target}");

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.insert(id, EdgeEntry { source, target });
        self.splice_into_adjacency(source, id, at_source);
        self.splice_into_adjacency(target, id, at_target);
        Ok(id)
    }

    /// Deletes an edge, removing it from both endpoints' adjacency lists.
    ///
    /// The cyclic order of the remaining edges is unchanged.
    ///
    /// # Panics
    /// Panics if the edge is not alive.
    pub fn delete_edge(&mut self, e: EdgeId) {
        let entry = self.edges.remove(&e).unwrap_or_else(|| panic!("dead edge {e}"));
        for v in [entry.source, entry.target] {
            let adjacency = &mut self.nodes.get_mut(&v).expect("endpoint alive").adjacency;
            adjacency.retain(|&mut f| f != e);
        }
    }

    /// Deletes a node, deleting all incident edges first.
    ///
    /// # Panics
    /// Panics if the node is not alive.
    pub fn delete_node(&mut self, v: NodeId) {
        let incident: Vec<EdgeId> = self.adjacent_edges(v).collect();
        for e in incident {
            self.delete_edge(e);
        }
        self.nodes.remove(&v);
    }

    fn splice_into_adjacency(&mut self, v: NodeId, e: EdgeId, position: InsertPosition) {
        let adjacency = &mut self.nodes.get_mut(&v).expect("endpoint alive").adjacency;
        match position {
            InsertPosition::Append => adjacency.push(e),
            InsertPosition::Before(r) => {
                let i = adjacency
                    .iter()
                    .position(|&f| f == r)
                    .unwrap_or_else(|| panic!("reference edge {r} not incident to {v}"));
                adjacency.insert(i, e);
            }
            InsertPosition::After(r) => {
                let i = adjacency
                    .iter()
                    .position(|&f| f == r)
                    .unwrap_or_else(|| panic!("reference edge {r} not incident to {v}"));
                adjacency.insert(i + 1, e);
            }
        }
    }
}

// ============================================================================
// Queries (pub)
// ============================================================================
impl Graph {
    /// Returns whether the node is alive.
    pub fn contains_node(&self, v: NodeId) -> bool {
        self.nodes.contains_key(&v)
    }

    /// Returns whether the edge is alive.
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains_key(&e)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all node ids in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Iterates over all edge ids in creation order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().copied()
    }

    /// Returns the first node in creation order, or `None` if empty.
    pub fn first_node(&self) -> Option<NodeId> {
        self.nodes.keys().next().copied()
    }

    /// Returns the source node of an edge.
    ///
    /// # Panics
    /// Panics if the edge is not alive.
    pub fn source(&self, e: EdgeId) -> NodeId {
        self.edge_entry(e).source
    }

    /// Returns the target node of an edge.
    ///
    /// # Panics
    /// Panics if the edge is not alive.
    pub fn target(&self, e: EdgeId) -> NodeId {
        self.edge_entry(e).target
    }

    /// Returns the endpoint of `e` that is not `v`.
    ///
    /// # Panics
    /// Panics if the edge is not alive or `v` is not one of its endpoints.
    pub fn opposite(&self, v: NodeId, e: EdgeId) -> NodeId {
        let entry = self.edge_entry(e);
        if entry.source == v {
            entry.target
        } else if entry.target == v {
            entry.source
        } else {
            panic!("node {v} is not an endpoint of edge {e}")
        }
    }

    /// Returns the degree of a node.
    ///
    /// # Panics
    /// Panics if the node is not alive.
    pub fn degree(&self, v: NodeId) -> usize {
        self.node_entry(v).adjacency.len()
    }

    /// Returns the number of edges directed into `v`.
    ///
    /// # Panics
    /// Panics if the node is not alive.
    pub fn in_degree(&self, v: NodeId) -> usize {
        self.in_edges(v).count()
    }

    /// Returns the number of edges directed out of `v`.
    ///
    /// # Panics
    /// Panics if the node is not alive.
    pub fn out_degree(&self, v: NodeId) -> usize {
        self.out_edges(v).count()
    }

    /// Iterates over the edges incident to `v` in cyclic insertion order.
    ///
    /// # Panics
    /// Panics if the node is not alive.
    pub fn adjacent_edges(&self, v: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.node_entry(v).adjacency.iter().copied()
    }

    /// Iterates over the edges directed into `v`, in adjacency order.
    ///
    /// # Panics
    /// Panics if the node is not alive.
    pub fn in_edges(&self, v: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.adjacent_edges(v).filter(move |&e| self.target(e) == v)
    }

    /// Iterates over the edges directed out of `v`, in adjacency order.
    ///
    /// # Panics
    /// Panics if the node is not alive.
    pub fn out_edges(&self, v: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.adjacent_edges(v).filter(move |&e| self.source(e) == v)
    }

    /// Returns the first edge in `v`'s adjacency list, or `None` if
    /// `v` is isolated.
    ///
    /// # Panics
    /// Panics if the node is not alive.
    pub fn first_adjacent_edge(&self, v: NodeId) -> Option<EdgeId> {
        self.node_entry(v).adjacency.first().copied()
    }

    /// Returns the edge following `e` in `v`'s cyclic adjacency order,
    /// wrapping around at the end of the list.
    ///
    /// # Panics
    /// Panics if the node is not alive or `e` is not incident to it.
    pub fn next_adjacent_edge_cyclic(&self, v: NodeId, e: EdgeId) -> EdgeId {
        let adjacency = &self.node_entry(v).adjacency;
        let i = adjacency
            .iter()
            .position(|&f| f == e)
            .unwrap_or_else(|| panic!("edge {e} not incident to node {v}"));
        adjacency[(i + 1) % adjacency.len()]
    }

    /// Returns whether nodes `v` and `w` are connected by an edge.
    ///
    /// # Panics
    /// Panics if `v` is not alive.
    pub fn is_adjacent(&self, v: NodeId, w: NodeId) -> bool {
        self.adjacent_edges(v).any(|e| self.opposite(v, e) == w)
    }

    fn node_entry(&self, v: NodeId) -> &NodeEntry {
        self.nodes.get(&v).unwrap_or_else(|| panic!("dead node {v}"))
    }

    fn edge_entry(&self, e: EdgeId) -> &EdgeEntry {
        self.edges.get(&e).unwrap_or_else(|| panic!("dead edge {e}"))
    }
}

// ============================================================================
// Adjacency order (crate)
// ============================================================================
impl Graph {
    /// Replaces `v`'s adjacency order with the given permutation of its
    /// current incident edges. Used by deep copy to reproduce cyclic order.
    pub(crate) fn set_adjacency_order(&mut self, v: NodeId, order: &[EdgeId]) {
        let adjacency = &mut self.nodes.get_mut(&v).unwrap_or_else(|| panic!("dead node {v}")).adjacency;
        debug_assert_eq!(adjacency.len(), order.len());
        adjacency.clear();
        adjacency.extend(order.iter().copied());
    }
}
