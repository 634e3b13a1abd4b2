//! Graph specialized for phylogenies: taxa, labels, weights, confidences.

use crate::graph::{EdgeId, EdgeMap, Graph, GraphError, InsertPosition, NodeId, NodeMap};
use log::warn;
use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;

/// Default edge weight when none has been set explicitly.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Default edge confidence when none has been set explicitly.
pub const DEFAULT_CONFIDENCE: f64 = 1.0;

// =#========================================================================#=
// PHYLO GRAPH
// =#========================================================================#=
/// A [Graph] extended with phylogeny attributes: node/edge labels, edge
/// weights and confidences, and a bidirectional taxon↔node association.
///
/// # Taxa
/// Taxa are 1-based integer ids. Each taxon maps to at most one node; a
/// node may represent zero, one, or several taxa (several only in
/// contracted or reticulate contexts). The invariant
/// `taxon2node(t) == Some(v)  iff  t ∈ taxa(v)` is maintained by
/// [`add_taxon`](PhyloGraph::add_taxon), [`clear_taxa`](PhyloGraph::clear_taxa),
/// [`remove_taxon`](PhyloGraph::remove_taxon), and node deletion.
///
/// # Reading vs. mutating
/// The type derefs to [Graph] for read-only queries. All mutation goes
/// through `PhyloGraph`'s own methods, which keep the attribute maps and
/// taxon association consistent (deleting a node drops its taxa and
/// attribute entries).
#[derive(Default, Debug)]
pub struct PhyloGraph {
    graph: Graph,
    node_labels: NodeMap<String>,
    edge_labels: EdgeMap<String>,
    edge_weights: EdgeMap<f64>,
    edge_confidences: EdgeMap<f64>,
    taxon2node: BTreeMap<usize, NodeId>,
    node2taxa: NodeMap<Vec<usize>>,
}

impl Deref for PhyloGraph {
    type Target = Graph;

    fn deref(&self) -> &Graph {
        &self.graph
    }
}

// ============================================================================
// Construction & structural mutation (pub)
// ============================================================================
impl PhyloGraph {
    /// Creates a new empty phylogenetic graph.
    pub fn new() -> Self {
        PhyloGraph::default()
    }

    /// Removes all nodes, edges, attributes, and taxon associations.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_labels.clear();
        self.edge_labels.clear();
        self.edge_weights.clear();
        self.edge_confidences.clear();
        self.taxon2node.clear();
        self.node2taxa.clear();
    }

    /// Creates a new node.
    pub fn new_node(&mut self) -> NodeId {
        self.graph.new_node()
    }

    /// Creates a new edge from `source` to `target`.
    ///
    /// # Returns
    /// * `Ok(EdgeId)` - the new edge (weight and confidence default to 1.0)
    /// * `Err(GraphError::SelfEdge)` - if `source == target`
    pub fn new_edge(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, GraphError> {
        self.graph.new_edge(source, target)
    }

    /// Creates a new edge spliced into each endpoint's cyclic adjacency
    /// list at the given position.
    pub fn new_edge_at(
        &mut self,
        source: NodeId,
        at_source: InsertPosition,
        target: NodeId,
        at_target: InsertPosition,
    ) -> Result<EdgeId, GraphError> {
        self.graph.new_edge_at(source, at_source, target, at_target)
    }

    /// Deletes an edge together with its attribute entries.
    pub fn delete_edge(&mut self, e: EdgeId) {
        self.edge_labels.remove(e);
        self.edge_weights.remove(e);
        self.edge_confidences.remove(e);
        self.graph.delete_edge(e);
    }

    /// Deletes a node, its incident edges, its attribute entries, and the
    /// taxon associations pointing at it.
    pub fn delete_node(&mut self, v: NodeId) {
        self.clear_taxa(v);
        self.node_labels.remove(v);
        let incident: Vec<EdgeId> = self.graph.adjacent_edges(v).collect();
        for e in incident {
            self.delete_edge(e);
        }
        self.graph.delete_node(v);
    }
}

// ============================================================================
// Labels, weights, confidences (pub)
// ============================================================================
impl PhyloGraph {
    /// Returns the label of a node, or `None`.
    pub fn label(&self, v: NodeId) -> Option<&str> {
        self.node_labels.get(v).map(String::as_str)
    }

    /// Sets the label of a node.
    pub fn set_label(&mut self, v: NodeId, label: impl Into<String>) {
        self.node_labels.insert(v, label.into());
    }

    /// Removes the label of a node.
    pub fn remove_label(&mut self, v: NodeId) {
        self.node_labels.remove(v);
    }

    /// Returns the label of an edge, or `None`.
    pub fn edge_label(&self, e: EdgeId) -> Option<&str> {
        self.edge_labels.get(e).map(String::as_str)
    }

    /// Sets the label of an edge.
    pub fn set_edge_label(&mut self, e: EdgeId, label: impl Into<String>) {
        self.edge_labels.insert(e, label.into());
    }

    /// Returns the weight of an edge, defaulting to 1.0.
    pub fn weight(&self, e: EdgeId) -> f64 {
        self.edge_weights.get_or(e, DEFAULT_WEIGHT)
    }

    /// Sets the weight of an edge.
    pub fn set_weight(&mut self, e: EdgeId, weight: f64) {
        self.edge_weights.insert(e, weight);
    }

    /// Returns whether an edge has an explicitly set weight (as opposed to
    /// the 1.0 default).
    pub fn has_explicit_weight(&self, e: EdgeId) -> bool {
        self.edge_weights.contains(e)
    }

    /// Returns the confidence of an edge, defaulting to 1.0.
    pub fn confidence(&self, e: EdgeId) -> f64 {
        self.edge_confidences.get_or(e, DEFAULT_CONFIDENCE)
    }

    /// Sets the confidence of an edge.
    pub fn set_confidence(&mut self, e: EdgeId, confidence: f64) {
        self.edge_confidences.insert(e, confidence);
    }
}

// ============================================================================
// Taxa (pub)
// ============================================================================
impl PhyloGraph {
    /// Associates a taxon with a node.
    ///
    /// Re-adding the same taxon to the same node is a no-op. Adding a taxon
    /// that is already mapped to a *different* node is a caller error; it
    /// is warned about and ignored. There is no atomic move: remove the
    /// taxon from its old node first.
    pub fn add_taxon(&mut self, v: NodeId, taxon: usize) {
        match self.taxon2node.get(&taxon) {
            Some(&old) if old == v => {}
            Some(&old) => {
                warn!("taxon {taxon} is already mapped to node {old}, not moving it to {v}");
            }
            None => {
                self.taxon2node.insert(taxon, v);
                match self.node2taxa.get_mut(v) {
                    Some(list) => list.push(taxon),
                    None => {
                        self.node2taxa.insert(v, vec![taxon]);
                    }
                }
            }
        }
    }

    /// Returns the taxa represented by a node, in insertion order.
    pub fn taxa(&self, v: NodeId) -> &[usize] {
        self.node2taxa.get(v).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the node representing a taxon, or `None`.
    pub fn taxon2node(&self, taxon: usize) -> Option<NodeId> {
        self.taxon2node.get(&taxon).copied()
    }

    /// Removes all taxon associations of a node.
    pub fn clear_taxa(&mut self, v: NodeId) {
        if let Some(taxa) = self.node2taxa.remove(v) {
            for t in taxa {
                self.taxon2node.remove(&t);
            }
        }
    }

    /// Removes the association of a taxon with its node, if any.
    ///
    /// Unknown taxon ids are a no-op. Returns whether an association was
    /// removed.
    pub fn remove_taxon(&mut self, taxon: usize) -> bool {
        match self.taxon2node.remove(&taxon) {
            Some(v) => {
                if let Some(list) = self.node2taxa.get_mut(v) {
                    list.retain(|&t| t != taxon);
                    if list.is_empty() {
                        self.node2taxa.remove(v);
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Returns the number of taxon associations.
    pub fn taxon_count(&self) -> usize {
        self.taxon2node.len()
    }

    /// Iterates over all `(taxon, node)` associations in taxon order.
    pub fn taxon_associations(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.taxon2node.iter().map(|(&t, &v)| (t, v))
    }
}

// ============================================================================
// Deep copy (pub)
// ============================================================================
impl PhyloGraph {
    /// Replaces this graph with a deep copy of `other` and returns the
    /// old→new node and edge id mappings.
    ///
    /// Structure, per-node cyclic adjacency order, labels, weights,
    /// confidences, and taxon associations are all reproduced. The
    /// mappings let callers carry their own auxiliary maps over, and
    /// algorithms use the copy as a scratch graph for destructive checks.
    pub fn copy_from(
        &mut self,
        other: &PhyloGraph,
    ) -> (HashMap<NodeId, NodeId>, HashMap<EdgeId, EdgeId>) {
        self.clear();

        let mut node_map = HashMap::new();
        for v in other.nodes() {
            node_map.insert(v, self.new_node());
        }

        let mut edge_map = HashMap::new();
        for e in other.edges() {
            let f = self
                .new_edge(node_map[&other.source(e)], node_map[&other.target(e)])
                .expect("copied edges have distinct endpoints");
            edge_map.insert(e, f);
        }

        // reproduce cyclic adjacency order, which append-order creation
        // does not preserve for spliced edges
        for v in other.nodes() {
            let order: Vec<EdgeId> = other.adjacent_edges(v).map(|e| edge_map[&e]).collect();
            self.graph.set_adjacency_order(node_map[&v], &order);
        }

        for (v, &new_v) in &node_map {
            if let Some(label) = other.label(*v) {
                self.set_label(new_v, label);
            }
            for &t in other.taxa(*v) {
                self.add_taxon(new_v, t);
            }
        }
        for (e, &new_e) in &edge_map {
            if let Some(label) = other.edge_label(*e) {
                self.set_edge_label(new_e, label);
            }
            if other.has_explicit_weight(*e) {
                self.set_weight(new_e, other.weight(*e));
            }
            if other.edge_confidences.contains(*e) {
                self.set_confidence(new_e, other.confidence(*e));
            }
        }

        (node_map, edge_map)
    }
}
