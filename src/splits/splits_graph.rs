//! Split networks: phylogenetic graphs whose edges carry split ids.

use crate::graph::{EdgeId, EdgeMap, GraphError, InsertPosition, NodeId};
use crate::phylo::PhyloGraph;
use std::collections::HashSet;
use std::ops::Deref;

/// Sentinel split id used by layout construction for temporary edges.
pub const TEMPORARY_SPLIT: i32 = -1;

// =#========================================================================#=
// SPLITS GRAPH
// =#========================================================================#=
/// A [PhyloGraph] whose edges are labeled with split ids and drawing
/// angles.
///
/// All edges representing the same split form one parallel edge class;
/// removing a split contracts exactly that class. Split id 0 means
/// "unset", [TEMPORARY_SPLIT] marks scaffolding edges during layout
/// construction.
#[derive(Default)]
pub struct SplitsGraph {
    phylo: PhyloGraph,
    edge_splits: EdgeMap<i32>,
    edge_angles: EdgeMap<f64>,
}

impl Deref for SplitsGraph {
    type Target = PhyloGraph;

    fn deref(&self) -> &PhyloGraph {
        &self.phylo
    }
}

// ============================================================================
// Construction & structural mutation (pub)
// ============================================================================
impl SplitsGraph {
    /// Creates a new empty split network.
    pub fn new() -> Self {
        SplitsGraph::default()
    }

    /// Removes all nodes, edges, and split/angle attributes.
    pub fn clear(&mut self) {
        self.phylo.clear();
        self.edge_splits.clear();
        self.edge_angles.clear();
    }

    /// Creates a new node.
    pub fn new_node(&mut self) -> NodeId {
        self.phylo.new_node()
    }

    /// Creates a new edge from `source` to `target`.
    pub fn new_edge(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, GraphError> {
        self.phylo.new_edge(source, target)
    }

    /// Creates a new edge spliced at the given adjacency positions.
    pub fn new_edge_at(
        &mut self,
        source: NodeId,
        at_source: InsertPosition,
        target: NodeId,
        at_target: InsertPosition,
    ) -> Result<EdgeId, GraphError> {
        self.phylo.new_edge_at(source, at_source, target, at_target)
    }

    /// Deletes an edge together with its split and angle entries.
    pub fn delete_edge(&mut self, e: EdgeId) {
        self.edge_splits.remove(e);
        self.edge_angles.remove(e);
        self.phylo.delete_edge(e);
    }

    /// Deletes a node with its incident edges.
    pub fn delete_node(&mut self, v: NodeId) {
        for e in self.phylo.adjacent_edges(v) {
            self.edge_splits.remove(e);
            self.edge_angles.remove(e);
        }
        self.phylo.delete_node(v);
    }
}

// ============================================================================
// Attribute passthrough (pub)
// ============================================================================
impl SplitsGraph {
    /// Sets the label of a node.
    pub fn set_label(&mut self, v: NodeId, label: impl Into<String>) {
        self.phylo.set_label(v, label);
    }

    /// Sets the weight of an edge.
    pub fn set_weight(&mut self, e: EdgeId, weight: f64) {
        self.phylo.set_weight(e, weight);
    }

    /// Sets the confidence of an edge.
    pub fn set_confidence(&mut self, e: EdgeId, confidence: f64) {
        self.phylo.set_confidence(e, confidence);
    }

    /// Associates a taxon with a node.
    pub fn add_taxon(&mut self, v: NodeId, taxon: usize) {
        self.phylo.add_taxon(v, taxon);
    }

    /// Removes all taxon associations of a node.
    pub fn clear_taxa(&mut self, v: NodeId) {
        self.phylo.clear_taxa(v);
    }

    /// Removes the association of a taxon with its node.
    pub fn remove_taxon(&mut self, taxon: usize) -> bool {
        self.phylo.remove_taxon(taxon)
    }
}

// ============================================================================
// Splits & angles (pub)
// ============================================================================
impl SplitsGraph {
    /// Returns the split id of an edge, defaulting to 0 (unset).
    pub fn split(&self, e: EdgeId) -> i32 {
        self.edge_splits.get_or(e, 0)
    }

    /// Sets the split id of an edge.
    pub fn set_split(&mut self, e: EdgeId, split: i32) {
        self.edge_splits.insert(e, split);
    }

    /// Returns the drawing angle of an edge in degrees, defaulting to 0.
    pub fn angle(&self, e: EdgeId) -> f64 {
        self.edge_angles.get_or(e, 0.0)
    }

    /// Sets the drawing angle of an edge in degrees.
    pub fn set_angle(&mut self, e: EdgeId, angle: f64) {
        self.edge_angles.insert(e, angle);
    }

    /// Returns the distinct positive split ids present on edges, in
    /// ascending order.
    pub fn split_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self
            .edges()
            .map(|e| self.split(e))
            .filter(|&s| s > 0)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

// ============================================================================
// Split removal (pub)
// ============================================================================
impl SplitsGraph {
    /// Finds the separator frontier of a split as seen from taxon 1's
    /// node: all `(node, edge)` pairs where the edge carries `split_id`
    /// and the node lies on taxon 1's side of it.
    ///
    /// Returns an empty list if taxon 1 has no node.
    pub fn separators(&self, split_id: i32) -> Vec<(NodeId, EdgeId)> {
        let Some(start) = self.taxon2node(1) else {
            return Vec::new();
        };
        let mut separators = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::from([start]);
        let mut stack: Vec<NodeId> = vec![start];
        while let Some(v) = stack.pop() {
            for f in self.adjacent_edges(v) {
                if self.split(f) == split_id {
                    separators.push((v, f));
                } else {
                    let w = self.opposite(v, f);
                    if seen.insert(w) {
                        stack.push(w);
                    }
                }
            }
        }
        separators
    }

    /// Removes a split by contracting its entire edge class.
    ///
    /// For every separator pair, the far endpoint is merged into the near
    /// one: its remaining edges are re-pointed (split, weight, and angle
    /// carried over), its taxa and label are transferred, and the far node
    /// is deleted. Edges between two far nodes are dropped; their class
    /// already exists on the near side.
    pub fn remove_split(&mut self, split_id: i32) {
        let separators = self.separators(split_id);
        let far_nodes: HashSet<NodeId> = separators
            .iter()
            .map(|&(v, e)| self.opposite(v, e))
            .collect();

        for (v, e) in separators {
            let w = self.opposite(v, e);
            let neighbor_edges: Vec<EdgeId> =
                self.adjacent_edges(w).filter(|&f| f != e).collect();
            for f in neighbor_edges {
                let u = self.opposite(w, f);
                if u != v && !far_nodes.contains(&u) {
                    let g = self
                        .new_edge(u, v)
                        .expect("near and far endpoints are distinct");
                    self.set_split(g, self.split(f));
                    let weight = self.weight(f);
                    self.set_weight(g, weight);
                    let angle = self.angle(f);
                    self.set_angle(g, angle);
                }
            }

            let taxa: Vec<usize> = self.taxa(w).to_vec();
            self.clear_taxa(w);
            for t in taxa {
                self.add_taxon(v, t);
            }

            if let Some(far_label) = self.label(w).map(str::to_string) {
                match self.label(v).map(str::to_string) {
                    None => self.set_label(v, far_label),
                    Some(near_label) => {
                        self.set_label(v, format!("{near_label}, {far_label}"));
                    }
                }
            }

            self.delete_node(w);
        }
    }
}
