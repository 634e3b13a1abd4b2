//! Rooted phylogenetic trees and reticulate networks.

use crate::graph::{EdgeId, GraphError, InsertPosition, NodeId, NodeMap};
use crate::phylo::phylo_graph::PhyloGraph;
use crate::phylo::reticulate;
use log::warn;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;

/// Sentinel weight on a reticulate in-edge meaning "explicitly not the
/// accepted parent", as opposed to weight 0, "never evaluated".
pub const NOT_ACCEPTED_WEIGHT: f64 = -1.0;

// =#========================================================================#=
// PHYLO TREE
// =#========================================================================#=
/// A [PhyloGraph] with rooting and reticulation support.
///
/// # Rooting
/// `root` is optional; `None` means the tree is unrooted. The Newick
/// writer then anchors output at the highest-degree node, which affects
/// only serialization, not semantics.
///
/// # Reticulations
/// Edges in the *special* set are reticulate (non-tree) edges: they enter
/// a node of in-degree > 1 and must never be traversed when climbing back
/// toward the root. Their weight carries reticulate semantics: a positive
/// weight marks the accepted (solid-drawn) parent edge, of which each
/// reticulate node has at most one; weight ≤ 0 marks a non-accepted
/// parent (see [NOT_ACCEPTED_WEIGHT]).
///
/// # Guide tree
/// `guide_tree_children` stores an auxiliary child ordering (the LSA tree)
/// per node, independent of the actual graph edges; algorithms that need a
/// tree-shaped view of a reticulate network maintain it.
#[derive(Default, Debug)]
pub struct PhyloTree {
    phylo: PhyloGraph,
    root: Option<NodeId>,
    special_edges: BTreeSet<EdgeId>,
    tree_weight: f64,
    guide_tree_children: NodeMap<Vec<NodeId>>,
    input_has_multi_labels: bool,
}

impl Deref for PhyloTree {
    type Target = PhyloGraph;

    fn deref(&self) -> &PhyloGraph {
        &self.phylo
    }
}

// ============================================================================
// Construction & structural mutation (pub)
// ============================================================================
impl PhyloTree {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        PhyloTree {
            tree_weight: 1.0,
            ..PhyloTree::default()
        }
    }

    /// Removes all nodes, edges, attributes, and tree state.
    pub fn clear(&mut self) {
        self.phylo.clear();
        self.root = None;
        self.special_edges.clear();
        self.tree_weight = 1.0;
        self.guide_tree_children.clear();
        self.input_has_multi_labels = false;
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

    /// Deletes an edge, dropping its special flag if set.
    pub fn delete_edge(&mut self, e: EdgeId) {
        self.special_edges.remove(&e);
        self.phylo.delete_edge(e);
    }

    /// Deletes a node with its incident edges and auxiliary tree state.
    ///
    /// If the node was the root, the tree becomes unrooted.
    pub fn delete_node(&mut self, v: NodeId) {
        for e in self.phylo.adjacent_edges(v) {
            self.special_edges.remove(&e);
        }
        self.guide_tree_children.remove(v);
        if self.root == Some(v) {
            self.root = None;
        }
        self.phylo.delete_node(v);
    }
}

// ============================================================================
// Attribute passthrough (pub)
// ============================================================================
impl PhyloTree {
    /// Sets the label of a node.
    pub fn set_label(&mut self, v: NodeId, label: impl Into<String>) {
        self.phylo.set_label(v, label);
    }

    /// Removes the label of a node.
    pub fn remove_label(&mut self, v: NodeId) {
        self.phylo.remove_label(v);
    }

    /// Sets the label of an edge.
    pub fn set_edge_label(&mut self, e: EdgeId, label: impl Into<String>) {
        self.phylo.set_edge_label(e, label);
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
// Root, special edges, tree state (pub)
// ============================================================================
impl PhyloTree {
    /// Returns the root, or `None` if the tree is unrooted.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Sets or clears the root.
    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    /// Returns whether an edge is a reticulate (special) edge.
    pub fn is_special(&self, e: EdgeId) -> bool {
        self.special_edges.contains(&e)
    }

    /// Marks or unmarks an edge as reticulate.
    pub fn set_special(&mut self, e: EdgeId, special: bool) {
        if special {
            self.special_edges.insert(e);
        } else {
            self.special_edges.remove(&e);
        }
    }

    /// Iterates over the reticulate edges in id order.
    pub fn special_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.special_edges.iter().copied()
    }

    /// Returns whether the tree has any reticulate edges.
    pub fn has_special_edges(&self) -> bool {
        !self.special_edges.is_empty()
    }

    /// Returns the whole-tree weight (e.g. bootstrap support), default 1.0.
    pub fn tree_weight(&self) -> f64 {
        self.tree_weight
    }

    /// Sets the whole-tree weight.
    pub fn set_tree_weight(&mut self, weight: f64) {
        self.tree_weight = weight;
    }

    /// Returns the guide-tree (LSA) children of a node.
    pub fn guide_tree_children(&self, v: NodeId) -> &[NodeId] {
        self.guide_tree_children
            .get(v)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sets the guide-tree (LSA) children of a node.
    pub fn set_guide_tree_children(&mut self, v: NodeId, children: Vec<NodeId>) {
        self.guide_tree_children.insert(v, children);
    }

    /// Returns whether parsing encountered and disambiguated duplicate
    /// labels.
    pub fn input_has_multi_labels(&self) -> bool {
        self.input_has_multi_labels
    }

    pub(crate) fn set_input_has_multi_labels(&mut self, value: bool) {
        self.input_has_multi_labels = value;
    }

    /// Returns the children of a node, i.e. the targets of its out-edges
    /// in adjacency order.
    pub fn children(&self, v: NodeId) -> Vec<NodeId> {
        self.out_edges(v).map(|e| self.target(e)).collect()
    }

    /// Returns whether a node is a leaf (out-degree 0).
    pub fn is_leaf(&self, v: NodeId) -> bool {
        self.out_degree(v) == 0
    }
}

// ============================================================================
// Divertex removal & rerooting (pub)
// ============================================================================
impl PhyloTree {
    /// Collapses a degree-2 node by merging its two incident edges into
    /// one, summing their weights when both are explicitly set.
    ///
    /// The new edge takes the cyclic adjacency position of the old edge at
    /// each surviving endpoint and is directed along the path through `v`
    /// (in-then-out orientation preserved where present). Returns the new
    /// edge.
    ///
    /// # Panics
    /// Panics if the degree of `v` is not 2.
    pub fn del_divertex(&mut self, v: NodeId) -> EdgeId {
        assert_eq!(
            self.degree(v),
            2,
            "del_divertex requires a degree-2 node, {v} has degree {}",
            self.degree(v)
        );
        let mut incident = self.adjacent_edges(v);
        let e1 = incident.next().expect("degree 2");
        let e2 = incident.next().expect("degree 2");
        drop(incident);

        let x = self.opposite(v, e1);
        let y = self.opposite(v, e2);

        // keep the path direction: x → v → y becomes x → y
        let (source, at_source, target, at_target) = if self.target(e2) == v && self.source(e1) == v
        {
            (y, InsertPosition::After(e2), x, InsertPosition::After(e1))
        } else {
            (x, InsertPosition::After(e1), y, InsertPosition::After(e2))
        };
        let f = match self.new_edge_at(source, at_source, target, at_target) {
            Ok(f) => f,
            Err(err) => panic!("del_divertex on parallel edges: {err}"),
        };

        if self.has_explicit_weight(e1) && self.has_explicit_weight(e2) {
            let sum = self.weight(e1) + self.weight(e2);
            self.set_weight(f, sum);
        }
        self.delete_node(v);
        f
    }

    /// Roots the tree at the midpoint of an edge, splitting the edge's
    /// length into `weight_to_source` and `weight_to_target`.
    ///
    /// If the current root is an unlabeled, taxon-free degree-2 node
    /// adjacent to `e`, the weights are redistributed over its two edges
    /// in place and no node is created ("root stays root"). Otherwise the
    /// old root is erased (see [`erase_root`](PhyloTree::erase_root)) and
    /// a new degree-2 root node is spliced into `e`, inheriting `e`'s
    /// label on both halves.
    ///
    /// Edge directions elsewhere in the tree are not touched; call
    /// [`redirect_edges_away_from_root`](PhyloTree::redirect_edges_away_from_root)
    /// afterwards to restore the parent→child orientation.
    pub fn set_root_on_edge(&mut self, e: EdgeId, weight_to_source: f64, weight_to_target: f64) {
        if let Some(root) = self.root {
            if self.degree(root) == 2
                && self.label(root).is_none()
                && self.taxa(root).is_empty()
                && (self.source(e) == root || self.target(e) == root)
            {
                let other = self
                    .adjacent_edges(root)
                    .find(|&f| f != e)
                    .expect("degree 2");
                if self.source(e) == root {
                    self.set_weight(e, weight_to_target);
                    self.set_weight(other, weight_to_source);
                } else {
                    self.set_weight(e, weight_to_source);
                    self.set_weight(other, weight_to_target);
                }
                return;
            }
            self.erase_root();
        }

        let v = self.source(e);
        let w = self.target(e);
        let label = self.edge_label(e).map(str::to_string);
        let u = self.new_node();
        let uv = self
            .new_edge_at(u, InsertPosition::Append, v, InsertPosition::After(e))
            .expect("distinct endpoints");
        let uw = self
            .new_edge_at(u, InsertPosition::Append, w, InsertPosition::After(e))
            .expect("distinct endpoints");
        self.set_weight(uv, weight_to_source);
        self.set_weight(uw, weight_to_target);
        if let Some(label) = label {
            self.set_edge_label(uv, label.clone());
            self.set_edge_label(uw, label);
        }
        self.delete_edge(e);
        self.root = Some(u);
    }

    /// Unroots the tree. If the old root was an unlabeled, taxon-free
    /// out-degree-2 node, it is collapsed back into a single edge,
    /// preserving one of the two edge labels if present.
    pub fn erase_root(&mut self) {
        let Some(old_root) = self.root.take() else {
            return;
        };
        if self.degree(old_root) == 2
            && self.out_degree(old_root) == 2
            && self.label(old_root).is_none()
            && self.taxa(old_root).is_empty()
        {
            let kept_label = self
                .adjacent_edges(old_root)
                .find_map(|f| self.edge_label(f).map(str::to_string));
            let f = self.del_divertex(old_root);
            if let Some(label) = kept_label {
                self.set_edge_label(f, label);
            }
        }
    }

    /// Reverses every non-special edge that points toward the root, so
    /// that all tree edges run parent→child again after rerooting.
    ///
    /// Special (reticulate) edges keep their direction: they always point
    /// into the reticulate node, regardless of the root.
    pub fn redirect_edges_away_from_root(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![(root, None::<EdgeId>)];
        let mut visited = BTreeSet::from([root]);
        while let Some((v, entered_by)) = stack.pop() {
            let incident: Vec<EdgeId> = self.adjacent_edges(v).collect();
            for e in incident {
                if Some(e) == entered_by || self.is_special(e) {
                    continue;
                }
                let e = if self.target(e) == v { self.reverse_edge(e) } else { e };
                let w = self.target(e);
                if visited.insert(w) {
                    stack.push((w, Some(e)));
                }
            }
        }
    }

    /// Replaces an edge by its reversal at the same cyclic adjacency
    /// positions, carrying over weight, labels, confidence, and the
    /// special flag. Returns the new edge id.
    fn reverse_edge(&mut self, e: EdgeId) -> EdgeId {
        let source = self.source(e);
        let target = self.target(e);
        let f = self
            .new_edge_at(
                target,
                InsertPosition::After(e),
                source,
                InsertPosition::After(e),
            )
            .expect("distinct endpoints");
        if self.has_explicit_weight(e) {
            let w = self.weight(e);
            self.set_weight(f, w);
        }
        if let Some(label) = self.edge_label(e).map(str::to_string) {
            self.set_edge_label(f, label);
        }
        let confidence = self.confidence(e);
        if confidence != crate::phylo::phylo_graph::DEFAULT_CONFIDENCE {
            self.set_confidence(f, confidence);
        }
        if self.is_special(e) {
            self.set_special(f, true);
        }
        self.delete_edge(e);
        f
    }
}

// ============================================================================
// Reticulation postprocessing (pub)
// ============================================================================
impl PhyloTree {
    /// Merges all nodes sharing a reticulate marker into single reticulate
    /// nodes and establishes the special-edge and weight invariants.
    ///
    /// For each marker group, a fresh node replaces the members: incident
    /// edges are redirected to it (in-edges become special), member labels
    /// are stripped of their marker suffix and joined with `,`. Among the
    /// merged node's in-edges at most one keeps a positive weight (the
    /// first wins; later ones are forced to 0 with a warning), and once a
    /// positive in-edge exists the remaining zero-weight in-edges are set
    /// to [NOT_ACCEPTED_WEIGHT].
    pub fn post_process_reticulate(&mut self) {
        // group member nodes by marker, stripping the suffix off labels
        let mut marker2nodes: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
        let nodes: Vec<NodeId> = self.nodes().collect();
        for v in nodes {
            let Some(label) = self.label(v) else { continue };
            let Some(marker) = reticulate::find_reticulate_label(label) else {
                continue;
            };
            let marker = marker.to_string();
            let stripped = reticulate::remove_reticulate_node_suffix(label).to_string();
            if stripped.is_empty() {
                self.remove_label(v);
            } else {
                self.set_label(v, stripped);
            }
            marker2nodes.entry(marker).or_default().push(v);
        }

        for (_, members) in marker2nodes {
            let u = self.new_node();
            for v in members {
                if let Some(label) = self.label(v).map(str::to_string) {
                    match self.label(u).map(str::to_string) {
                        None => self.set_label(u, label),
                        Some(existing) if !existing.split(',').any(|part| part == label) => {
                            self.set_label(u, format!("{existing},{label}"));
                        }
                        Some(_) => {}
                    }
                }
                let incident: Vec<EdgeId> = self.adjacent_edges(v).collect();
                for e in incident {
                    let f = if self.source(e) == v {
                        let target = self.target(e);
                        self.new_edge(u, target).expect("merged node is fresh")
                    } else {
                        let source = self.source(e);
                        let f = self.new_edge(source, u).expect("merged node is fresh");
                        self.set_special(f, true);
                        f
                    };
                    if self.has_explicit_weight(e) {
                        let w = self.weight(e);
                        self.set_weight(f, w);
                    }
                    if let Some(label) = self.edge_label(e).map(str::to_string) {
                        self.set_edge_label(f, label);
                    }
                }
                self.delete_node(v);
            }
            self.enforce_single_accepted_in_edge(u);
        }
    }

    /// Keeps at most one positive-weight in-edge at a reticulate node and
    /// marks the remaining zero-weight in-edges as explicitly not
    /// accepted.
    fn enforce_single_accepted_in_edge(&mut self, u: NodeId) {
        let in_edges: Vec<EdgeId> = self.in_edges(u).collect();
        let mut has_accepted = false;
        for &e in &in_edges {
            if self.weight(e) > 0.0 {
                if has_accepted {
                    warn!("reticulate node {u} has more than one positive in-edge, forcing {e} to 0");
                    self.set_weight(e, 0.0);
                } else {
                    has_accepted = true;
                }
            }
        }
        if has_accepted {
            for &e in &in_edges {
                if self.weight(e) == 0.0 {
                    self.set_weight(e, NOT_ACCEPTED_WEIGHT);
                }
            }
        }
    }
}

// ============================================================================
// Structure checks (pub)
// ============================================================================
impl PhyloTree {
    /// Returns whether the underlying directed graph is acyclic.
    ///
    /// Works on a scratch copy by repeatedly stripping out-degree-0 nodes;
    /// a cycle is present exactly when stripping gets stuck.
    pub fn is_dag(&self) -> bool {
        let mut scratch = PhyloGraph::new();
        scratch.copy_from(self);
        loop {
            let strippable: Vec<NodeId> = scratch
                .nodes()
                .filter(|&v| scratch.out_degree(v) == 0)
                .collect();
            if strippable.is_empty() {
                return scratch.node_count() == 0;
            }
            for v in strippable {
                scratch.delete_node(v);
            }
        }
    }
}
