//! Phylogenetic graph and tree types.
//!
//! * [PhyloGraph] - graph with taxa, labels, edge weights and confidences
//! * [PhyloTree] - rooted tree / reticulate network on top of [PhyloGraph]
//! * [reticulate] - lexical conventions for reticulate-node markers
//!
//! Both types deref to their base type for read-only queries; mutation
//! goes through their own methods so that taxon associations, attribute
//! maps, and the special-edge set stay consistent under deletion.

pub mod phylo_graph;
pub mod phylo_tree;
pub mod reticulate;

pub use phylo_graph::PhyloGraph;
pub use phylo_tree::PhyloTree;
