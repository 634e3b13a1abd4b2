//! Splitwick is a library for phylogenetic graphs, trees, and planar
//! split network layouts, with Newick reading and writing.
//!
//! Core functionality provided:
//! - Graph core: mutable graph with stable element ids, cyclic adjacency
//!   order with splice-position insertion, and auxiliary attribute maps.
//!   See [crate::graph].
//! - Phylogeny model: [PhyloGraph] adds taxa, labels, weights and
//!   confidences; [PhyloTree] adds rooting, reticulate (special) edges,
//!   divertex collapsing, and rerooting. See [crate::phylo].
//! - Newick: parse single strings or `;`-separated lists, including
//!   quoted labels, edge weights and labels, and reticulate-node markers
//!   (`#H1`); write trees and reticulate networks back out. See
//!   [crate::newick].
//! - Splits: [ASplit] bipartitions, [SplitsBlock] collections with a
//!   circular ordering, and [SplitsGraph] networks supporting split
//!   removal by edge contraction. See [crate::splits].
//! - Layout: equal-angle, convex-hull, and outline constructions of
//!   planar split networks, plus daylight and box angular optimizers,
//!   all cooperatively cancellable. See [crate::layout].
//!
//! Limitations:
//! - Newick is the only supported text format
//! - layout requires taxa numbered `1..=ntax` with taxon 1 present
//!
//! # Example
//!
//! Parse a tree and write it back:
//! ```
//! use splitwick::newick::parse_newick_str;
//!
//! let tree = parse_newick_str("((A:1,B:2):3,C:4);").unwrap();
//! assert_eq!(tree.node_count(), 5);
//! assert_eq!(tree.to_bracket_string(), "((A:1,B:2):3,C:4);");
//! ```
//!
//! Lay out a split network:
//! ```
//! use splitwick::graph::NodeMap;
//! use splitwick::layout::EqualAngle;
//! use splitwick::splits::{split_id_set, ASplit, SplitsBlock, SplitsGraph};
//! use splitwick::util::SilentProgress;
//!
//! let mut splits = SplitsBlock::new();
//! for t in 1..=4 {
//!     splits.push(ASplit::new(&[t], 4, 1.0));
//! }
//! splits.push(ASplit::new(&[1, 2], 4, 2.0));
//! splits.set_cycle(vec![0, 1, 2, 3, 4]);
//!
//! let mut graph = SplitsGraph::new();
//! let mut points = NodeMap::new();
//! let mut used = split_id_set(splits.nsplits());
//! EqualAngle::new()
//!     .apply(&mut SilentProgress, 4, &splits, &mut graph, &mut points,
//!            &split_id_set(0), &mut used)
//!     .unwrap();
//! assert_eq!(graph.node_count(), 6);
//! ```

pub mod graph;
pub mod layout;
pub mod newick;
pub mod phylo;
pub mod splits;
pub mod util;

pub use graph::Graph;
pub use newick::{NewickParser, NewickWriter};
pub use phylo::{PhyloGraph, PhyloTree};
pub use splits::{ASplit, SplitsBlock, SplitsGraph};
