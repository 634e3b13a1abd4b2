//! Generic mutable graph with stable element identities.
//!
//! Provides the core building blocks for phylogenetic graph types:
//! * [Graph] - mutable multigraph with directed edges and per-node
//!   adjacency lists kept in cyclic insertion order
//! * [NodeId] / [EdgeId] - opaque, monotonically assigned element ids,
//!   never reused while the graph lives
//! * [NodeMap] / [EdgeMap] - auxiliary attribute maps keyed by element id
//!
//! The cyclic adjacency order is load-bearing: planar embedding algorithms
//! splice edges into specific angular positions via
//! [`Graph::new_edge_at`] and walk neighbors with
//! [`Graph::next_adjacent_edge_cyclic`].

pub mod base;
pub mod maps;

pub use base::Graph;
pub use base::GraphError;
pub use base::InsertPosition;
pub use base::{EdgeId, NodeId};
pub use maps::ElementMap;
pub use maps::{EdgeMap, NodeMap};
