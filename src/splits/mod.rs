//! Splits and split networks.
//!
//! * [ASplit] - a weighted bipartition of the taxon set
//! * [SplitsBlock] - ordered splits plus a circular taxon ordering
//! * [SplitsGraph] - a network whose edges carry split ids and angles
//!
//! Cycle utilities ([normalize_cycle], [is_circular]) live in [block].

pub mod asplit;
pub mod block;
pub mod splits_graph;

pub use asplit::ASplit;
pub use block::SplitsBlock;
pub use block::{is_circular, normalize_cycle, split_id_set};
pub use splits_graph::SplitsGraph;
