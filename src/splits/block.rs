//! Ordered split collections and circular taxon orderings.

use crate::splits::asplit::ASplit;
use bitvec::prelude::*;

// =#========================================================================#=
// SPLITS BLOCK
// =#========================================================================#=
/// An ordered collection of [ASplit]s (1-based ids) together with a
/// circular taxon ordering (the *cycle*).
///
/// The cycle is a 1-based permutation of the taxa: `cycle[i]` is the taxon
/// at position `i`, `cycle[0]` is unused. Layout algorithms require every
/// displayed split to be circular with respect to it, i.e. one part
/// occupies a contiguous run of cycle positions.
#[derive(Debug, Clone, Default)]
pub struct SplitsBlock {
    splits: Vec<ASplit>,
    cycle: Vec<usize>,
}

impl SplitsBlock {
    /// Creates an empty block.
    pub fn new() -> Self {
        SplitsBlock::default()
    }

    /// Appends a split and returns its 1-based id.
    pub fn push(&mut self, split: ASplit) -> usize {
        self.splits.push(split);
        self.splits.len()
    }

    /// Returns the split with the given 1-based id.
    ///
    /// # Panics
    /// Panics if `id` is 0 or out of range.
    pub fn get(&self, id: usize) -> &ASplit {
        &self.splits[id - 1]
    }

    /// Returns the number of splits.
    pub fn nsplits(&self) -> usize {
        self.splits.len()
    }

    /// Iterates over `(id, split)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ASplit)> + '_ {
        self.splits.iter().enumerate().map(|(i, s)| (i + 1, s))
    }

    /// Returns the cycle, or an empty slice if none has been set.
    pub fn cycle(&self) -> &[usize] {
        &self.cycle
    }

    /// Sets the cycle.
    ///
    /// # Panics
    /// Panics if the cycle is not a 1-based permutation layout
    /// (`cycle[0]` must be 0).
    pub fn set_cycle(&mut self, cycle: Vec<usize>) {
        assert!(
            cycle.first() == Some(&0),
            "cycle must be 1-based with cycle[0] == 0"
        );
        self.cycle = cycle;
    }
}

// ============================================================================
// Cycle utilities (pub)
// ============================================================================
/// Rotates a cycle so that taxon 1 sits at position 1, choosing the
/// direction canonically: of the two taxa adjacent to taxon 1, the larger
/// one ends up at the last position.
///
/// # Panics
/// Panics if taxon 1 does not occur in the cycle.
pub fn normalize_cycle(cycle: &[usize]) -> Vec<usize> {
    let n = cycle.len() - 1;
    let pos1 = cycle
        .iter()
        .position(|&t| t == 1)
        .expect("cycle contains taxon 1");
    let prev = if pos1 == 1 { n } else { pos1 - 1 };
    let next = if pos1 == n { 1 } else { pos1 + 1 };

    let mut result = vec![0; cycle.len()];
    if cycle[prev] > cycle[next] {
        // keep direction
        let mut i = pos1;
        for slot in result.iter_mut().skip(1) {
            *slot = cycle[i];
            i = if i == n { 1 } else { i + 1 };
        }
    } else {
        // reverse direction
        let mut i = pos1;
        for slot in result.iter_mut().skip(1) {
            *slot = cycle[i];
            i = if i == 1 { n } else { i - 1 };
        }
    }
    result
}

/// Returns whether a split is circular with respect to the cycle: the part
/// not containing the taxon at position 1 occupies contiguous positions.
pub fn is_circular(split: &ASplit, cycle: &[usize]) -> bool {
    let n = cycle.len() - 1;
    let part = split.part_not_containing(cycle[1]);
    let mut first = 0;
    let mut last = 0;
    let mut count = 0;
    for i in 1..=n {
        if part[cycle[i]] {
            if first == 0 {
                first = i;
            }
            last = i;
            count += 1;
        }
    }
    count > 0 && last - first + 1 == count
}

/// Creates an empty split-id set sized for ids `1..=nsplits`.
pub fn split_id_set(nsplits: usize) -> BitVec {
    bitvec![0; nsplits + 1]
}
