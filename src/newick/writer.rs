//! Newick serialization for phylogenetic trees and reticulate networks.

use crate::graph::{EdgeId, NodeId};
use crate::newick::defs::QUOTE_TRIGGERS;
use crate::phylo::reticulate;
use crate::phylo::PhyloTree;
use std::collections::HashMap;

// =#========================================================================#=
// NEWICK WRITER
// =#========================================================================#=
/// Writer (configuration) for Newick output.
///
/// Output is produced by a recursive pre-order traversal from the root;
/// unrooted trees are anchored at a highest-degree node, which affects
/// only where the outermost parentheses sit. Reticulate nodes are written
/// once in full and referenced by their `#H<n>` marker on every later
/// visit, so reticulate structure cannot cause duplicate subtrees or
/// unbounded recursion.
///
/// The writer itself never appends the trailing `;`; callers (and the
/// [`PhyloTree::to_bracket_string`] convenience) do.
///
/// # Quoting
/// A label containing `) , ; :` or whitespace is wrapped in single quotes
/// *verbatim*. Embedded single quotes are not escaped, so such labels do
/// not round-trip; with [`with_clean_labels`](Self::with_clean_labels)
/// all such characters are collapsed to `_` instead.
#[derive(Debug, Clone)]
pub struct NewickWriter {
    write_weights: bool,
    write_edge_labels: bool,
    clean_labels: bool,
}

impl Default for NewickWriter {
    fn default() -> Self {
        NewickWriter::new()
    }
}

impl NewickWriter {
    /// Creates a writer with default settings: weights written, edge
    /// labels omitted, labels quoted rather than cleaned.
    pub fn new() -> Self {
        NewickWriter {
            write_weights: true,
            write_edge_labels: false,
            clean_labels: false,
        }
    }

    /// Omits edge weights from the output.
    pub fn without_weights(mut self) -> Self {
        self.write_weights = false;
        self
    }

    /// Includes edge labels as `[...]` after each weight.
    pub fn with_edge_labels(mut self) -> Self {
        self.write_edge_labels = true;
        self
    }

    /// Collapses characters that would require quoting to `_` instead of
    /// quoting.
    pub fn with_clean_labels(mut self) -> Self {
        self.clean_labels = true;
        self
    }

    /// Writes the tree as a Newick string without the trailing `;`.
    ///
    /// An empty tree yields an empty string.
    pub fn write(&self, tree: &PhyloTree) -> String {
        let Some(anchor) = tree.root().or_else(|| highest_degree_node(tree)) else {
            return String::new();
        };
        let mut out = String::new();
        let mut reticulate_numbers: HashMap<NodeId, usize> = HashMap::new();
        self.write_rec(
            tree,
            &mut out,
            anchor,
            None,
            self.label_for_writing(tree, anchor),
            &mut reticulate_numbers,
        );
        out
    }

    /// Writes the subtree entered at `v` via `entering` (`None` at the
    /// anchor). `node_label` is precomputed by the caller because
    /// reticulate references extend it with the marker suffix.
    fn write_rec(
        &self,
        tree: &PhyloTree,
        out: &mut String,
        v: NodeId,
        entering: Option<EdgeId>,
        node_label: Option<String>,
        reticulate_numbers: &mut HashMap<NodeId, usize>,
    ) {
        // children: all incident edges except the entering one, never
        // climbing a reticulate edge back out of its target
        let children: Vec<EdgeId> = tree
            .adjacent_edges(v)
            .filter(|&f| Some(f) != entering)
            .filter(|&f| !(tree.is_special(f) && tree.target(f) == v))
            .collect();

        if !children.is_empty() {
            out.push('(');
            for (i, &f) in children.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let w = tree.opposite(v, f);
                if tree.is_special(f) {
                    let first_visit = !reticulate_numbers.contains_key(&w);
                    let number = match reticulate_numbers.get(&w) {
                        Some(&number) => number,
                        None => {
                            let number = reticulate_numbers.len() + 1;
                            reticulate_numbers.insert(w, number);
                            number
                        }
                    };
                    let marker =
                        reticulate::make_reticulate_node_label(tree.weight(f) > 0.0, number);
                    let label = match self.label_for_writing(tree, w) {
                        Some(label) => format!("{label}{marker}"),
                        None => marker,
                    };
                    if first_visit {
                        self.write_rec(tree, out, w, Some(f), Some(label), reticulate_numbers);
                    } else {
                        out.push_str(&label);
                        self.write_edge_info(tree, out, f);
                    }
                } else {
                    self.write_rec(
                        tree,
                        out,
                        w,
                        Some(f),
                        self.label_for_writing(tree, w),
                        reticulate_numbers,
                    );
                }
            }
            out.push(')');
        }

        if let Some(label) = node_label {
            out.push_str(&label);
        }
        if let Some(e) = entering {
            self.write_edge_info(tree, out, e);
        }
    }

    fn write_edge_info(&self, tree: &PhyloTree, out: &mut String, e: EdgeId) {
        if self.write_weights {
            out.push(':');
            out.push_str(&format_weight(tree.weight(e)));
            if self.write_edge_labels {
                if let Some(label) = tree.edge_label(e) {
                    out.push('[');
                    out.push_str(label);
                    out.push(']');
                }
            }
        }
    }

    /// Returns a node's label prepared for output, or `None` if the node
    /// is unlabeled.
    pub fn label_for_writing(&self, tree: &PhyloTree, v: NodeId) -> Option<String> {
        let label = tree.label(v)?;
        if self.clean_labels {
            Some(
                label
                    .chars()
                    .map(|c| {
                        if QUOTE_TRIGGERS.contains(&c) || c.is_whitespace() {
                            '_'
                        } else {
                            c
                        }
                    })
                    .collect(),
            )
        } else if label
            .chars()
            .any(|c| QUOTE_TRIGGERS.contains(&c) || c.is_whitespace())
        {
            Some(format!("'{label}'"))
        } else {
            Some(label.to_string())
        }
    }
}

/// Formats an edge weight at `f32` precision, as Newick consumers expect.
fn format_weight(weight: f64) -> String {
    format!("{}", weight as f32)
}

fn highest_degree_node(tree: &PhyloTree) -> Option<NodeId> {
    let mut best: Option<(NodeId, usize)> = None;
    for v in tree.nodes() {
        let degree = tree.degree(v);
        if best.is_none_or(|(_, d)| degree > d) {
            best = Some((v, degree));
        }
    }
    best.map(|(v, _)| v)
}

// ============================================================================
// Convenience (pub, on PhyloTree)
// ============================================================================
impl PhyloTree {
    /// Returns this tree as a Newick string with trailing `;`.
    ///
    /// Weights are written exactly when some edge carries an explicitly
    /// set weight.
    pub fn to_bracket_string(&self) -> String {
        let writer = if self.edges().any(|e| self.has_explicit_weight(e)) {
            NewickWriter::new()
        } else {
            NewickWriter::new().without_weights()
        };
        let mut out = writer.write(self);
        out.push(';');
        out
    }
}
