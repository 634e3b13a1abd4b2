//! Shared definitions for Newick reading and writing.

/// Characters that terminate an unquoted label or number token.
/// Whitespace terminates as well, checked separately.
pub(crate) const LABEL_TERMINATORS: &[char] = &['(', ')', ',', ';', ':', '['];

/// Characters that force a label into single quotes on output.
///
/// Note the asymmetry with [LABEL_TERMINATORS]: the writer quotes only on
/// `) , ; :` and whitespace, matching what downstream Newick consumers
/// require.
pub(crate) const QUOTE_TRIGGERS: &[char] = &[')', ',', ';', ':'];

/// Weight given to a reticulate acceptor edge that was written without an
/// explicit positive weight.
pub(crate) const MIN_ACCEPTOR_WEIGHT: f64 = 1e-6;
