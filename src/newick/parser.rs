//! Recursive-descent parser for Newick strings.
//!
//! The grammar, informally:
//! ```text
//! tree     := subtree ';'?
//! subtree  := '(' subtree (',' subtree)* ')' label? edgeinfo?
//!           | label edgeinfo?
//! label    := quoted | bareword
//! edgeinfo := (':' number)? ('[' edgelabel ']')?
//! ```
//! Barewords terminate at `( ) , ; : [` or unquoted whitespace; inside
//! single quotes every character is literal and the quotes themselves are
//! dropped. Parsing is a single pass over the input with an explicit
//! character cursor; positions in errors are character offsets.

use crate::graph::{EdgeId, NodeId};
use crate::newick::defs::{LABEL_TERMINATORS, MIN_ACCEPTOR_WEIGHT};
use crate::phylo::reticulate;
use crate::phylo::PhyloTree;
use log::warn;
use std::collections::HashSet;
use thiserror::Error;

// =#========================================================================#=
// ERRORS
// =#========================================================================#=
/// Error raised for a malformed Newick string, carrying the offending
/// character position (and text, where there is one).
#[derive(Debug, Error, PartialEq, Clone)]
pub enum NewickError {
    #[error("expected '{expected}' at position {position}")]
    ExpectedCharacter { expected: char, position: usize },
    #[error("expected label at position {position}")]
    ExpectedLabel { position: usize },
    #[error("expected number at position {position} (got: '{text}')")]
    InvalidNumber { position: usize, text: String },
    #[error("unexpected '{found}' at position {position}")]
    UnexpectedCharacter { found: char, position: usize },
    #[error("unexpected characters after end of tree at position {position}")]
    TrailingCharacters { position: usize },
}

// =#========================================================================#=
// CURSOR
// =#========================================================================#=
/// Character cursor over the input string.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(input: &str) -> Self {
        Cursor {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

fn is_token_end(c: char) -> bool {
    LABEL_TERMINATORS.contains(&c) || c.is_whitespace()
}

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================#=
/// Parser (configuration) for Newick phylogenetic trees and reticulate
/// networks.
///
/// # Configuration
/// * [`with_unrooted()`](Self::with_unrooted) - treat input as unrooted:
///   the parsed tree has no root, and a spurious degree-2 top node is
///   collapsed. By default input is treated as rooted.
/// * [`with_multi_labeled_nodes()`](Self::with_multi_labeled_nodes) -
///   allow the same label on several nodes instead of disambiguating
///   duplicates with `.1`, `.2`, … suffixes.
/// * [`without_reticulate_processing()`](Self::without_reticulate_processing) -
///   keep reticulate marker labels (`#H1`) as plain labels instead of
///   merging the marked nodes.
/// * [`without_duplicate_label_warnings()`](Self::without_duplicate_label_warnings) -
///   silence the log warning emitted when a duplicate label is renamed.
///
/// # Example
/// ```
/// use splitwick::newick::NewickParser;
///
/// let parser = NewickParser::new().with_unrooted();
/// let tree = parser.parse_str("(A:1,B:2,(C:3,D:4):5);").unwrap();
/// assert_eq!(tree.node_count(), 6);
/// assert_eq!(tree.taxon_count(), 0); // taxa are assigned by the caller
/// ```
#[derive(Debug, Clone)]
pub struct NewickParser {
    rooted: bool,
    allow_multi_labeled: bool,
    process_reticulate: bool,
    warn_duplicate_labels: bool,
}

impl Default for NewickParser {
    fn default() -> Self {
        NewickParser::new()
    }
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl NewickParser {
    /// Creates a parser with default settings: rooted input, duplicate
    /// labels disambiguated, reticulate markers processed.
    pub fn new() -> Self {
        NewickParser {
            rooted: true,
            allow_multi_labeled: false,
            process_reticulate: true,
            warn_duplicate_labels: true,
        }
    }

    /// Treats input as unrooted: the result has no root and a spurious
    /// unlabeled degree-2 top node is collapsed away.
    pub fn with_unrooted(mut self) -> Self {
        self.rooted = false;
        self
    }

    /// Allows multi-labeled nodes: duplicate labels are kept verbatim.
    pub fn with_multi_labeled_nodes(mut self) -> Self {
        self.allow_multi_labeled = true;
        self
    }

    /// Disables merging of reticulate-marker labels after parsing.
    pub fn without_reticulate_processing(mut self) -> Self {
        self.process_reticulate = false;
        self
    }

    /// Silences the warning emitted when a duplicate label is renamed.
    pub fn without_duplicate_label_warnings(mut self) -> Self {
        self.warn_duplicate_labels = false;
        self
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl NewickParser {
    /// Parses a single Newick tree from the input string.
    ///
    /// The input must contain exactly one tree with an optional trailing
    /// `;`; anything after it is an error.
    ///
    /// # Returns
    /// * `Ok(PhyloTree)` - the parsed tree
    /// * `Err(NewickError)` - position and offending text on malformed
    ///   input
    pub fn parse_str(&self, input: &str) -> Result<PhyloTree, NewickError> {
        let mut tree = PhyloTree::new();
        self.parse_into(&mut tree, input)?;
        Ok(tree)
    }

    /// Parses a single Newick tree into an existing tree, clearing it
    /// first.
    pub fn parse_into(&self, tree: &mut PhyloTree, input: &str) -> Result<(), NewickError> {
        let mut cursor = Cursor::new(input);
        self.parse_one(tree, &mut cursor)?;
        cursor.skip_whitespace();
        if !cursor.at_end() {
            return Err(NewickError::TrailingCharacters {
                position: cursor.position(),
            });
        }
        Ok(())
    }

    /// Parses all `;`-separated Newick trees from the input string.
    pub fn parse_all(&self, input: &str) -> Result<Vec<PhyloTree>, NewickError> {
        let mut trees = Vec::new();
        let mut cursor = Cursor::new(input);
        loop {
            cursor.skip_whitespace();
            if cursor.at_end() {
                break;
            }
            let mut tree = PhyloTree::new();
            self.parse_one(&mut tree, &mut cursor)?;
            trees.push(tree);
        }
        Ok(trees)
    }
}

// ============================================================================
// Parsing
// ============================================================================
struct ParseContext<'t> {
    tree: &'t mut PhyloTree,
    seen: HashSet<String>,
    has_weights: bool,
}

impl NewickParser {
    /// Parses one tree and leaves the cursor after its `;` (or at the end
    /// of input if the `;` is omitted).
    fn parse_one(&self, tree: &mut PhyloTree, cursor: &mut Cursor) -> Result<(), NewickError> {
        tree.clear();
        let mut ctx = ParseContext {
            tree,
            seen: HashSet::new(),
            has_weights: false,
        };

        cursor.skip_whitespace();
        self.parse_subtree_list(&mut ctx, cursor, None)?;

        if let Some(c) = cursor.peek() {
            if c == ')' {
                return Err(NewickError::UnexpectedCharacter {
                    found: ')',
                    position: cursor.position(),
                });
            }
            if c == ';' {
                cursor.bump();
            }
        }

        let has_weights = ctx.has_weights;
        let root = tree.first_node().expect("parsing created at least one node");
        tree.set_root(Some(root));

        if self.process_reticulate {
            tree.post_process_reticulate();
        }

        if self.rooted {
            // a root inserted to break an unrooted bifurcation gets the
            // conventional 0.5/0.5 weight split
            if !has_weights && tree.label(root).is_none() && tree.degree(root) == 2 {
                let edges: Vec<EdgeId> = tree.adjacent_edges(root).collect();
                for e in edges {
                    tree.set_weight(e, 0.5);
                }
            }
        } else {
            if tree.degree(root) == 2 && tree.label(root).is_none() && tree.taxa(root).is_empty() {
                tree.del_divertex(root);
            }
            tree.set_root(None);
        }
        Ok(())
    }

    /// Parses a comma-separated list of subtrees below `parent` and
    /// returns with the cursor on the terminating `)`, `;`, or at the end
    /// of input.
    ///
    /// `parent == None` is the top level, which admits exactly one
    /// subtree.
    fn parse_subtree_list(
        &self,
        ctx: &mut ParseContext,
        cursor: &mut Cursor,
        parent: Option<NodeId>,
    ) -> Result<(), NewickError> {
        loop {
            cursor.skip_whitespace();
            let w = ctx.tree.new_node();
            let mut label: Option<String> = None;

            if cursor.peek() == Some('(') {
                cursor.bump();
                self.parse_subtree_list(ctx, cursor, Some(w))?;
                if cursor.peek() != Some(')') {
                    return Err(NewickError::ExpectedCharacter {
                        expected: ')',
                        position: cursor.position(),
                    });
                }
                cursor.bump();
                cursor.skip_whitespace();
                // optional interior label; if one starts, it must be non-empty
                if cursor.peek().is_some_and(|c| !is_token_end(c)) {
                    let position = cursor.position();
                    let text = scan_label(cursor);
                    if text.is_empty() {
                        return Err(NewickError::ExpectedLabel { position });
                    }
                    label = Some(self.register_label(ctx, text, w));
                }
            } else {
                if ctx.tree.node_count() == 1 {
                    return Err(NewickError::ExpectedCharacter {
                        expected: '(',
                        position: cursor.position(),
                    });
                }
                let position = cursor.position();
                let text = scan_label(cursor);
                if text.is_empty() {
                    return Err(NewickError::ExpectedLabel { position });
                }
                label = Some(self.register_label(ctx, text, w));
            }

            let edge = match parent {
                Some(v) => Some(
                    ctx.tree
                        .new_edge(v, w)
                        .expect("parser nodes are distinct"),
                ),
                None => None,
            };

            cursor.skip_whitespace();

            // edge weight, clamped to >= 0
            if cursor.peek() == Some(':') {
                cursor.bump();
                cursor.skip_whitespace();
                let position = cursor.position();
                let text = scan_number(cursor);
                let value: f64 = text.trim().parse().map_err(|_| NewickError::InvalidNumber {
                    position,
                    text: text.clone(),
                })?;
                ctx.has_weights = true;
                if let Some(e) = edge {
                    ctx.tree.set_weight(e, value.max(0.0));
                }
            }

            // a reticulate occurrence's in-edge weight encodes whether it
            // is the accepted parent edge
            if let (Some(e), Some(label)) = (edge, label.as_deref()) {
                if reticulate::is_reticulate_node(label) {
                    if reticulate::is_reticulate_acceptor_edge(label) {
                        if ctx.tree.weight(e) <= 0.0 {
                            ctx.tree.set_weight(e, MIN_ACCEPTOR_WEIGHT);
                        }
                    } else if ctx.tree.weight(e) > 0.0 {
                        ctx.tree.set_weight(e, 0.0);
                    }
                }
            }

            // edge label
            if cursor.peek() == Some('[') {
                cursor.bump();
                let mut text = String::new();
                loop {
                    match cursor.bump() {
                        Some(']') => break,
                        Some(c) => text.push(c),
                        None => {
                            return Err(NewickError::ExpectedCharacter {
                                expected: ']',
                                position: cursor.position(),
                            });
                        }
                    }
                }
                if let Some(e) = edge {
                    ctx.tree.set_edge_label(e, text);
                }
            }

            cursor.skip_whitespace();
            match cursor.peek() {
                None | Some(')') | Some(';') => return Ok(()),
                Some(',') => {
                    if parent.is_none() {
                        return Err(NewickError::UnexpectedCharacter {
                            found: ',',
                            position: cursor.position(),
                        });
                    }
                    cursor.bump();
                }
                Some(found) => {
                    return Err(NewickError::UnexpectedCharacter {
                        found,
                        position: cursor.position(),
                    });
                }
            }
        }
    }

    /// Stores a node label, disambiguating duplicates unless multi-labeled
    /// nodes are allowed or the label is a reticulate marker.
    ///
    /// The first occurrence keeps its label; each later duplicate probes
    /// `.1`, `.2`, … for the first unused suffix.
    fn register_label(&self, ctx: &mut ParseContext, mut label: String, w: NodeId) -> String {
        if !self.allow_multi_labeled
            && reticulate::find_reticulate_label(&label).is_none()
            && ctx.seen.contains(&label)
        {
            let mut suffix = 1;
            let mut candidate = format!("{label}.{suffix}");
            while ctx.seen.contains(&candidate) {
                suffix += 1;
                candidate = format!("{label}.{suffix}");
            }
            if self.warn_duplicate_labels {
                warn!("duplicate label '{label}' renamed to '{candidate}'");
            }
            ctx.tree.set_input_has_multi_labels(true);
            label = candidate;
        }
        ctx.seen.insert(label.clone());
        ctx.tree.set_label(w, label.clone());
        label
    }
}

/// Scans a label with quote toggling: punctuation inside `'…'` is literal
/// and the quote characters are dropped. The result is trimmed.
fn scan_label(cursor: &mut Cursor) -> String {
    let mut text = String::new();
    let mut in_quotes = false;
    while let Some(c) = cursor.peek() {
        if !in_quotes && is_token_end(c) {
            break;
        }
        if c == '\'' {
            in_quotes = !in_quotes;
        } else {
            text.push(c);
        }
        cursor.bump();
    }
    text.trim().to_string()
}

/// Scans a number token up to the next punctuation, `[`, or whitespace.
fn scan_number(cursor: &mut Cursor) -> String {
    let mut text = String::new();
    while let Some(c) = cursor.peek() {
        if is_token_end(c) {
            break;
        }
        text.push(c);
        cursor.bump();
    }
    text
}
