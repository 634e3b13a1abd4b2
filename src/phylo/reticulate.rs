//! Lexical conventions for reticulate-node markers in Newick labels.
//!
//! Reticulations (hybridization nodes) are encoded in Newick by giving all
//! occurrences of the same reticulate node a shared label suffix of the
//! form `#H<number>`. A doubled hash (`##H<number>`) additionally marks the
//! occurrence whose in-edge is the accepted parent edge, drawn solid.
//! After parsing, all nodes sharing a marker are merged into a single node
//! (see [`PhyloTree::post_process_reticulate`](crate::phylo::PhyloTree::post_process_reticulate)).

/// Returns the reticulate marker body of a label, or `None` if the label
/// carries no valid marker.
///
/// The marker starts at the first `#` and its body must be `H` or `h`
/// followed by digits. The body is returned as written, without hashes.
///
/// # Examples
/// ```
/// # use splitwick::phylo::reticulate::find_reticulate_label;
/// assert_eq!(find_reticulate_label("x#H1"), Some("H1"));
/// assert_eq!(find_reticulate_label("x##H12"), Some("H12"));
/// assert_eq!(find_reticulate_label("#h3"), Some("h3"));
/// assert_eq!(find_reticulate_label("plain"), None);
/// assert_eq!(find_reticulate_label("x#whatever"), None);
/// ```
pub fn find_reticulate_label(label: &str) -> Option<&str> {
    let hash = label.find('#')?;
    let body = label[hash..].trim_start_matches('#');
    let mut chars = body.chars();
    match chars.next() {
        Some('H') | Some('h') => {}
        _ => return None,
    }
    let digits = chars.as_str();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(body)
}

/// Returns whether a label marks a reticulate node.
///
/// # Examples
/// ```
/// # use splitwick::phylo::reticulate::is_reticulate_node;
/// assert!(is_reticulate_node("x#H1"));
/// assert!(is_reticulate_node("##H2"));
/// assert!(!is_reticulate_node("x"));
/// ```
pub fn is_reticulate_node(label: &str) -> bool {
    find_reticulate_label(label).is_some()
}

/// Returns whether a label marks the acceptor occurrence of a reticulate
/// node, i.e. the occurrence whose in-edge is the accepted parent edge.
///
/// # Examples
/// ```
/// # use splitwick::phylo::reticulate::is_reticulate_acceptor_edge;
/// assert!(is_reticulate_acceptor_edge("x##H1"));
/// assert!(!is_reticulate_acceptor_edge("x#H1"));
/// assert!(!is_reticulate_acceptor_edge("x"));
/// ```
pub fn is_reticulate_acceptor_edge(label: &str) -> bool {
    match label.find('#') {
        Some(hash) => is_reticulate_node(label) && label[hash..].starts_with("##"),
        None => false,
    }
}

/// Strips a reticulate marker suffix from a label.
///
/// Labels without a valid marker are returned unchanged.
///
/// # Examples
/// ```
/// # use splitwick::phylo::reticulate::remove_reticulate_node_suffix;
/// assert_eq!(remove_reticulate_node_suffix("x#H1"), "x");
/// assert_eq!(remove_reticulate_node_suffix("##H2"), "");
/// assert_eq!(remove_reticulate_node_suffix("plain"), "plain");
/// ```
pub fn remove_reticulate_node_suffix(label: &str) -> &str {
    if is_reticulate_node(label) {
        &label[..label.find('#').expect("marker labels contain a hash")]
    } else {
        label
    }
}

/// Builds the marker suffix for writing a reticulate node occurrence.
///
/// # Arguments
/// * `as_acceptor_edge` - whether the occurrence's in-edge is the accepted
///   parent edge (positive weight)
/// * `number` - the reticulation number assigned during writing
///
/// # Examples
/// ```
/// # use splitwick::phylo::reticulate::make_reticulate_node_label;
/// assert_eq!(make_reticulate_node_label(true, 1), "##H1");
/// assert_eq!(make_reticulate_node_label(false, 3), "#H3");
/// ```
pub fn make_reticulate_node_label(as_acceptor_edge: bool, number: usize) -> String {
    if as_acceptor_edge {
        format!("##H{}", number)
    } else {
        format!("#H{}", number)
    }
}
