//! Slash-delimited lookup into a node tree.
//!
//! `find(root, "b/e/f")` walks mapping keys one segment at a time. The walk
//! stops with `None` as soon as a segment is missing or the current value is
//! not a mapping. A null value counts as absent. The path is taken
//! literally: no trimming, so a leading `/` looks up the empty key first.

use crate::error::{Error, Result};
use crate::node::Node;

/// Find the node at `path` under `root`.
pub fn find<'a>(root: &'a Node, path: &str) -> Option<&'a Node> {
    let mut node = root;
    for segment in path.split('/') {
        node = node.as_mapping()?.get(segment)?;
    }
    (!node.is_null()).then_some(node)
}

/// Mutable variant of [`find`].
pub fn find_mut<'a>(root: &'a mut Node, path: &str) -> Option<&'a mut Node> {
    let mut node = root;
    for segment in path.split('/') {
        node = node.as_mapping_mut()?.get_mut(segment)?;
    }
    if node.is_null() {
        return None;
    }
    Some(node)
}

/// String value at `path`, or `default` when absent or null.
///
/// A present value that is not a string is a `TypeMismatch`.
pub fn find_default(root: &Node, path: &str, default: &str) -> Result<String> {
    match find(root, path) {
        None => Ok(default.to_string()),
        Some(node) => node.try_str(path).map(str::to_string),
    }
}

/// Integer value at `path`, or `default` when absent or not an integer.
///
/// Unlike [`find_default`] a wrong type silently falls back.
pub fn find_default_int(root: &Node, path: &str, default: i64) -> i64 {
    find(root, path).and_then(Node::as_int).unwrap_or(default)
}

/// Like [`find`], but a miss is a `PathNotFound` error.
pub fn require<'a>(root: &'a Node, path: &str) -> Result<&'a Node> {
    find(root, path).ok_or_else(|| Error::path_not_found(path))
}
