//! Deep merge of configuration mappings.
//!
//! The policy differs per value type:
//! - Mappings always recurse key by key (a mapping never replaces a scalar or
//!   sequence; that is a [`Error::MergeConflict`]).
//! - Sequences union: elements not already present are appended.
//!   A sequence replaces a non-sequence outright.
//! - Scalars keep the existing value unless `override_existing` is set.
//!
//! Without override the first writer wins, so folding ancestors into a
//! descendant keeps the descendant's own values.

use crate::error::{Error, Result};
use crate::node::{Mapping, Node};
use tracing::trace;

/// Merge `value` (the entry for `key` in `src`) into `dst`.
///
/// # Example
/// ```
/// use yamltree::{load_raw, find, merge_mapping, Node};
///
/// let mut base = load_raw(b"b: {d: [3, 4], e: {f: dog}}").unwrap();
/// let overlay = load_raw(b"b: {d: [4, 5, 6], e: {f: cat}}").unwrap();
/// merge_mapping(
///     base.as_mapping_mut().unwrap(),
///     overlay.as_mapping().unwrap(),
///     false,
/// )
/// .unwrap();
/// assert_eq!(find(&base, "b/e/f").and_then(Node::as_str), Some("dog"));
/// assert_eq!(find(&base, "b/d").and_then(Node::as_sequence).map(|s| s.len()), Some(4));
/// ```
pub fn merge(
    dst: &mut Mapping,
    src: &Mapping,
    key: &str,
    value: &Node,
    override_existing: bool,
) -> Result<()> {
    let Some(existing) = dst.get_mut(key) else {
        dst.insert(key.to_string(), value.clone());
        return Ok(());
    };

    match value {
        Node::Mapping(incoming) => {
            // Walk src[key]; callers normally pass it as `value` too.
            let nested = match src.get(key) {
                Some(Node::Mapping(m)) => m,
                _ => incoming,
            };
            match existing {
                Node::Mapping(target) => {
                    for (k, v) in nested {
                        merge(target, nested, k, v, override_existing)?;
                    }
                }
                other => return Err(Error::merge_conflict(key, other.kind())),
            }
        }
        Node::Sequence(incoming) => match existing {
            Node::Sequence(current) => {
                for item in incoming {
                    if !current.contains(item) {
                        current.push(item.clone());
                    }
                }
            }
            other => {
                trace!(key, replaced = other.kind(), "Sequence replaces non-sequence");
                *other = value.clone();
            }
        },
        Node::Scalar(_) => {
            if override_existing && existing != value {
                trace!(key, "Overriding scalar");
                *existing = value.clone();
            }
        }
    }
    Ok(())
}

/// Merge every key of `src` into `dst`.
pub fn merge_mapping(dst: &mut Mapping, src: &Mapping, override_existing: bool) -> Result<()> {
    merge_mapping_except(dst, src, &[], override_existing)
}

/// Merge every key of `src` not listed in `skip` into `dst`.
pub fn merge_mapping_except(
    dst: &mut Mapping,
    src: &Mapping,
    skip: &[&str],
    override_existing: bool,
) -> Result<()> {
    for (key, value) in src {
        if skip.contains(&key.as_str()) {
            continue;
        }
        merge(dst, src, key, value, override_existing)?;
    }
    Ok(())
}

/// Fold documents in order into one mapping with override enabled, so later
/// documents win on scalars.
pub fn merge_all(documents: impl IntoIterator<Item = Node>) -> Result<Node> {
    let mut merged = Mapping::new();
    for doc in documents {
        let src = doc.into_mapping("document")?;
        merge_mapping(&mut merged, &src, true)?;
    }
    Ok(Node::Mapping(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::load_raw;
    use crate::path::find;

    const CFG1: &str = r#"
a: Easy!
b:
  c: 2
  d: [3, 4]
  e:
    f: dog
    g: cake
"#;

    const CFG2: &str = r#"
b:
  d: [4, 5, 6]
  e:
    f: cat
    g: [1,2]
"#;

    fn merged(override_existing: bool) -> Node {
        let mut dst = load_raw(CFG1.as_bytes()).unwrap();
        let src = load_raw(CFG2.as_bytes()).unwrap();
        merge_mapping(
            dst.as_mapping_mut().unwrap(),
            src.as_mapping().unwrap(),
            override_existing,
        )
        .unwrap();
        dst
    }

    fn ints(node: &Node) -> Vec<i64> {
        node.as_sequence()
            .unwrap()
            .iter()
            .map(|n| n.as_int().unwrap())
            .collect()
    }

    #[test]
    fn test_string_override() {
        let cfg = merged(true);
        assert_eq!(find(&cfg, "b/e/f").and_then(Node::as_str), Some("cat"));
    }

    #[test]
    fn test_string_kept_without_override() {
        let cfg = merged(false);
        assert_eq!(find(&cfg, "b/e/f").and_then(Node::as_str), Some("dog"));
    }

    #[test]
    fn test_sequence_replaces_scalar() {
        let cfg = merged(false);
        assert_eq!(ints(find(&cfg, "b/e/g").unwrap()), vec![1, 2]);
    }

    #[test]
    fn test_int_sequence_union() {
        let cfg = merged(false);
        assert_eq!(ints(find(&cfg, "b/d").unwrap()), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_sibling_keys_survive() {
        let cfg = merged(true);
        assert_eq!(find(&cfg, "a").and_then(Node::as_str), Some("Easy!"));
        assert_eq!(find(&cfg, "b/c").and_then(Node::as_int), Some(2));
    }

    #[test]
    fn test_three_level_merge() {
        let mut dst = load_raw(b"l1: {l2: {l3: {a: 1, b: 2}, keep: yes}}").unwrap();
        let src = load_raw(b"l1: {l2: {l3: {b: 3, c: 4}}, other: 1}").unwrap();
        merge_mapping(dst.as_mapping_mut().unwrap(), src.as_mapping().unwrap(), true).unwrap();
        assert_eq!(find(&dst, "l1/l2/l3/a").and_then(Node::as_int), Some(1));
        assert_eq!(find(&dst, "l1/l2/l3/b").and_then(Node::as_int), Some(3));
        assert_eq!(find(&dst, "l1/l2/l3/c").and_then(Node::as_int), Some(4));
        assert_eq!(find(&dst, "l1/l2/keep").and_then(Node::as_str), Some("yes"));
        assert_eq!(find(&dst, "l1/other").and_then(Node::as_int), Some(1));
    }

    #[test]
    fn test_absent_key_inserted() {
        let mut dst = Mapping::new();
        let src = load_raw(b"x: {y: 1}").unwrap();
        let src = src.as_mapping().unwrap();
        merge(&mut dst, src, "x", &src["x"], false).unwrap();
        assert_eq!(Node::Mapping(dst), load_raw(b"x: {y: 1}").unwrap());
    }

    #[test]
    fn test_mapping_into_scalar_conflicts() {
        let mut dst = load_raw(b"x: 1").unwrap();
        let src = load_raw(b"x: {y: 1}").unwrap();
        let err = merge_mapping(dst.as_mapping_mut().unwrap(), src.as_mapping().unwrap(), true)
            .unwrap_err();
        assert!(matches!(err, Error::MergeConflict { ref key, .. } if key == "x"));
    }

    #[test]
    fn test_scalar_over_mapping_follows_override() {
        let src = load_raw(b"x: 5").unwrap();

        let mut kept = load_raw(b"x: {y: 1}").unwrap();
        merge_mapping(kept.as_mapping_mut().unwrap(), src.as_mapping().unwrap(), false).unwrap();
        assert!(find(&kept, "x").unwrap().is_mapping());

        let mut replaced = load_raw(b"x: {y: 1}").unwrap();
        merge_mapping(replaced.as_mapping_mut().unwrap(), src.as_mapping().unwrap(), true).unwrap();
        assert_eq!(find(&replaced, "x").and_then(Node::as_int), Some(5));
    }

    #[test]
    fn test_sequence_union_uses_structural_equality() {
        let mut dst = load_raw(b"s: [{n: 1}, [a, b]]").unwrap();
        let src = load_raw(b"s: [{n: 1}, [a, b], {n: 2}, {n: 2}]").unwrap();
        merge_mapping(dst.as_mapping_mut().unwrap(), src.as_mapping().unwrap(), false).unwrap();
        assert_eq!(find(&dst, "s").and_then(Node::as_sequence).unwrap().len(), 3);
    }

    #[test]
    fn test_merge_all_later_wins() {
        let merged = merge_all(vec![
            load_raw(b"a: 1\nb: {c: x}").unwrap(),
            load_raw(b"b: {c: y, d: z}").unwrap(),
            load_raw(b"a: 3").unwrap(),
        ])
        .unwrap();
        assert_eq!(merged, load_raw(b"a: 3\nb: {c: y, d: z}").unwrap());
    }
}
