//! Integration tests for document-level merging through the public API.

use yamltree::{Error, Node, find, load_raw, merge, merge_mapping};

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
    let mut cfg = load_raw(CFG1.as_bytes()).unwrap();
    let other = load_raw(CFG2.as_bytes()).unwrap();
    merge_mapping(
        cfg.as_mapping_mut().unwrap(),
        other.as_mapping().unwrap(),
        override_existing,
    )
    .unwrap();
    cfg
}

#[test]
fn test_map_search() {
    let cfg = load_raw(CFG1.as_bytes()).unwrap();
    assert_eq!(find(&cfg, "b/e/f").and_then(Node::as_str), Some("dog"));
}

#[test]
fn test_string_map_merge() {
    let cfg = merged(true);
    assert_eq!(find(&cfg, "b/e/f").and_then(Node::as_str), Some("cat"));
}

#[test]
fn test_type_override() {
    let cfg = merged(true);
    let g: Vec<i64> = find(&cfg, "b/e/g")
        .and_then(Node::as_sequence)
        .unwrap()
        .iter()
        .filter_map(Node::as_int)
        .collect();
    assert_eq!(g, vec![1, 2]);
}

#[test]
fn test_int_slice_map_merge() {
    let cfg = merged(false);
    let d: Vec<i64> = find(&cfg, "b/d")
        .and_then(Node::as_sequence)
        .unwrap()
        .iter()
        .filter_map(Node::as_int)
        .collect();
    assert_eq!(d, vec![3, 4, 5, 6]);
}

#[test]
fn test_single_key_merge_primitive() {
    let mut dst = load_raw(b"k: {a: 1}").unwrap();
    let src = load_raw(b"k: {b: 2}\nz: 9").unwrap();
    let src_map = src.as_mapping().unwrap();

    merge(dst.as_mapping_mut().unwrap(), src_map, "k", &src_map["k"], false).unwrap();
    assert_eq!(dst, load_raw(b"k: {a: 1, b: 2}").unwrap());

    let mut scalar = load_raw(b"k: 1").unwrap();
    let err = merge(scalar.as_mapping_mut().unwrap(), src_map, "k", &src_map["k"], false)
        .unwrap_err();
    assert!(matches!(err, Error::MergeConflict { .. }));
}
