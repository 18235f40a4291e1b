//! YAML boundary: bytes in, [`Node`] out, and back.

use crate::error::{Error, Result};
use crate::node::{Mapping, Node, Scalar};
use serde_yaml::Value;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Decode YAML bytes into a mapping node.
///
/// An empty document decodes to an empty mapping. Any other non-mapping
/// top-level value is rejected.
pub fn load_raw(data: &[u8]) -> Result<Node> {
    decode(data, None)
}

/// Read and decode a YAML file.
pub fn load(path: impl AsRef<Path>) -> Result<Node> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), bytes = data.len(), "Loaded document");
    decode(&data, Some(path))
}

/// Encode a node back to YAML.
pub fn export(node: &Node) -> Result<Vec<u8>> {
    serde_yaml::to_string(node)
        .map(String::into_bytes)
        .map_err(Error::encode)
}

/// Write the YAML form of `node` to stderr.
pub fn dump(node: &Node) -> Result<()> {
    dump_to(node, &mut std::io::stderr().lock())
}

/// Write the YAML form of `node` to `writer`.
pub fn dump_to<W: Write>(node: &Node, writer: &mut W) -> Result<()> {
    let out = export(node)?;
    writer
        .write_all(&out)
        .map_err(|e| Error::io("<dump>", e))
}

pub(crate) fn decode(data: &[u8], path: Option<&Path>) -> Result<Node> {
    let value: Value = serde_yaml::from_slice(data)
        .map_err(|e| Error::decode(path.map(Path::to_path_buf), e))?;
    match from_yaml(value) {
        Node::Mapping(m) => Ok(Node::Mapping(m)),
        Node::Scalar(Scalar::Null) => Ok(Node::mapping()),
        other => Err(Error::decode(
            path.map(Path::to_path_buf),
            format!("top-level document must be a mapping, found {}", other.kind()),
        )),
    }
}

/// Convert a parsed YAML value into the tree model.
///
/// Non-string keys become their string form; tags are dropped.
pub fn from_yaml(value: Value) -> Node {
    match value {
        Value::Null => Node::null(),
        Value::Bool(b) => Node::bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Node::int(i)
            } else {
                Node::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        Value::String(s) => Node::string(s),
        Value::Sequence(seq) => Node::Sequence(seq.into_iter().map(from_yaml).collect()),
        Value::Mapping(map) => {
            let mut out = Mapping::new();
            for (k, v) in map {
                out.insert(key_string(k), from_yaml(v));
            }
            Node::Mapping(out)
        }
        Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn key_string(key: Value) -> String {
    match from_yaml(key) {
        Node::Scalar(s) => s.render(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_load_raw_builds_tree() {
        let cfg = load_raw(CFG1.as_bytes()).unwrap();
        assert_eq!(find(&cfg, "a").and_then(Node::as_str), Some("Easy!"));
        assert_eq!(find(&cfg, "b/c").and_then(Node::as_int), Some(2));
        assert_eq!(
            find(&cfg, "b/d"),
            Some(&Node::Sequence(vec![Node::int(3), Node::int(4)]))
        );
    }

    #[test]
    fn test_empty_document_is_empty_mapping() {
        assert_eq!(load_raw(b"").unwrap(), Node::mapping());
        assert_eq!(load_raw(b"# only a comment\n").unwrap(), Node::mapping());
    }

    #[test]
    fn test_non_mapping_document_rejected() {
        let err = load_raw(b"- a\n- b\n").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_parse_error_surfaces_as_decode() {
        let err = load_raw(b"a: [1, 2\n").unwrap_err();
        assert!(matches!(err, Error::Decode { path: None, .. }));
    }

    #[test]
    fn test_non_string_keys_and_tags() {
        let cfg = load_raw(b"1: one\ntrue: yes\nt: !custom 5\n").unwrap();
        assert_eq!(find(&cfg, "1").and_then(Node::as_str), Some("one"));
        assert_eq!(find(&cfg, "true").and_then(Node::as_str), Some("yes"));
        assert_eq!(find(&cfg, "t").and_then(Node::as_int), Some(5));
    }

    #[test]
    fn test_export_decodes_back() {
        let cfg = load_raw(CFG1.as_bytes()).unwrap();
        let out = export(&cfg).unwrap();
        assert_eq!(load_raw(&out).unwrap(), cfg);
    }

    #[test]
    fn test_dump_to_writer() {
        let cfg = load_raw(b"a: 1\n").unwrap();
        let mut buf = Vec::new();
        dump_to(&cfg, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load("/definitely/not/here.yml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
