//! Recursive value model for configuration trees.
//!
//! Every document is decoded into a [`Node`]: a tagged union of mapping,
//! sequence and scalar. All other modules operate on this type and check the
//! variant before use; a wrong-variant access yields [`Error::TypeMismatch`]
//! instead of aborting.

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from string keys to nodes.
///
/// Key order carries no meaning; a sorted map keeps exported documents stable.
pub type Mapping = BTreeMap<String, Node>;

/// A scalar leaf value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    /// Carried so arbitrary YAML decodes losslessly.
    Float(f64),
    String(String),
}

impl Scalar {
    /// Render the scalar the way it would appear unquoted in a document.
    ///
    /// Used when a non-string scalar stands in for a string, e.g. `port: 8080`
    /// inside an `_env` block.
    pub fn render(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::String(_) => "string",
        }
    }
}

/// A configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Mapping(Mapping),
    Sequence(Vec<Node>),
    Scalar(Scalar),
}

impl Default for Node {
    fn default() -> Self {
        Node::Mapping(Mapping::new())
    }
}

impl Node {
    /// An empty mapping.
    pub fn mapping() -> Self {
        Node::Mapping(Mapping::new())
    }

    pub fn null() -> Self {
        Node::Scalar(Scalar::Null)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Node::Scalar(Scalar::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    pub fn is_scalar_string(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::String(_)))
    }

    pub fn is_scalar_int(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Int(_)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Node::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as a mapping or fail with `TypeMismatch` naming `context`.
    pub fn try_mapping(&self, context: &str) -> Result<&Mapping> {
        self.as_mapping()
            .ok_or_else(|| Error::type_mismatch(context, "mapping", self.kind()))
    }

    pub fn try_mapping_mut(&mut self, context: &str) -> Result<&mut Mapping> {
        let found = self.kind();
        self.as_mapping_mut()
            .ok_or_else(|| Error::type_mismatch(context, "mapping", found))
    }

    /// Borrow as a string scalar or fail with `TypeMismatch` naming `context`.
    pub fn try_str(&self, context: &str) -> Result<&str> {
        self.as_str()
            .ok_or_else(|| Error::type_mismatch(context, "string", self.kind()))
    }

    /// Consume into a mapping or fail with `TypeMismatch`.
    pub fn into_mapping(self, context: &str) -> Result<Mapping> {
        match self {
            Node::Mapping(m) => Ok(m),
            other => Err(Error::type_mismatch(context, "mapping", other.kind())),
        }
    }

    /// Human-readable name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
            Node::Scalar(s) => s.kind(),
        }
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Node::Mapping(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Sequence(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::string(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::string(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::int(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::bool(value)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Scalar(s) => write!(f, "{}", s.render()),
            other => match serde_yaml::to_string(other) {
                Ok(text) => write!(f, "{}", text.trim_end()),
                Err(_) => write!(f, "<{}>", other.kind()),
            },
        }
    }
}
