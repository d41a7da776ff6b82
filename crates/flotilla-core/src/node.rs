//! Generic document tree
//!
//! A parsed manifest is a tree of scalar, sequence, and mapping nodes. The
//! leaves are string-typed: every YAML scalar is rendered to its string form
//! on conversion, and higher layers coerce where a key demands it.
//!
//! The `expect_*` accessors are the sole source of structural error
//! messages; parsers route through them instead of inspecting node shape
//! ad hoc, which keeps diagnostics uniform.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// A node in the parsed manifest tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Scalar value, in its string form
    Scalar(String),
    /// Ordered sequence of nodes
    Sequence(Vec<Node>),
    /// Mapping of string keys to nodes, in document order
    Mapping(IndexMap<String, Node>),
}

/// The shape of a node, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Scalar => write!(f, "scalar"),
            NodeKind::Sequence => write!(f, "sequence"),
            NodeKind::Mapping => write!(f, "mapping"),
        }
    }
}

impl Node {
    /// The shape of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Scalar(_) => NodeKind::Scalar,
            Node::Sequence(_) => NodeKind::Sequence,
            Node::Mapping(_) => NodeKind::Mapping,
        }
    }

    /// Check if this node is a scalar
    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }

    /// Check if this node is a sequence
    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    /// Check if this node is a mapping
    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    /// Get as str if this is a Scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get as slice if this is a Sequence
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Get as mapping if this is a Mapping
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// The scalar value of this node, or an error naming both shapes
    pub fn expect_scalar(&self) -> Result<&str> {
        match self {
            Node::Scalar(s) => Ok(s),
            other => Err(Error::unexpected_node(NodeKind::Scalar, other.kind())),
        }
    }

    /// The scalar value of this node, or an error naming the offending key
    pub fn expect_scalar_for(&self, key: &str) -> Result<&str> {
        match self {
            Node::Scalar(s) => Ok(s),
            _ => Err(Error::expected_for_key(key, NodeKind::Scalar)),
        }
    }

    /// The children of this node, or an error naming the offending key
    pub fn expect_sequence_for(&self, key: &str) -> Result<&[Node]> {
        match self {
            Node::Sequence(s) => Ok(s),
            _ => Err(Error::expected_for_key(key, NodeKind::Sequence)),
        }
    }

    /// The entries of this node, or an error naming both shapes
    pub fn expect_mapping(&self) -> Result<&IndexMap<String, Node>> {
        match self {
            Node::Mapping(m) => Ok(m),
            other => Err(Error::unexpected_node(NodeKind::Mapping, other.kind())),
        }
    }

    /// Convert a parsed YAML value into a node tree
    ///
    /// Scalars keep their string rendering: null becomes the empty string,
    /// booleans and numbers their display form. Tagged values unwrap to
    /// their inner value. A non-scalar mapping key is a syntax error.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Node> {
        match value {
            serde_yaml::Value::Null => Ok(Node::Scalar(String::new())),
            serde_yaml::Value::Bool(b) => Ok(Node::Scalar(b.to_string())),
            serde_yaml::Value::Number(n) => Ok(Node::Scalar(n.to_string())),
            serde_yaml::Value::String(s) => Ok(Node::Scalar(s)),
            serde_yaml::Value::Sequence(seq) => {
                let mut children = Vec::with_capacity(seq.len());
                for child in seq {
                    children.push(Node::from_yaml(child)?);
                }
                Ok(Node::Sequence(children))
            }
            serde_yaml::Value::Mapping(map) => {
                let mut entries = IndexMap::with_capacity(map.len());
                for (key, child) in map {
                    let key = match key {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        serde_yaml::Value::Number(n) => n.to_string(),
                        other => {
                            return Err(Error::syntax(format!(
                                "mapping keys must be scalars, found {:?}",
                                other
                            )))
                        }
                    };
                    entries.insert(key, Node::from_yaml(child)?);
                }
                Ok(Node::Mapping(entries))
            }
            serde_yaml::Value::Tagged(tagged) => Node::from_yaml(tagged.value),
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(s)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(v: Vec<T>) -> Self {
        Node::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Node>> for Node {
    fn from(m: IndexMap<String, Node>) -> Self {
        Node::Mapping(m)
    }
}
