//! Edge record
//!
//! Edges reference their endpoints by key. Directed and undirected edges share
//! one key space; parallel edges between the same endpoints are distinct.

use super::attribute::{AttributeContainer, AttributeValue, Attributes};
use super::types::{EdgeKey, NodeKey};
use serde::{Deserialize, Serialize};

/// An edge in the graph
///
/// `source`, `target` and `undirected` are fixed at creation. For an
/// undirected edge the endpoints are interchangeable for lookups, but the
/// nominal order given at creation is what gets reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique key for this edge
    pub key: EdgeKey,

    /// Source node (nominal for undirected edges)
    pub source: NodeKey,

    /// Target node (nominal for undirected edges)
    pub target: NodeKey,

    pub undirected: bool,

    /// Attributes associated with this edge
    pub attributes: AttributeContainer,
}

impl Edge {
    /// Create a new edge
    pub fn new(
        key: impl Into<EdgeKey>,
        source: impl Into<NodeKey>,
        target: impl Into<NodeKey>,
        undirected: bool,
    ) -> Self {
        Self::new_with_attributes(key, source, target, undirected, Attributes::new())
    }

    /// Create a new edge with attributes
    pub fn new_with_attributes(
        key: impl Into<EdgeKey>,
        source: impl Into<NodeKey>,
        target: impl Into<NodeKey>,
        undirected: bool,
        attributes: Attributes,
    ) -> Self {
        Edge {
            key: key.into(),
            source: source.into(),
            target: target.into(),
            undirected,
            attributes: AttributeContainer::from_attributes(attributes),
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Check if this edge connects two specific nodes (in either direction)
    pub fn connects(&self, node1: &str, node2: &str) -> bool {
        let (source, target) = (self.source.as_str(), self.target.as_str());
        (source == node1 && target == node2) || (source == node2 && target == node1)
    }

    /// Check if this edge leads from `source` to `target`, honoring direction
    /// for directed edges only
    pub fn links(&self, source: &str, target: &str) -> bool {
        if self.undirected {
            self.connects(source, target)
        } else {
            self.source.as_str() == source && self.target.as_str() == target
        }
    }

    /// Check if `node` is one of the endpoints
    pub fn has_extremity(&self, node: &str) -> bool {
        self.source.as_str() == node || self.target.as_str() == node
    }

    /// The endpoint opposite to `node`, if `node` is an endpoint
    pub fn opposite(&self, node: &str) -> Option<&NodeKey> {
        if self.source.as_str() == node {
            Some(&self.target)
        } else if self.target.as_str() == node {
            Some(&self.source)
        } else {
            None
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
