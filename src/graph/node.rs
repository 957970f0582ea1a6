//! Node record

use super::attribute::{AttributeContainer, AttributeValue, Attributes};
use super::types::NodeKey;
use serde::{Deserialize, Serialize};

/// A node in the graph
///
/// Nodes have:
/// - A unique key, immutable once assigned
/// - Their own attribute container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique key for this node
    pub key: NodeKey,

    /// Attributes associated with this node
    pub attributes: AttributeContainer,
}

impl Node {
    /// Create a node without attributes
    pub fn new(key: impl Into<NodeKey>) -> Self {
        Node {
            key: key.into(),
            attributes: AttributeContainer::new(),
        }
    }

    /// Create a node with initial attributes
    pub fn new_with_attributes(key: impl Into<NodeKey>, attributes: Attributes) -> Self {
        Node {
            key: key.into(),
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
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
