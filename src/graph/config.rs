//! Graph configuration
//!
//! Structural policies checked by the engine before any mutation.

use serde::{Deserialize, Serialize};

/// Which edge kinds a graph accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
    /// Directed and undirected edges
    #[default]
    Mixed,
    /// Directed edges only
    Directed,
    /// Undirected edges only
    Undirected,
}

impl GraphType {
    /// Whether an edge with the given orientation is allowed
    pub fn allows(&self, undirected: bool) -> bool {
        match self {
            GraphType::Mixed => true,
            GraphType::Directed => !undirected,
            GraphType::Undirected => undirected,
        }
    }

    /// Orientation used by `add_edge`-style helpers that don't state one
    pub fn default_undirected(&self) -> bool {
        matches!(self, GraphType::Undirected)
    }
}

/// Graph configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Accepted edge kinds
    pub graph_type: GraphType,
    /// Whether an edge may have the same source and target
    pub allow_self_loops: bool,
    /// Whether several edges may connect the same pair of nodes
    pub multi: bool,
    /// Prefix for engine-generated edge keys
    pub edge_key_prefix: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            graph_type: GraphType::Mixed,
            allow_self_loops: true,
            multi: true,
            edge_key_prefix: "e".to_string(),
        }
    }
}

impl GraphConfig {
    pub fn with_graph_type(mut self, graph_type: GraphType) -> Self {
        self.graph_type = graph_type;
        self
    }

    pub fn with_self_loops(mut self, allow: bool) -> Self {
        self.allow_self_loops = allow;
        self
    }

    pub fn with_multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn with_edge_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.edge_key_prefix = prefix.into();
        self
    }
}
