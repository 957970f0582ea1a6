//! In-memory entity storage
//!
//! Owns the authoritative node and edge collections. Enforces key uniqueness,
//! referential integrity between edges and nodes, and the structural policies
//! of [`GraphConfig`]. Emits nothing: notification is the engine's job.

use super::attribute::Attributes;
use super::config::{GraphConfig, GraphType};
use super::edge::Edge;
use super::event::EventKind;
use super::node::Node;
use super::types::{EdgeKey, NodeKey};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} already exists")]
    DuplicateNode(NodeKey),

    #[error("Edge {0} already exists")]
    DuplicateEdge(EdgeKey),

    #[error("Node {0} not found")]
    UnknownNode(NodeKey),

    #[error("Edge {0} not found")]
    UnknownEdge(EdgeKey),

    #[error("Graph of type {graph_type:?} does not accept this edge (undirected: {undirected})")]
    EdgeTypeNotAllowed { graph_type: GraphType, undirected: bool },

    #[error("Self loop on node {0} is not allowed")]
    SelfLoopNotAllowed(NodeKey),

    #[error("An edge between {from} and {to} already exists")]
    ParallelEdgeNotAllowed { from: NodeKey, to: NodeKey },

    /// A subscriber failed after the mutation was committed; `key` names the
    /// node or edge the event was about
    #[error("Handler for {event} failed: {reason}")]
    Handler {
        event: EventKind,
        key: Option<String>,
        reason: String,
    },
}

impl GraphError {
    /// Whether this is a duplicate node or edge key
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, GraphError::DuplicateNode(_) | GraphError::DuplicateEdge(_))
    }

    /// Key of the committed entity whose event a subscriber rejected
    pub fn committed_key(&self) -> Option<&str> {
        match self {
            GraphError::Handler { key, .. } => key.as_deref(),
            _ => None,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory entity storage
///
/// - nodes: NodeKey -> Node, insertion ordered
/// - edges: EdgeKey -> Edge, insertion ordered
/// - outgoing: NodeKey -> edges whose nominal source is the node
/// - incoming: NodeKey -> edges whose nominal target is the node
///
/// The adjacency lists are a cache derived from `edges`. Records are only
/// handed out mutably inside the crate, so endpoints stay as created:
///
/// ```compile_fail
/// use eventgraph::{Attributes, EntityStore};
///
/// let mut store = EntityStore::new();
/// store.add_node("a", Attributes::new()).unwrap();
/// store.add_node("b", Attributes::new()).unwrap();
/// store.add_edge(Some("ab".into()), "a", "b", false, Attributes::new()).unwrap();
/// store.edge_mut("ab").unwrap().source = "b".into();
/// ```
#[derive(Debug, Default)]
pub struct EntityStore {
    nodes: IndexMap<NodeKey, Node>,

    edges: IndexMap<EdgeKey, Edge>,

    outgoing: HashMap<NodeKey, IndexSet<EdgeKey>>,

    incoming: HashMap<NodeKey, IndexSet<EdgeKey>>,

    config: GraphConfig,

    /// Counter for generated edge keys
    next_edge_id: u64,
}

impl EntityStore {
    /// Create a new empty store with the default configuration
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        EntityStore {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            config,
            next_edge_id: 0,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Add a node
    pub fn add_node(&mut self, key: impl Into<NodeKey>, attributes: Attributes) -> GraphResult<&Node> {
        let key = key.into();
        if self.nodes.contains_key(&key) {
            return Err(GraphError::DuplicateNode(key));
        }

        let node = Node::new_with_attributes(key.clone(), attributes);
        let (index, _) = self.nodes.insert_full(key, node);
        Ok(&self.nodes[index])
    }

    /// Add an edge, generating its key when none is given
    ///
    /// Every check runs before anything is inserted.
    pub fn add_edge(
        &mut self,
        key: Option<EdgeKey>,
        source: impl Into<NodeKey>,
        target: impl Into<NodeKey>,
        undirected: bool,
        attributes: Attributes,
    ) -> GraphResult<&Edge> {
        let source = source.into();
        let target = target.into();

        if let Some(key) = &key {
            if self.edges.contains_key(key) {
                return Err(GraphError::DuplicateEdge(key.clone()));
            }
        }
        if !self.nodes.contains_key(&source) {
            return Err(GraphError::UnknownNode(source));
        }
        if !self.nodes.contains_key(&target) {
            return Err(GraphError::UnknownNode(target));
        }
        if !self.config.graph_type.allows(undirected) {
            return Err(GraphError::EdgeTypeNotAllowed {
                graph_type: self.config.graph_type,
                undirected,
            });
        }
        if !self.config.allow_self_loops && source == target {
            return Err(GraphError::SelfLoopNotAllowed(source));
        }
        if !self.config.multi && self.has_parallel(&source, &target, undirected) {
            return Err(GraphError::ParallelEdgeNotAllowed { from: source, to: target });
        }

        let key = match key {
            Some(key) => key,
            None => self.generate_edge_key(),
        };

        self.outgoing.entry(source.clone()).or_default().insert(key.clone());
        self.incoming.entry(target.clone()).or_default().insert(key.clone());

        let edge = Edge::new_with_attributes(key.clone(), source, target, undirected, attributes);
        let (index, _) = self.edges.insert_full(key, edge);
        Ok(&self.edges[index])
    }

    /// Next generated key not held by a live edge
    fn generate_edge_key(&mut self) -> EdgeKey {
        loop {
            let candidate = EdgeKey::new(format!("{}{}", self.config.edge_key_prefix, self.next_edge_id));
            self.next_edge_id += 1;
            if !self.edges.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Whether an edge of the same orientation already joins the pair
    fn has_parallel(&self, source: &NodeKey, target: &NodeKey, undirected: bool) -> bool {
        self.incident_keys(source.as_str())
            .iter()
            .filter_map(|key| self.edges.get(key))
            .any(|edge| edge.undirected == undirected && edge.links(source.as_str(), target.as_str()))
    }

    /// Drop a node and every edge incident to it
    ///
    /// Returns the node and the cascaded edges in edge-store order.
    pub fn drop_node(&mut self, key: &str) -> GraphResult<(Node, Vec<Edge>)> {
        if !self.nodes.contains_key(key) {
            return Err(GraphError::UnknownNode(NodeKey::new(key)));
        }

        let mut cascaded: Vec<EdgeKey> = self.incident_keys(key).into_iter().collect();
        cascaded.sort_by_key(|edge_key| self.edges.get_index_of(edge_key));

        let mut dropped = Vec::with_capacity(cascaded.len());
        for edge_key in cascaded {
            if let Some(edge) = self.remove_edge(edge_key.as_str()) {
                dropped.push(edge);
            }
        }

        self.outgoing.remove(key);
        self.incoming.remove(key);
        let node = self
            .nodes
            .shift_remove(key)
            .ok_or_else(|| GraphError::UnknownNode(NodeKey::new(key)))?;

        Ok((node, dropped))
    }

    /// Drop a single edge
    pub fn drop_edge(&mut self, key: &str) -> GraphResult<Edge> {
        self.remove_edge(key)
            .ok_or_else(|| GraphError::UnknownEdge(EdgeKey::new(key)))
    }

    fn remove_edge(&mut self, key: &str) -> Option<Edge> {
        let edge = self.edges.shift_remove(key)?;

        if let Some(adj) = self.outgoing.get_mut(&edge.source) {
            adj.shift_remove(key);
        }
        if let Some(adj) = self.incoming.get_mut(&edge.target) {
            adj.shift_remove(key);
        }

        Some(edge)
    }

    /// Remove every node and edge
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.outgoing.clear();
        self.incoming.clear();
        self.next_edge_id = 0;
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub(crate) fn node_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    pub fn edge(&self, key: &str) -> Option<&Edge> {
        self.edges.get(key)
    }

    pub(crate) fn edge_mut(&mut self, key: &str) -> Option<&mut Edge> {
        self.edges.get_mut(key)
    }

    pub fn has_node(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn has_edge(&self, key: &str) -> bool {
        self.edges.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.nodes.keys()
    }

    pub fn edge_keys(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.keys()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Edges whose nominal source is `node`
    pub fn out_edges(&self, node: &str) -> Vec<&Edge> {
        self.adjacent(self.outgoing.get(node))
    }

    /// Edges whose nominal target is `node`
    pub fn in_edges(&self, node: &str) -> Vec<&Edge> {
        self.adjacent(self.incoming.get(node))
    }

    /// Every edge touching `node`, in edge-store order
    pub fn incident_edges(&self, node: &str) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self
            .incident_keys(node)
            .iter()
            .filter_map(|key| self.edges.get(key))
            .collect();
        edges.sort_by_key(|edge| self.edges.get_index_of(&edge.key));
        edges
    }

    /// Edges leading from `source` to `target`; undirected edges match either way
    pub fn edges_between(&self, source: &str, target: &str) -> Vec<&Edge> {
        self.incident_edges(source)
            .into_iter()
            .filter(|edge| edge.links(source, target))
            .collect()
    }

    /// Number of edge endpoints at `node`; a self loop counts twice
    pub fn degree(&self, node: &str) -> usize {
        self.outgoing.get(node).map_or(0, |adj| adj.len())
            + self.incoming.get(node).map_or(0, |adj| adj.len())
    }

    fn adjacent(&self, keys: Option<&IndexSet<EdgeKey>>) -> Vec<&Edge> {
        keys.map(|keys| keys.iter().filter_map(|key| self.edges.get(key)).collect())
            .unwrap_or_default()
    }

    fn incident_keys(&self, node: &str) -> IndexSet<EdgeKey> {
        let mut keys = IndexSet::new();
        if let Some(adj) = self.outgoing.get(node) {
            keys.extend(adj.iter().cloned());
        }
        if let Some(adj) = self.incoming.get(node) {
            keys.extend(adj.iter().cloned());
        }
        keys
    }
}
