//! Mutation engine
//!
//! [`Graph`] is the public façade. Every mutating call validates its input,
//! applies the change to the entity store or an attribute container, then
//! emits exactly one event (a node drop emits one per cascaded edge first).
//! Failed validation leaves the graph untouched and emits nothing.
//!
//! A handler error is reported after the mutation has been committed: it
//! means "mutation succeeded, a subscriber failed", not a rollback.

use super::attribute::{AttributeContainer, AttributeUpdate, AttributeValue, Attributes};
use super::bus::{dispatch, EventBus, HandlerId, HandlerResult};
use super::config::{GraphConfig, GraphType};
use super::edge::Edge;
use super::event::{EventKind, GraphEvent};
use super::node::Node;
use super::store::{EntityStore, GraphError, GraphResult};
use super::types::{EdgeKey, NodeKey};
use tracing::debug;

/// Attributed multigraph with change notification
///
/// Mutating operations take `&mut self`; share a graph across threads behind
/// one lock (e.g. `Arc<RwLock<Graph>>`).
#[derive(Debug, Default)]
pub struct Graph {
    /// Graph-level attributes
    attributes: AttributeContainer,

    store: EntityStore,

    bus: EventBus<Graph>,
}

impl Graph {
    /// Create an empty mixed multigraph
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Graph {
            attributes: AttributeContainer::new(),
            store: EntityStore::with_config(config),
            bus: EventBus::new(),
        }
    }

    /// Create an empty graph accepting directed edges only
    pub fn directed() -> Self {
        Self::with_config(GraphConfig::default().with_graph_type(GraphType::Directed))
    }

    /// Create an empty graph accepting undirected edges only
    pub fn undirected() -> Self {
        Self::with_config(GraphConfig::default().with_graph_type(GraphType::Undirected))
    }

    pub fn config(&self) -> &GraphConfig {
        self.store.config()
    }

    /// Read access to the entity store
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    // ---- subscriptions -------------------------------------------------

    /// Subscribe to an event kind
    ///
    /// The handler gets the graph itself and may mutate it; nested
    /// mutations complete, emissions included, before the outer dispatch
    /// resumes.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&mut Graph, &GraphEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.bus.on(kind, handler)
    }

    pub fn off(&mut self, kind: EventKind, id: HandlerId) -> bool {
        self.bus.off(kind, id)
    }

    pub fn remove_all_listeners(&mut self, kind: Option<EventKind>) {
        self.bus.remove_all_listeners(kind)
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.bus.listener_count(kind)
    }

    fn emit(&mut self, event: GraphEvent) -> GraphResult<()> {
        let listeners = self.bus.listeners(event.kind());
        debug!(event = %event.kind(), key = ?event.key(), listeners = listeners.len(), "emit");
        dispatch(&listeners, self, &event)
    }

    // ---- structure -----------------------------------------------------

    /// Add a node with initial attributes
    pub fn add_node(&mut self, key: impl Into<NodeKey>, attributes: Attributes) -> GraphResult<()> {
        let node = self.store.add_node(key, attributes)?;
        let event = GraphEvent::NodeAdded {
            key: node.key.clone(),
            attributes: node.attributes.to_attributes(),
        };
        debug!(key = %node.key, "node added");
        self.emit(event)
    }

    /// Add attribute-less nodes one by one; stops at the first failure
    pub fn add_nodes_from<I, K>(&mut self, keys: I) -> GraphResult<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<NodeKey>,
    {
        for key in keys {
            self.add_node(key, Attributes::new())?;
        }
        Ok(())
    }

    /// Add an edge and return its key, generated when `key` is `None`
    pub fn add_edge(
        &mut self,
        key: Option<EdgeKey>,
        source: impl Into<NodeKey>,
        target: impl Into<NodeKey>,
        undirected: bool,
        attributes: Attributes,
    ) -> GraphResult<EdgeKey> {
        let edge = self.store.add_edge(key, source, target, undirected, attributes)?;
        let key = edge.key.clone();
        let event = GraphEvent::EdgeAdded {
            key: edge.key.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            attributes: edge.attributes.to_attributes(),
            undirected: edge.undirected,
        };
        debug!(key = %edge.key, source = %edge.source, target = %edge.target, undirected, "edge added");
        self.emit(event)?;
        Ok(key)
    }

    /// Add an edge under a caller-chosen key, oriented per the graph type
    /// (undirected only in undirected graphs)
    pub fn add_edge_with_key(
        &mut self,
        key: impl Into<EdgeKey>,
        source: impl Into<NodeKey>,
        target: impl Into<NodeKey>,
        attributes: Attributes,
    ) -> GraphResult<EdgeKey> {
        let undirected = self.config().graph_type.default_undirected();
        self.add_edge(Some(key.into()), source, target, undirected, attributes)
    }

    pub fn add_directed_edge(
        &mut self,
        source: impl Into<NodeKey>,
        target: impl Into<NodeKey>,
        attributes: Attributes,
    ) -> GraphResult<EdgeKey> {
        self.add_edge(None, source, target, false, attributes)
    }

    pub fn add_undirected_edge(
        &mut self,
        source: impl Into<NodeKey>,
        target: impl Into<NodeKey>,
        attributes: Attributes,
    ) -> GraphResult<EdgeKey> {
        self.add_edge(None, source, target, true, attributes)
    }

    /// Drop a node and, first, every edge incident to it
    ///
    /// Emits `edgeDropped` for each cascaded edge in edge-store order, then
    /// `nodeDropped`, so no subscriber ever sees an edge outlive its node.
    pub fn drop_node(&mut self, key: impl AsRef<str>) -> GraphResult<()> {
        let (node, edges) = self.store.drop_node(key.as_ref())?;
        debug!(key = %node.key, cascaded = edges.len(), "node dropped");

        for edge in edges {
            self.emit(edge_dropped(edge))?;
        }
        self.emit(GraphEvent::NodeDropped {
            key: node.key,
            attributes: node.attributes.into_attributes(),
        })
    }

    pub fn drop_edge(&mut self, key: impl AsRef<str>) -> GraphResult<()> {
        let edge = self.store.drop_edge(key.as_ref())?;
        debug!(key = %edge.key, "edge dropped");
        self.emit(edge_dropped(edge))
    }

    /// Remove every node, edge and graph attribute; subscriptions stay
    ///
    /// Emits a single `cleared` event.
    pub fn clear(&mut self) -> GraphResult<()> {
        debug!(nodes = self.store.node_count(), edges = self.store.edge_count(), "clear");
        self.store.clear();
        self.attributes.clear();
        self.emit(GraphEvent::Cleared)
    }

    // ---- attributes ------------------------------------------------------

    fn update_graph(&mut self, op: impl FnOnce(&mut AttributeContainer) -> AttributeUpdate) -> GraphResult<()> {
        let update = op(&mut self.attributes);
        debug!(kind = update.kind(), "graph attributes updated");
        self.emit(GraphEvent::AttributesUpdated { update })
    }

    fn update_node(
        &mut self,
        key: &str,
        op: impl FnOnce(&mut AttributeContainer) -> AttributeUpdate,
    ) -> GraphResult<()> {
        let node = self
            .store
            .node_mut(key)
            .ok_or_else(|| GraphError::UnknownNode(NodeKey::new(key)))?;
        let update = op(&mut node.attributes);
        let key = node.key.clone();
        debug!(key = %key, kind = update.kind(), "node attributes updated");
        self.emit(GraphEvent::NodeAttributesUpdated { key, update })
    }

    fn update_edge(
        &mut self,
        key: &str,
        op: impl FnOnce(&mut AttributeContainer) -> AttributeUpdate,
    ) -> GraphResult<()> {
        let edge = self
            .store
            .edge_mut(key)
            .ok_or_else(|| GraphError::UnknownEdge(EdgeKey::new(key)))?;
        let update = op(&mut edge.attributes);
        let key = edge.key.clone();
        debug!(key = %key, kind = update.kind(), "edge attributes updated");
        self.emit(GraphEvent::EdgeAttributesUpdated { key, update })
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> GraphResult<()> {
        self.update_graph(|attrs| attrs.set(name, value))
    }

    pub fn merge_attributes(&mut self, partial: Attributes) -> GraphResult<()> {
        self.update_graph(|attrs| attrs.merge(partial))
    }

    pub fn replace_attributes(&mut self, full: Attributes) -> GraphResult<()> {
        self.update_graph(|attrs| attrs.replace(full))
    }

    /// Remove a graph attribute; an absent name still emits
    pub fn remove_attribute(&mut self, name: impl Into<String>) -> GraphResult<()> {
        self.update_graph(|attrs| attrs.remove(name))
    }

    pub fn set_node_attribute(
        &mut self,
        key: impl AsRef<str>,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> GraphResult<()> {
        self.update_node(key.as_ref(), |attrs| attrs.set(name, value))
    }

    pub fn merge_node_attributes(&mut self, key: impl AsRef<str>, partial: Attributes) -> GraphResult<()> {
        self.update_node(key.as_ref(), |attrs| attrs.merge(partial))
    }

    pub fn replace_node_attributes(&mut self, key: impl AsRef<str>, full: Attributes) -> GraphResult<()> {
        self.update_node(key.as_ref(), |attrs| attrs.replace(full))
    }

    pub fn remove_node_attribute(&mut self, key: impl AsRef<str>, name: impl Into<String>) -> GraphResult<()> {
        self.update_node(key.as_ref(), |attrs| attrs.remove(name))
    }

    pub fn set_edge_attribute(
        &mut self,
        key: impl AsRef<str>,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> GraphResult<()> {
        self.update_edge(key.as_ref(), |attrs| attrs.set(name, value))
    }

    pub fn merge_edge_attributes(&mut self, key: impl AsRef<str>, partial: Attributes) -> GraphResult<()> {
        self.update_edge(key.as_ref(), |attrs| attrs.merge(partial))
    }

    pub fn replace_edge_attributes(&mut self, key: impl AsRef<str>, full: Attributes) -> GraphResult<()> {
        self.update_edge(key.as_ref(), |attrs| attrs.replace(full))
    }

    pub fn remove_edge_attribute(&mut self, key: impl AsRef<str>, name: impl Into<String>) -> GraphResult<()> {
        self.update_edge(key.as_ref(), |attrs| attrs.remove(name))
    }

    // ---- queries ---------------------------------------------------------

    /// Number of nodes
    pub fn order(&self) -> usize {
        self.store.node_count()
    }

    /// Number of edges
    pub fn size(&self) -> usize {
        self.store.edge_count()
    }

    pub fn has_node(&self, key: impl AsRef<str>) -> bool {
        self.store.has_node(key.as_ref())
    }

    pub fn has_edge(&self, key: impl AsRef<str>) -> bool {
        self.store.has_edge(key.as_ref())
    }

    pub fn node(&self, key: impl AsRef<str>) -> Option<&Node> {
        self.store.node(key.as_ref())
    }

    pub fn edge(&self, key: impl AsRef<str>) -> Option<&Edge> {
        self.store.edge(key.as_ref())
    }

    pub fn node_keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.store.node_keys()
    }

    pub fn edge_keys(&self) -> impl Iterator<Item = &EdgeKey> {
        self.store.edge_keys()
    }

    pub fn attributes(&self) -> &Attributes {
        self.attributes.as_map()
    }

    pub fn get_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    pub fn node_attributes(&self, key: impl AsRef<str>) -> GraphResult<&Attributes> {
        Ok(self.require_node(key.as_ref())?.attributes.as_map())
    }

    pub fn get_node_attribute(&self, key: impl AsRef<str>, name: &str) -> GraphResult<Option<&AttributeValue>> {
        Ok(self.require_node(key.as_ref())?.get_attribute(name))
    }

    pub fn edge_attributes(&self, key: impl AsRef<str>) -> GraphResult<&Attributes> {
        Ok(self.require_edge(key.as_ref())?.attributes.as_map())
    }

    pub fn get_edge_attribute(&self, key: impl AsRef<str>, name: &str) -> GraphResult<Option<&AttributeValue>> {
        Ok(self.require_edge(key.as_ref())?.get_attribute(name))
    }

    /// Nominal source of an edge
    pub fn source(&self, key: impl AsRef<str>) -> GraphResult<&NodeKey> {
        Ok(&self.require_edge(key.as_ref())?.source)
    }

    /// Nominal target of an edge
    pub fn target(&self, key: impl AsRef<str>) -> GraphResult<&NodeKey> {
        Ok(&self.require_edge(key.as_ref())?.target)
    }

    pub fn extremities(&self, key: impl AsRef<str>) -> GraphResult<(&NodeKey, &NodeKey)> {
        let edge = self.require_edge(key.as_ref())?;
        Ok((&edge.source, &edge.target))
    }

    pub fn is_undirected(&self, key: impl AsRef<str>) -> GraphResult<bool> {
        Ok(self.require_edge(key.as_ref())?.undirected)
    }

    pub fn out_edges(&self, node: impl AsRef<str>) -> GraphResult<Vec<&Edge>> {
        let node = node.as_ref();
        self.require_node(node)?;
        Ok(self.store.out_edges(node))
    }

    pub fn in_edges(&self, node: impl AsRef<str>) -> GraphResult<Vec<&Edge>> {
        let node = node.as_ref();
        self.require_node(node)?;
        Ok(self.store.in_edges(node))
    }

    pub fn incident_edges(&self, node: impl AsRef<str>) -> GraphResult<Vec<&Edge>> {
        let node = node.as_ref();
        self.require_node(node)?;
        Ok(self.store.incident_edges(node))
    }

    pub fn edges_between(&self, source: impl AsRef<str>, target: impl AsRef<str>) -> GraphResult<Vec<&Edge>> {
        let (source, target) = (source.as_ref(), target.as_ref());
        self.require_node(source)?;
        self.require_node(target)?;
        Ok(self.store.edges_between(source, target))
    }

    pub fn degree(&self, node: impl AsRef<str>) -> GraphResult<usize> {
        let node = node.as_ref();
        self.require_node(node)?;
        Ok(self.store.degree(node))
    }

    fn require_node(&self, key: &str) -> GraphResult<&Node> {
        self.store
            .node(key)
            .ok_or_else(|| GraphError::UnknownNode(NodeKey::new(key)))
    }

    fn require_edge(&self, key: &str) -> GraphResult<&Edge> {
        self.store
            .edge(key)
            .ok_or_else(|| GraphError::UnknownEdge(EdgeKey::new(key)))
    }
}

fn edge_dropped(edge: Edge) -> GraphEvent {
    GraphEvent::EdgeDropped {
        key: edge.key,
        source: edge.source,
        target: edge.target,
        attributes: edge.attributes.into_attributes(),
        undirected: edge.undirected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::attribute::attributes;
    use std::sync::{Arc, Mutex};

    /// Subscribe a recorder to every event kind
    fn record_all(graph: &mut Graph) -> Arc<Mutex<Vec<GraphEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let seen = Arc::clone(&seen);
            graph.on(kind, move |_, event| {
                seen.lock().unwrap().push(event.clone());
                Ok(())
            });
        }
        seen
    }

    #[test]
    fn test_add_node_emits_once() {
        let mut graph = Graph::new();
        let seen = record_all(&mut graph);

        graph.add_node("John", attributes([("age", 34)])).unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(
            *events,
            vec![GraphEvent::NodeAdded { key: "John".into(), attributes: attributes([("age", 34)]) }]
        );
        assert!(graph.has_node("John"));
        assert_eq!(graph.order(), 1);
    }

    #[test]
    fn test_failed_validation_is_silent() {
        let mut graph = Graph::new();
        graph.add_nodes_from(["John", "Thomas"]).unwrap();
        graph.add_edge_with_key("J->T", "John", "Thomas", attributes([("weight", 1)])).unwrap();
        let seen = record_all(&mut graph);

        assert_eq!(
            graph.add_node("John", Attributes::new()),
            Err(GraphError::DuplicateNode("John".into()))
        );
        assert_eq!(
            graph.add_edge_with_key("J->T", "Thomas", "John", Attributes::new()),
            Err(GraphError::DuplicateEdge("J->T".into()))
        );
        assert_eq!(graph.edge_attributes("J->T").unwrap(), &attributes([("weight", 1)]));
        assert_eq!(
            graph.add_edge(None, "John", "Nobody", false, Attributes::new()),
            Err(GraphError::UnknownNode("Nobody".into()))
        );
        assert_eq!(graph.drop_edge("missing"), Err(GraphError::UnknownEdge("missing".into())));
        assert_eq!(
            graph.set_node_attribute("Nobody", "age", 1),
            Err(GraphError::UnknownNode("Nobody".into()))
        );
        assert_eq!(
            graph.merge_edge_attributes("missing", Attributes::new()),
            Err(GraphError::UnknownEdge("missing".into()))
        );

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(graph.size(), 1);
    }

    #[test]
    fn test_add_edge_returns_generated_key() {
        let mut graph = Graph::new();
        graph.add_nodes_from(["a", "b"]).unwrap();

        let key = graph.add_directed_edge("a", "b", Attributes::new()).unwrap();
        assert_eq!(key.as_str(), "e0");
        assert_eq!(graph.extremities(&key).unwrap(), (&NodeKey::new("a"), &NodeKey::new("b")));
        assert!(!graph.is_undirected(&key).unwrap());
    }

    #[test]
    fn test_clear_keeps_subscriptions_and_drops_attributes() {
        let mut graph = Graph::new();
        graph.set_attribute("name", "g").unwrap();
        graph.add_nodes_from(["a", "b"]).unwrap();
        graph.add_undirected_edge("a", "b", Attributes::new()).unwrap();
        let seen = record_all(&mut graph);

        graph.clear().unwrap();
        graph.clear().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![GraphEvent::Cleared, GraphEvent::Cleared]);
        assert_eq!(graph.order(), 0);
        assert_eq!(graph.size(), 0);
        assert!(graph.attributes().is_empty());
        assert_eq!(graph.listener_count(EventKind::Cleared), 1);
    }

    #[test]
    fn test_edge_attribute_events_carry_edge_key() {
        let mut graph = Graph::new();
        graph.add_nodes_from(["John", "Thomas"]).unwrap();
        graph.add_edge_with_key("J->T", "John", "Thomas", Attributes::new()).unwrap();
        let seen = record_all(&mut graph);

        graph.set_edge_attribute("J->T", "weight", 34).unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::EdgeAttributesUpdated);
        assert_eq!(events[0].key(), Some("J->T"));
        assert_eq!(graph.get_edge_attribute("J->T", "weight").unwrap(), Some(&AttributeValue::Integer(34)));
    }

    #[test]
    fn test_edge_with_key_follows_graph_type() {
        let mut graph = Graph::undirected();
        graph.add_nodes_from(["a", "b"]).unwrap();

        graph.add_edge_with_key("ab", "a", "b", Attributes::new()).unwrap();
        assert!(graph.is_undirected("ab").unwrap());
        assert_eq!(graph.config().graph_type, GraphType::Undirected);

        let result = graph.add_directed_edge("a", "b", Attributes::new());
        assert!(matches!(result, Err(GraphError::EdgeTypeNotAllowed { .. })));
    }

    #[test]
    fn test_off_stops_delivery() {
        let mut graph = Graph::new();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let id = graph.on(EventKind::NodeAdded, move |_, _| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });

        graph.add_node("a", Attributes::new()).unwrap();
        assert!(graph.off(EventKind::NodeAdded, id));
        graph.add_node("b", Attributes::new()).unwrap();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_queries_on_unknown_entities() {
        let graph = Graph::new();
        assert_eq!(graph.node_attributes("x"), Err(GraphError::UnknownNode("x".into())));
        assert_eq!(graph.source("e"), Err(GraphError::UnknownEdge("e".into())));
        assert_eq!(graph.degree("x"), Err(GraphError::UnknownNode("x".into())));
        assert!(graph.node("x").is_none());
    }
}
