//! Eventgraph
//!
//! An in-memory, attributed, directed/undirected multigraph with a
//! deterministic change-notification contract: every call that changes
//! structure or attributes emits exactly one event describing the change.
//!
//! ## Example Usage
//!
//! ```rust
//! use eventgraph::{attributes, EventKind, Graph, GraphEvent};
//! use std::sync::{Arc, Mutex};
//!
//! let mut graph = Graph::new();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! graph.on(EventKind::EdgeAdded, move |_, event| {
//!     sink.lock().unwrap().push(event.clone());
//!     Ok(())
//! });
//!
//! graph.add_nodes_from(["John", "Thomas"]).unwrap();
//! graph
//!     .add_edge_with_key("J->T", "John", "Thomas", attributes([("weight", 1)]))
//!     .unwrap();
//!
//! let events = seen.lock().unwrap();
//! assert_eq!(events.len(), 1);
//! assert!(matches!(&events[0], GraphEvent::EdgeAdded { undirected: false, .. }));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod graph;

// Re-export main types for convenience
pub use graph::{
    attributes, AttributeContainer, AttributeUpdate, AttributeValue, Attributes, Edge, EdgeKey,
    EntityStore, EventBus, EventKind, Graph, GraphConfig, GraphError, GraphEvent, GraphResult,
    GraphType, HandlerId, HandlerResult, Node, NodeKey,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
