//! Attributed multigraph with change notification
//!
//! This module implements:
//! - Nodes and edges keyed by caller-supplied or generated keys
//! - Directed and undirected edges, parallel edges allowed
//! - Graph, node and edge attributes with set/merge/replace/remove
//! - A synchronous event bus emitting one event per logical change

pub mod attribute;
pub mod bus;
pub mod config;
pub mod edge;
pub mod engine;
pub mod event;
pub mod node;
pub mod store;
pub mod types;

// Re-export main types
pub use attribute::{attributes, AttributeContainer, AttributeUpdate, AttributeValue, Attributes};
pub use bus::{EventBus, Handler, HandlerId, HandlerResult};
pub use config::{GraphConfig, GraphType};
pub use edge::Edge;
pub use engine::Graph;
pub use event::{EventKind, GraphEvent};
pub use node::Node;
pub use store::{EntityStore, GraphError, GraphResult};
pub use types::{EdgeKey, NodeKey};
