//! Graph change events
//!
//! One event is emitted per logical change. The serialized form is the wire
//! contract for external consumers: `{"event": "<name>", ...payload fields}`.

use super::attribute::{AttributeUpdate, Attributes};
use super::types::{EdgeKey, NodeKey};
use serde::Serialize;
use std::fmt;

/// Event family a handler subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    NodeAdded,
    NodeDropped,
    EdgeAdded,
    EdgeDropped,
    Cleared,
    AttributesUpdated,
    NodeAttributesUpdated,
    EdgeAttributesUpdated,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::NodeAdded,
        EventKind::NodeDropped,
        EventKind::EdgeAdded,
        EventKind::EdgeDropped,
        EventKind::Cleared,
        EventKind::AttributesUpdated,
        EventKind::NodeAttributesUpdated,
        EventKind::EdgeAttributesUpdated,
    ];

    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NodeAdded => "nodeAdded",
            EventKind::NodeDropped => "nodeDropped",
            EventKind::EdgeAdded => "edgeAdded",
            EventKind::EdgeDropped => "edgeDropped",
            EventKind::Cleared => "cleared",
            EventKind::AttributesUpdated => "attributesUpdated",
            EventKind::NodeAttributesUpdated => "nodeAttributesUpdated",
            EventKind::EdgeAttributesUpdated => "edgeAttributesUpdated",
        }
    }

    /// Look up a kind by its wire name
    pub fn from_name(name: &str) -> Option<EventKind> {
        EventKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change notification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GraphEvent {
    NodeAdded {
        key: NodeKey,
        /// Initial attributes
        attributes: Attributes,
    },
    NodeDropped {
        key: NodeKey,
        /// Attributes at the time of the drop
        attributes: Attributes,
    },
    EdgeAdded {
        key: EdgeKey,
        source: NodeKey,
        target: NodeKey,
        attributes: Attributes,
        undirected: bool,
    },
    EdgeDropped {
        key: EdgeKey,
        source: NodeKey,
        target: NodeKey,
        attributes: Attributes,
        undirected: bool,
    },
    Cleared,
    /// Graph-level attribute change
    AttributesUpdated {
        #[serde(flatten)]
        update: AttributeUpdate,
    },
    NodeAttributesUpdated {
        key: NodeKey,
        #[serde(flatten)]
        update: AttributeUpdate,
    },
    EdgeAttributesUpdated {
        key: EdgeKey,
        #[serde(flatten)]
        update: AttributeUpdate,
    },
}

impl GraphEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GraphEvent::NodeAdded { .. } => EventKind::NodeAdded,
            GraphEvent::NodeDropped { .. } => EventKind::NodeDropped,
            GraphEvent::EdgeAdded { .. } => EventKind::EdgeAdded,
            GraphEvent::EdgeDropped { .. } => EventKind::EdgeDropped,
            GraphEvent::Cleared => EventKind::Cleared,
            GraphEvent::AttributesUpdated { .. } => EventKind::AttributesUpdated,
            GraphEvent::NodeAttributesUpdated { .. } => EventKind::NodeAttributesUpdated,
            GraphEvent::EdgeAttributesUpdated { .. } => EventKind::EdgeAttributesUpdated,
        }
    }

    /// Key of the node or edge the event is about
    pub fn key(&self) -> Option<&str> {
        match self {
            GraphEvent::NodeAdded { key, .. }
            | GraphEvent::NodeDropped { key, .. }
            | GraphEvent::NodeAttributesUpdated { key, .. } => Some(key.as_str()),
            GraphEvent::EdgeAdded { key, .. }
            | GraphEvent::EdgeDropped { key, .. }
            | GraphEvent::EdgeAttributesUpdated { key, .. } => Some(key.as_str()),
            GraphEvent::Cleared | GraphEvent::AttributesUpdated { .. } => None,
        }
    }

    /// Change description carried by attribute events
    pub fn update(&self) -> Option<&AttributeUpdate> {
        match self {
            GraphEvent::AttributesUpdated { update }
            | GraphEvent::NodeAttributesUpdated { update, .. }
            | GraphEvent::EdgeAttributesUpdated { update, .. } => Some(update),
            _ => None,
        }
    }

    /// Payload object without the `event` tag
    pub fn payload(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("event");
        }
        Ok(value)
    }
}
