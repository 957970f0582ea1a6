//! Attribute values and the attribute container shared by graph, nodes and edges
//!
//! Every attribute operation returns an [`AttributeUpdate`] describing exactly
//! what it did; the engine forwards that description as the event payload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute value
///
/// Any value shape is accepted, no schema is enforced. Serializes as a plain
/// JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<AttributeValue>),
    Map(IndexMap<String, AttributeValue>),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_string(&self) -> Option<&str> {
        if let AttributeValue::String(s) = self { Some(s) } else { None }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let AttributeValue::Integer(i) = self { Some(*i) } else { None }
    }

    /// Numeric value as a float; integers are widened
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let AttributeValue::Boolean(b) = self { Some(*b) } else { None }
    }

    pub fn as_array(&self) -> Option<&[AttributeValue]> {
        if let AttributeValue::Array(items) = self { Some(items) } else { None }
    }

    pub fn as_map(&self) -> Option<&Attributes> {
        if let AttributeValue::Map(map) = self { Some(map) } else { None }
    }

    /// JSON type of the value as it appears on the wire
    pub fn json_type(&self) -> &'static str {
        match self {
            AttributeValue::Null => "null",
            AttributeValue::Boolean(_) => "boolean",
            AttributeValue::Integer(_) | AttributeValue::Float(_) => "number",
            AttributeValue::String(_) => "string",
            AttributeValue::Array(_) => "array",
            AttributeValue::Map(_) => "object",
        }
    }
}

/// Renders the value as compact JSON, the same text subscribers see
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

// Convenience conversions
impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Integer(i)
    }
}

impl From<i32> for AttributeValue {
    fn from(i: i32) -> Self {
        AttributeValue::Integer(i as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(arr: Vec<AttributeValue>) -> Self {
        AttributeValue::Array(arr)
    }
}

impl From<IndexMap<String, AttributeValue>> for AttributeValue {
    fn from(map: IndexMap<String, AttributeValue>) -> Self {
        AttributeValue::Map(map)
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => AttributeValue::String(s),
            Value::Array(arr) => {
                AttributeValue::Array(arr.into_iter().map(AttributeValue::from).collect())
            }
            Value::Object(obj) => AttributeValue::Map(
                obj.into_iter()
                    .map(|(k, v)| (k, AttributeValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Insertion-ordered attribute mapping
pub type Attributes = IndexMap<String, AttributeValue>;

/// Build an [`Attributes`] map from name/value pairs
pub fn attributes<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Attributes
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Change description produced by one attribute operation
///
/// Serializes as `{"type": <kind>, "meta": {...}}`, the shape carried by the
/// `*AttributesUpdated` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "meta", rename_all = "lowercase")]
pub enum AttributeUpdate {
    /// A single entry was inserted or overwritten
    Set { name: String, value: AttributeValue },
    /// The given entries were overlaid, exactly as passed in
    Merge { data: Attributes },
    /// The whole mapping was swapped
    Replace { before: Attributes, after: Attributes },
    /// Removal of one entry was requested
    Remove { name: String },
}

impl AttributeUpdate {
    /// Wire name of the update kind
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeUpdate::Set { .. } => "set",
            AttributeUpdate::Merge { .. } => "merge",
            AttributeUpdate::Replace { .. } => "replace",
            AttributeUpdate::Remove { .. } => "remove",
        }
    }
}

/// Mutable attribute mapping owned by the graph, a node or an edge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeContainer {
    entries: Attributes,
}

impl AttributeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(entries: Attributes) -> Self {
        AttributeContainer { entries }
    }

    /// Insert or overwrite a single entry
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> AttributeUpdate {
        let name = name.into();
        let value = value.into();
        self.entries.insert(name.clone(), value.clone());
        AttributeUpdate::Set { name, value }
    }

    /// Overlay `partial`; entries it doesn't name are untouched
    pub fn merge(&mut self, partial: Attributes) -> AttributeUpdate {
        for (name, value) in &partial {
            self.entries.insert(name.clone(), value.clone());
        }
        AttributeUpdate::Merge { data: partial }
    }

    /// Discard the whole mapping and install `full`
    pub fn replace(&mut self, full: Attributes) -> AttributeUpdate {
        let before = std::mem::replace(&mut self.entries, full.clone());
        AttributeUpdate::Replace { before, after: full }
    }

    /// Remove an entry. Removing an absent name is a no-op that still
    /// reports the removal.
    pub fn remove(&mut self, name: impl Into<String>) -> AttributeUpdate {
        let name = name.into();
        self.entries.shift_remove(&name);
        AttributeUpdate::Remove { name }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, AttributeValue> {
        self.entries.iter()
    }

    pub fn as_map(&self) -> &Attributes {
        &self.entries
    }

    /// Snapshot of the current contents
    pub fn to_attributes(&self) -> Attributes {
        self.entries.clone()
    }

    pub fn into_attributes(self) -> Attributes {
        self.entries
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl From<Attributes> for AttributeContainer {
    fn from(entries: Attributes) -> Self {
        AttributeContainer::from_attributes(entries)
    }
}
