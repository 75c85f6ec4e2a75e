use keystone_types::{Credential, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A coerced, typed field value.
///
/// Secrets never appear here; they are hashed into the record's
/// [`Credential`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl FieldValue {
    /// Returns the string content, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// A typed instance of an entity schema.
///
/// The persistence store owns the canonical copy once saved; the engine only
/// holds transient working copies. `id` is `None` until the store assigns
/// one on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: Option<EntityId>,
    pub entity_type: String,
    pub values: BTreeMap<String, FieldValue>,
    /// Present only on credential-bearing entities. Never exposed in
    /// projections.
    pub credential: Option<Credential>,
}

impl EntityRecord {
    /// Creates an empty, unsaved record of the given type.
    #[must_use]
    pub fn new(entity_type: &str) -> Self {
        Self {
            id: None,
            entity_type: entity_type.into(),
            values: BTreeMap::new(),
            credential: None,
        }
    }

    /// Reads a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Writes a field value, replacing any previous one.
    pub fn set(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.into(), value);
    }
}
