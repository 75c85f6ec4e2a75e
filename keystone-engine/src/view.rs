use keystone_model::{EntityRecord, EntitySchema, FieldValue};
use keystone_types::EntityId;
use std::fmt;

/// A read-only projection of a persisted entity.
///
/// Fields appear in schema declaration order. Secret fields and the stored
/// credential never appear; the projection is safe to show to any caller.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    pub entity_type: String,
    pub fields: Vec<(String, FieldValue)>,
}

impl EntityView {
    /// Projects a saved record through its schema.
    #[must_use]
    pub fn project(schema: &EntitySchema, id: EntityId, record: &EntityRecord) -> Self {
        let fields = schema
            .fields()
            .iter()
            .filter(|f| !f.is_secret())
            .filter_map(|f| record.get(&f.name).map(|v| (f.name.clone(), v.clone())))
            .collect();
        Self {
            id,
            entity_type: record.entity_type.clone(),
            fields,
        }
    }

    /// Reads a projected field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for EntityView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity_type, self.id)?;
        for (name, value) in &self.fields {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}
