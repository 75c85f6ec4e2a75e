use serde::{Deserialize, Serialize};

/// The semantic type of an entity field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-form text.
    String,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Float,
    /// `true` / `false`.
    Boolean,
    /// One of a fixed, case-sensitive set of values.
    Enum(Vec<String>),
    /// Write-only value (a raw password) that is hashed before storage and
    /// never round-tripped back out.
    Secret,
}

impl FieldKind {
    /// Human-readable kind name, used in coercion diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Enum(_) => "enum",
            Self::Secret => "secret",
        }
    }
}

/// A single typed field declared by an entity schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSchema {
    fn new(name: &str, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            required,
        }
    }

    /// Shorthand for a text field.
    pub fn string(name: &str, required: bool) -> Self {
        Self::new(name, FieldKind::String, required)
    }

    /// Shorthand for an integer field.
    pub fn integer(name: &str, required: bool) -> Self {
        Self::new(name, FieldKind::Integer, required)
    }

    /// Shorthand for a float field.
    pub fn float(name: &str, required: bool) -> Self {
        Self::new(name, FieldKind::Float, required)
    }

    /// Shorthand for a boolean field.
    pub fn boolean(name: &str, required: bool) -> Self {
        Self::new(name, FieldKind::Boolean, required)
    }

    /// Shorthand for an enum field with a fixed value domain.
    pub fn enumeration(name: &str, values: Vec<String>, required: bool) -> Self {
        Self::new(name, FieldKind::Enum(values), required)
    }

    /// Shorthand for a write-only secret field.
    pub fn secret(name: &str) -> Self {
        Self::new(name, FieldKind::Secret, true)
    }

    /// Returns true for [`FieldKind::Secret`] fields.
    #[must_use]
    pub fn is_secret(&self) -> bool {
        matches!(self.kind, FieldKind::Secret)
    }
}

/// Describes one entity type's structure.
///
/// Immutable once built; field order is the declaration order and is
/// preserved in projections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    name: String,
    fields: Vec<FieldSchema>,
}

impl EntitySchema {
    /// Creates a schema from an ordered field list.
    #[must_use]
    pub fn new(name: &str, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// The short entity name commands address this schema by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All declared fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Looks up a field by exact name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The schema's secret field, if it declares one.
    ///
    /// An entity with a secret field is credential-bearing: creating one
    /// triggers email verification.
    #[must_use]
    pub fn secret_field(&self) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.is_secret())
    }

    /// Returns true if this entity carries a credential.
    #[must_use]
    pub fn has_secret_field(&self) -> bool {
        self.secret_field().is_some()
    }
}
