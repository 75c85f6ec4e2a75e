use crate::error::RegistryError;
use crate::schema::{EntitySchema, FieldSchema};
use std::collections::BTreeMap;

/// Immutable name-to-schema map.
///
/// Built once at process start through [`TypeRegistryBuilder`] and read-only
/// afterwards, so shared references are safe across threads without locking.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    schemas: BTreeMap<String, EntitySchema>,
}

impl TypeRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder {
            schemas: BTreeMap::new(),
        }
    }

    /// The built-in entity set: `User` and `Role`.
    #[must_use]
    pub fn builtin() -> Self {
        Self::builder()
            .register(EntitySchema::new(
                "User",
                vec![
                    FieldSchema::string("Username", true),
                    FieldSchema::string("Email", true),
                    FieldSchema::boolean("Verified", false),
                    FieldSchema::secret("Password"),
                ],
            ))
            .and_then(|b| {
                b.register(EntitySchema::new(
                    "Role",
                    vec![FieldSchema::string("Name", true)],
                ))
            })
            .expect("built-in schemas are well-formed")
            .build()
    }

    /// Looks up a schema by entity name. Names are case-sensitive.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&EntitySchema> {
        self.schemas.get(name)
    }

    /// All registered entity names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

/// Accumulates schemas before freezing them into a [`TypeRegistry`].
#[derive(Debug)]
pub struct TypeRegistryBuilder {
    schemas: BTreeMap<String, EntitySchema>,
}

impl TypeRegistryBuilder {
    /// Adds a schema.
    ///
    /// # Errors
    ///
    /// Rejects duplicate entity names and schemas with more than one secret
    /// field; both are declaration bugs caught at startup.
    pub fn register(mut self, schema: EntitySchema) -> Result<Self, RegistryError> {
        if schema.fields().iter().filter(|f| f.is_secret()).count() > 1 {
            return Err(RegistryError::MultipleSecretFields(schema.name().into()));
        }
        let name = schema.name().to_string();
        if self.schemas.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.schemas.insert(name, schema);
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            schemas: self.schemas,
        }
    }
}
