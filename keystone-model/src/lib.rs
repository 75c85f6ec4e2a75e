//! Entity model for the Keystone command engine.
//!
//! Defines the schema-driven side of the system:
//! - [`EntitySchema`] / [`FieldSchema`] / [`FieldKind`] — typed field
//!   descriptors per entity
//! - [`TypeRegistry`] — immutable name-to-schema map built once at startup
//! - [`EntityRecord`] / [`FieldValue`] — typed instances of a schema
//! - [`coerce`] / [`parse_attr_token`] — turning raw `key=value` command
//!   tokens into typed field values
//!
//! The registry replaces runtime reflection: every entity kind the engine
//! can manipulate is declared here as data, and all coercion is checked
//! against the declared field kinds.

mod coerce;
mod entity;
mod error;
mod registry;
mod schema;

pub use coerce::{coerce, parse_attr_token, Coerced};
pub use entity::{EntityRecord, FieldValue};
pub use error::{RegistryError, ValidationError};
pub use registry::{TypeRegistry, TypeRegistryBuilder};
pub use schema::{EntitySchema, FieldKind, FieldSchema};
