//! Error types for the entity model.

use thiserror::Error;

/// Failures while building the type registry at startup.
///
/// These indicate programmer error in the schema declarations, not bad
/// runtime input, and are surfaced before the engine accepts any command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The same entity name was registered twice.
    #[error("entity schema registered twice: {0}")]
    Duplicate(String),

    /// A schema declares more than one secret field.
    #[error("entity schema {0} declares more than one secret field")]
    MultipleSecretFields(String),
}

/// A rejected command token or attribute value.
///
/// Coercion is all-or-nothing: callers apply every token to a scratch record
/// and commit only when no token produced one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The token has no `=` separating key from value, or an empty key.
    #[error("invalid attribute format: {token}")]
    InvalidTokenFormat { token: String },

    /// The key names no field of the schema.
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    /// The value is not a member of the enum field's domain.
    #[error("invalid value for enum field {field}: {value}")]
    InvalidEnumValue { field: String, value: String },

    /// The value does not parse as the field's scalar kind.
    #[error("field {field} expects {expected}, got: {value}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        value: String,
    },

    /// A required field was left unset at creation.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// A secret field was addressed through generic attribute assignment.
    /// Passwords change only through the explicit account operations.
    #[error("field {field} cannot be assigned directly")]
    SecretFieldNotAssignable { field: String },
}
