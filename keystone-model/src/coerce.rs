//! Attribute token parsing and value coercion.
//!
//! Coercion is pure: a failure never leaves a partially mutated record
//! behind, because callers only commit a scratch record once every token has
//! coerced.

use crate::entity::FieldValue;
use crate::error::ValidationError;
use crate::schema::{EntitySchema, FieldKind};

/// The outcome of coercing one attribute token.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// A typed value ready to store on the record.
    Value(FieldValue),
    /// Raw secret input. The caller must route this through the credential
    /// manager; it is never stored verbatim.
    Secret(String),
}

/// Splits a `key=value` attribute token.
///
/// The first `=` separates key from value; any further `=` belongs to the
/// value. A token without `=`, or with an empty key, is rejected before any
/// coercion runs.
pub fn parse_attr_token(token: &str) -> Result<(&str, &str), ValidationError> {
    match token.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(ValidationError::InvalidTokenFormat {
            token: token.to_string(),
        }),
    }
}

/// Coerces a raw attribute value to the declared kind of `field`.
pub fn coerce(
    schema: &EntitySchema,
    field: &str,
    raw: &str,
) -> Result<Coerced, ValidationError> {
    let field_schema = schema
        .field(field)
        .ok_or_else(|| ValidationError::UnknownField {
            field: field.to_string(),
        })?;

    let mismatch = |expected: &'static str| ValidationError::TypeMismatch {
        field: field.to_string(),
        expected,
        value: raw.to_string(),
    };

    match &field_schema.kind {
        FieldKind::Secret => Ok(Coerced::Secret(raw.to_string())),
        FieldKind::String => Ok(Coerced::Value(FieldValue::String(raw.to_string()))),
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(|i| Coerced::Value(FieldValue::Integer(i)))
            .map_err(|_| mismatch("integer")),
        FieldKind::Float => raw
            .parse::<f64>()
            .map(|x| Coerced::Value(FieldValue::Float(x)))
            .map_err(|_| mismatch("float")),
        FieldKind::Boolean => raw
            .parse::<bool>()
            .map(|b| Coerced::Value(FieldValue::Boolean(b)))
            .map_err(|_| mismatch("boolean")),
        FieldKind::Enum(domain) => {
            // Case-sensitive membership check.
            if domain.iter().any(|v| v == raw) {
                Ok(Coerced::Value(FieldValue::String(raw.to_string())))
            } else {
                Err(ValidationError::InvalidEnumValue {
                    field: field.to_string(),
                    value: raw.to_string(),
                })
            }
        }
    }
}
