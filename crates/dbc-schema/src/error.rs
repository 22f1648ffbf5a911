use thiserror::Error;

use crate::FieldType;

/// Defects in a model declaration. Surfaced on first use of the type and
/// cached with the schema, so every later call reports the same error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("class '{type_name}' has no declared properties, cannot be deserialized")]
    NoDeclaredProperties { type_name: &'static str },
    #[error("class '{type_name}' declares the wire name '{wire_name}' more than once")]
    DuplicateWireName {
        type_name: &'static str,
        wire_name: String,
    },
    #[error(
        "property '{property}' of class '{type_name}' depends on undeclared property '{dependency}'"
    )]
    UnknownDependency {
        type_name: &'static str,
        property: String,
        dependency: String,
    },
    #[error("property dependencies of class '{type_name}' form a cycle")]
    DependencyCycle { type_name: &'static str },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeserializeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("{} of the required properties missing", quote_list(.names))]
    MissingRequiredProperties { names: Vec<String> },
    #[error("Unexpected property '{property}'")]
    UnexpectedProperty { property: String },
    #[error("{}", invalid_value_message(.path, .value, .expected_format))]
    InvalidPropertyValue {
        path: String,
        value: String,
        expected_format: Option<String>,
    },
    #[error("{}", type_mismatch_message(.path, .expected, .found))]
    TypeMismatch {
        path: String,
        expected: FieldType,
        found: &'static str,
    },
    #[error("value of the property '{path}' was rejected: {message}")]
    Rejected { path: String, message: String },
}

impl DeserializeError {
    /// Errors a form can render next to the offending field.
    pub fn is_field_error(&self) -> bool {
        matches!(
            self,
            DeserializeError::MissingRequiredProperties { .. }
                | DeserializeError::InvalidPropertyValue { .. }
                | DeserializeError::TypeMismatch { .. }
                | DeserializeError::Rejected { .. }
        )
    }

    /// Field path the error points at, if it concerns a single property.
    pub fn path(&self) -> Option<&str> {
        match self {
            DeserializeError::UnexpectedProperty { property } => Some(property),
            DeserializeError::InvalidPropertyValue { path, .. }
            | DeserializeError::TypeMismatch { path, .. }
            | DeserializeError::Rejected { path, .. } => Some(path),
            DeserializeError::Schema(_) | DeserializeError::MissingRequiredProperties { .. } => {
                None
            }
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SerializeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn invalid_value_message(path: &str, value: &str, expected_format: &Option<String>) -> String {
    match expected_format {
        Some(format) => {
            format!("'{value}' is not valid (expected format: '{format}') for the property '{path}'")
        }
        None => format!("'{value}' is not valid for the property '{path}'"),
    }
}

fn type_mismatch_message(path: &str, expected: &FieldType, found: &str) -> String {
    if path.is_empty() {
        format!("expected {expected}, found {found}")
    } else {
        format!("expected {expected} for the property '{path}', found {found}")
    }
}
