use serde_json::Value;
use tracing::{debug, trace};

use crate::{
    DeserializeError, FieldPath, FieldType, Model, SchemaError, Skip, codec::value_kind,
    registry::schema_of,
};

/// Materializes a `T` from a decoded JSON value.
pub fn deserialize<T: Model>(raw: &Value) -> Result<T, DeserializeError> {
    deserialize_at(raw, &FieldPath::root())
}

/// Like [`deserialize`], reporting error paths relative to `path`.
pub fn deserialize_at<T: Model>(raw: &Value, path: &FieldPath) -> Result<T, DeserializeError> {
    deserialize_into(T::default(), raw, path)
}

/// Populates `target` from `raw`. Properties absent from `raw` keep the
/// value `target` already holds.
pub fn deserialize_into<T: Model>(
    mut target: T,
    raw: &Value,
    path: &FieldPath,
) -> Result<T, DeserializeError> {
    let Value::Object(fields) = raw else {
        return Err(DeserializeError::TypeMismatch {
            path: path.to_string(),
            expected: FieldType::Object,
            found: value_kind(raw),
        });
    };

    let schema = schema_of::<T>()?;
    if schema.is_empty() {
        return Err(SchemaError::NoDeclaredProperties {
            type_name: schema.type_name(),
        }
        .into());
    }
    trace!(type_name = schema.type_name(), path = %path, "deserializing");

    for key in fields.keys() {
        match schema.get(key) {
            None => {
                return Err(DeserializeError::UnexpectedProperty {
                    property: path.key(key.as_str()).to_string(),
                });
            }
            Some(property) if property.skips(Skip::Deserialize) => {
                debug!(
                    type_name = schema.type_name(),
                    property = key.as_str(),
                    "ignoring property excluded from deserialization"
                );
            }
            Some(_) => {}
        }
    }

    let missing: Vec<String> = schema
        .properties()
        .filter(|property| {
            property.decl().required
                && !property.skips(Skip::Deserialize)
                && !fields.contains_key(property.wire_name())
        })
        .map(|property| path.key(property.wire_name()).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DeserializeError::MissingRequiredProperties { names: missing });
    }

    for property in schema.apply_order() {
        if property.skips(Skip::Deserialize) {
            continue;
        }
        let Some(raw_value) = fields.get(property.wire_name()) else {
            continue;
        };
        property.apply(&mut target, raw_value, &path.key(property.wire_name()))?;
    }

    Ok(target)
}
