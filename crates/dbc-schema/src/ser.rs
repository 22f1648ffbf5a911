use serde_json::{Map, Value};

use crate::{Model, SchemaError, SerializeError, Skip, registry::schema_of};

/// Produces the wire value of `value`, in declaration order.
pub fn serialize<T: Model>(value: &T) -> Result<Value, SerializeError> {
    Ok(serialize_value(value)?)
}

pub(crate) fn serialize_value<T: Model>(value: &T) -> Result<Value, SchemaError> {
    let schema = schema_of::<T>()?;
    let mut encoded = Map::new();
    for property in schema.properties() {
        if property.skips(Skip::Serialize) {
            continue;
        }
        if let Some(wire_value) = property.extract(value)? {
            encoded.insert(property.wire_name().to_string(), wire_value);
        }
    }
    Ok(Value::Object(encoded))
}
