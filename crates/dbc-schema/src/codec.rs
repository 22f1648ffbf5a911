//! Typed value codecs. A codec pairs a [`FieldDecl`] with the functions that
//! turn a raw JSON value into a Rust value and back.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::{
    DeserializeError, FieldDecl, FieldPath, FieldType, Format, Model, SchemaError, de, ser,
};

type DecodeFn<V> =
    dyn Fn(&FieldDecl, &Value, &FieldPath) -> Result<V, DeserializeError> + Send + Sync;
type EncodeFn<V> = dyn Fn(&FieldDecl, &V) -> Result<Option<Value>, SchemaError> + Send + Sync;

// The only string shape accepted for integer properties.
static INTEGER_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("integer literal pattern must compile"));

pub struct Codec<V> {
    decl: FieldDecl,
    decode: Arc<DecodeFn<V>>,
    encode: Arc<EncodeFn<V>>,
}

impl<V> Clone for Codec<V> {
    fn clone(&self) -> Self {
        Self {
            decl: self.decl.clone(),
            decode: Arc::clone(&self.decode),
            encode: Arc::clone(&self.encode),
        }
    }
}

impl<V: 'static> Codec<V> {
    /// Builds a codec from raw functions. Both receive the declaration in
    /// effect for the property, which may carry options set after the codec
    /// was created.
    pub fn new<D, E>(decl: FieldDecl, decode: D, encode: E) -> Self
    where
        D: Fn(&FieldDecl, &Value, &FieldPath) -> Result<V, DeserializeError>
            + Send
            + Sync
            + 'static,
        E: Fn(&FieldDecl, &V) -> Result<Option<Value>, SchemaError> + Send + Sync + 'static,
    {
        Self {
            decl,
            decode: Arc::new(decode),
            encode: Arc::new(encode),
        }
    }

    pub fn decl(&self) -> &FieldDecl {
        &self.decl
    }

    pub fn format(mut self, format: Format) -> Self {
        self.decl.format = Some(format);
        self
    }

    pub fn trim(mut self) -> Self {
        self.decl.trim = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.decl.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.decl.max = Some(max);
        self
    }

    pub fn decode(&self, raw: &Value, path: &FieldPath) -> Result<V, DeserializeError> {
        self.decode_with(&self.decl, raw, path)
    }

    pub fn encode(&self, value: &V) -> Result<Option<Value>, SchemaError> {
        self.encode_with(&self.decl, value)
    }

    pub(crate) fn decode_with(
        &self,
        decl: &FieldDecl,
        raw: &Value,
        path: &FieldPath,
    ) -> Result<V, DeserializeError> {
        (self.decode)(decl, raw, path)
    }

    pub(crate) fn encode_with(
        &self,
        decl: &FieldDecl,
        value: &V,
    ) -> Result<Option<Value>, SchemaError> {
        (self.encode)(decl, value)
    }

    /// Maps decoded values into another Rust type. A refused conversion is
    /// reported as an invalid value for the property.
    pub fn convert<U, F, G>(self, into: F, from: G) -> Codec<U>
    where
        U: 'static,
        F: Fn(V) -> Result<U, String> + Send + Sync + 'static,
        G: Fn(&U) -> V + Send + Sync + 'static,
    {
        let decl = self.decl.clone();
        let inner_decode = Arc::clone(&self.decode);
        let inner_encode = Arc::clone(&self.encode);
        Codec::new(
            decl,
            move |decl, raw, path| {
                let value = inner_decode(decl, raw, path)?;
                into(value).map_err(|_| invalid_value(decl, raw, path))
            },
            move |decl, value| inner_encode(decl, &from(value)),
        )
    }
}

pub fn string() -> Codec<String> {
    Codec::new(
        FieldDecl::new(FieldType::String),
        |decl, raw, path| {
            let Value::String(text) = raw else {
                return Err(type_mismatch(decl, raw, path));
            };
            let text = if decl.trim {
                text.trim().to_string()
            } else {
                text.clone()
            };
            if let Some(format) = &decl.format {
                if !format.validate(&text) {
                    return Err(DeserializeError::InvalidPropertyValue {
                        path: path.to_string(),
                        value: text,
                        expected_format: format.name().map(str::to_string),
                    });
                }
            }
            Ok(text)
        },
        |_, value| Ok(Some(Value::String(value.clone()))),
    )
}

/// Integer property backed by any integer type that fits the wire range.
pub fn integer<I>() -> Codec<I>
where
    I: TryFrom<i64> + Into<Number> + Copy + Send + Sync + 'static,
{
    Codec::new(
        FieldDecl::new(FieldType::Integer),
        |decl, raw, path| {
            let value = integer_value(decl, raw, path)?;
            check_range(decl, value as f64, raw, path)?;
            I::try_from(value).map_err(|_| invalid_value(decl, raw, path))
        },
        |_, value| Ok(Some(Value::Number((*value).into()))),
    )
}

pub fn float() -> Codec<f64> {
    Codec::new(
        FieldDecl::new(FieldType::Float),
        |decl, raw, path| {
            let Some(value) = raw.as_f64() else {
                return Err(type_mismatch(decl, raw, path));
            };
            check_range(decl, value, raw, path)?;
            Ok(value)
        },
        |_, value| Ok(Some(Number::from_f64(*value).map_or(Value::Null, Value::Number))),
    )
}

pub fn boolean() -> Codec<bool> {
    Codec::new(
        FieldDecl::new(FieldType::Boolean),
        |decl, raw, path| raw.as_bool().ok_or_else(|| type_mismatch(decl, raw, path)),
        |_, value| Ok(Some(Value::Bool(*value))),
    )
}

/// RFC 3339 timestamps, or integer milliseconds since the Unix epoch.
pub fn datetime() -> Codec<DateTime<Utc>> {
    Codec::new(
        FieldDecl::new(FieldType::DateTime),
        |decl, raw, path| {
            let parsed = match raw {
                Value::String(text) => DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|value| value.with_timezone(&Utc)),
                Value::Number(number) => number
                    .as_i64()
                    .and_then(DateTime::<Utc>::from_timestamp_millis),
                _ => return Err(type_mismatch(decl, raw, path)),
            };
            parsed.ok_or_else(|| DeserializeError::InvalidPropertyValue {
                path: path.to_string(),
                value: render(raw),
                expected_format: Some("date-time".into()),
            })
        },
        |_, value| {
            Ok(Some(Value::String(
                value.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            )))
        },
    )
}

/// Nested model built from its `Default` value. The model's schema is
/// resolved on first use, so a model may nest itself.
pub fn object<M: Model>() -> Codec<M> {
    object_with(M::default)
}

/// Nested model built from `factory` instead of `Default`.
pub fn object_with<M: Model>(factory: fn() -> M) -> Codec<M> {
    let mut decl = FieldDecl::new(FieldType::Object);
    decl.target = Some(std::any::type_name::<M>());
    Codec::new(
        decl,
        move |_, raw, path| de::deserialize_into(factory(), raw, path),
        |_, value| ser::serialize_value(value).map(Some),
    )
}

pub fn array<V: 'static>(item: Codec<V>) -> Codec<Vec<V>> {
    let mut decl = FieldDecl::new(FieldType::Array);
    decl.items = Some(Box::new(item.decl.clone()));
    let decode_item = item.clone();
    Codec::new(
        decl,
        move |decl, raw, path| {
            let Value::Array(elements) = raw else {
                return Err(type_mismatch(decl, raw, path));
            };
            let item_decl = decl.items().unwrap_or(&decode_item.decl);
            elements
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    decode_item.decode_with(item_decl, element, &path.index(index))
                })
                .collect()
        },
        move |decl, values: &Vec<V>| {
            let item_decl = decl.items().unwrap_or(&item.decl);
            let mut encoded = Vec::with_capacity(values.len());
            for value in values {
                encoded.push(item.encode_with(item_decl, value)?.unwrap_or(Value::Null));
            }
            Ok(Some(Value::Array(encoded)))
        },
    )
}

/// String-keyed map; keys pass through unchanged.
pub fn record<V: 'static>(item: Codec<V>) -> Codec<IndexMap<String, V>> {
    let mut decl = FieldDecl::new(FieldType::Record);
    decl.items = Some(Box::new(item.decl.clone()));
    let decode_item = item.clone();
    Codec::new(
        decl,
        move |decl, raw, path| {
            let Value::Object(entries) = raw else {
                return Err(type_mismatch(decl, raw, path));
            };
            let item_decl = decl.items().unwrap_or(&decode_item.decl);
            entries
                .iter()
                .map(|(key, value)| {
                    decode_item
                        .decode_with(item_decl, value, &path.key(key.as_str()))
                        .map(|decoded| (key.clone(), decoded))
                })
                .collect()
        },
        move |decl, entries: &IndexMap<String, V>| {
            let item_decl = decl.items().unwrap_or(&item.decl);
            let mut encoded = Map::new();
            for (key, value) in entries {
                let value = item.encode_with(item_decl, value)?.unwrap_or(Value::Null);
                encoded.insert(key.clone(), value);
            }
            Ok(Some(Value::Object(encoded)))
        },
    )
}

/// Accepts `null` as `None`; `None` is omitted when serializing.
pub fn optional<V: 'static>(inner: Codec<V>) -> Codec<Option<V>> {
    let mut decl = inner.decl.clone();
    decl.nullable = true;
    let decode_inner = inner.clone();
    Codec::new(
        decl,
        move |decl, raw, path| match raw {
            Value::Null => Ok(None),
            other => decode_inner.decode_with(decl, other, path).map(Some),
        },
        move |decl, value| match value {
            Some(value) => inner.encode_with(decl, value),
            None => Ok(None),
        },
    )
}

fn integer_value(decl: &FieldDecl, raw: &Value, path: &FieldPath) -> Result<i64, DeserializeError> {
    match raw {
        Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                return Ok(value);
            }
            match number.as_f64() {
                Some(value)
                    if value.fract() == 0.0
                        && value >= i64::MIN as f64
                        && value < i64::MAX as f64 =>
                {
                    Ok(value as i64)
                }
                _ => Err(invalid_value(decl, raw, path)),
            }
        }
        Value::String(text) if INTEGER_LITERAL.is_match(text) => text
            .parse::<i64>()
            .map_err(|_| invalid_value(decl, raw, path)),
        Value::String(_) => Err(invalid_value(decl, raw, path)),
        _ => Err(type_mismatch(decl, raw, path)),
    }
}

fn check_range(
    decl: &FieldDecl,
    value: f64,
    raw: &Value,
    path: &FieldPath,
) -> Result<(), DeserializeError> {
    let below = decl.min.is_some_and(|min| value < min);
    let above = decl.max.is_some_and(|max| value > max);
    if below || above {
        Err(invalid_value(decl, raw, path))
    } else {
        Ok(())
    }
}

fn invalid_value(decl: &FieldDecl, raw: &Value, path: &FieldPath) -> DeserializeError {
    DeserializeError::InvalidPropertyValue {
        path: path.to_string(),
        value: render(raw),
        expected_format: decl
            .format
            .as_ref()
            .and_then(Format::name)
            .map(str::to_string),
    }
}

fn type_mismatch(decl: &FieldDecl, raw: &Value, path: &FieldPath) -> DeserializeError {
    DeserializeError::TypeMismatch {
        path: path.to_string(),
        expected: decl.ty,
        found: value_kind(raw),
    }
}

/// JSON kind name used in type-mismatch messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
