//! Declarative wire schemas: field declarations, format validators, and the
//! deserializer/serializer that walk JSON values against them.

pub mod codec;
mod de;
mod error;
mod field;
pub mod format;
mod path;
mod registry;
mod ser;

pub use codec::Codec;
pub use de::{deserialize, deserialize_at, deserialize_into};
pub use error::{DeserializeError, SchemaError, SerializeError};
pub use field::{FieldDecl, FieldType, PropertyDecl, Skip};
pub use format::{EnumFormat, Format, NamedPattern};
pub use path::{FieldPath, PathSegment};
pub use registry::{Model, Property, Schema, SchemaBuilder, schema_of};
pub use ser::serialize;

#[cfg(test)]
mod tests;
