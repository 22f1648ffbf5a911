//! Typed decoding of transport responses: a content type and a raw body,
//! checked and handed to the schema deserializer or a table decoder.

mod config;
mod envelope;
mod error;
mod table;

pub use config::{DEFAULT_JSON_CONTENT_TYPE, DEFAULT_MAX_BODY_SIZE, EnvelopeConfig};
pub use envelope::{Body, ResourceEnvelope};
pub use error::{EnvelopeError, TableDecodeError};
pub use table::{CBOR_TABLE_CONTENT_TYPE, CborTableDecoder, Column, Table, TableDecoder};
