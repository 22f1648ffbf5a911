use dbc_schema::DeserializeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("No data available")]
    NoDataAvailable,
    #[error("Expecting 'content-type: {expected}', found 'content-type: {found}'")]
    ContentTypeMismatch { expected: String, found: String },
    #[error("body of {size} bytes exceeds the limit of {limit} bytes")]
    BodyTooLarge { size: usize, limit: usize },
    #[error("body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("expected a JSON array, found {found}")]
    ExpectedArray { found: &'static str },
    #[error(transparent)]
    Deserialize(#[from] DeserializeError),
    #[error("table decode failed: {0}")]
    Table(#[from] TableDecodeError),
}

#[derive(Debug, Error)]
pub enum TableDecodeError {
    #[error("invalid CBOR table document: {0}")]
    Cbor(#[from] serde_cbor::Error),
    #[error("column '{name}' appears more than once")]
    DuplicateColumn { name: String },
    #[error("column '{name}' has {found} values, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        found: usize,
    },
}
