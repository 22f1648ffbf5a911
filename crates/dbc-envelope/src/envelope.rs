use dbc_schema::{FieldPath, Model, codec::value_kind, deserialize, deserialize_at};
use serde_json::Value;
use tracing::trace;

use crate::{EnvelopeConfig, EnvelopeError, Table, TableDecoder};

/// Raw response body as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Bytes(Vec<u8>),
}

impl Body {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Text(text) => text.as_bytes(),
            Body::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Body::Bytes(bytes.to_vec())
    }
}

/// Content type plus body of a single response, decoded on demand.
///
/// Every decode operation borrows the envelope, so the same envelope can be
/// decoded any number of times and into different targets.
#[derive(Debug, Clone)]
pub struct ResourceEnvelope {
    content_type: String,
    body: Option<Body>,
    config: EnvelopeConfig,
}

impl ResourceEnvelope {
    pub fn new(content_type: impl Into<String>, body: impl Into<Body>) -> Self {
        Self {
            content_type: content_type.into(),
            body: Some(body.into()),
            config: EnvelopeConfig::default(),
        }
    }

    /// Envelope for a response that carried no body at all.
    pub fn empty(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: None,
            config: EnvelopeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EnvelopeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Decodes a JSON object body into `T`.
    pub fn decode<T: Model>(&self) -> Result<T, EnvelopeError> {
        let value = self.json()?;
        Ok(deserialize(&value)?)
    }

    /// Decodes a JSON array body, one `T` per element. Element errors are
    /// reported under `[index]`.
    pub fn decode_array<T: Model>(&self) -> Result<Vec<T>, EnvelopeError> {
        let value = self.json()?;
        let Value::Array(elements) = &value else {
            return Err(EnvelopeError::ExpectedArray {
                found: value_kind(&value),
            });
        };
        let root = FieldPath::root();
        elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                deserialize_at(element, &root.index(index)).map_err(EnvelopeError::from)
            })
            .collect()
    }

    /// Body of a `text/*` response.
    pub fn text(&self) -> Result<&str, EnvelopeError> {
        let bytes = self.bytes()?;
        if !self.content_type.trim_start().to_ascii_lowercase().starts_with("text/") {
            return Err(self.mismatch("text/*"));
        }
        Ok(std::str::from_utf8(bytes)?)
    }

    /// Decodes a columnar body with `decoder`, which also names the content
    /// type the body must carry.
    pub fn table(&self, decoder: &dyn TableDecoder) -> Result<Table, EnvelopeError> {
        let bytes = self.bytes()?;
        let expected = decoder.content_type();
        if !same_media_type(&self.content_type, expected) {
            return Err(self.mismatch(expected));
        }
        trace!(content_type = expected, size = bytes.len(), "decoding table");
        Ok(decoder.decode(bytes)?)
    }

    fn json(&self) -> Result<Value, EnvelopeError> {
        let bytes = self.bytes()?;
        let expected = self.config.json_content_type.as_str();
        if !same_media_type(&self.content_type, expected) {
            return Err(self.mismatch(expected));
        }
        trace!(size = bytes.len(), "decoding JSON body");
        Ok(serde_json::from_slice(bytes)?)
    }

    fn bytes(&self) -> Result<&[u8], EnvelopeError> {
        let bytes = match &self.body {
            Some(body) if !body.is_empty() => body.as_bytes(),
            _ => return Err(EnvelopeError::NoDataAvailable),
        };
        if bytes.len() > self.config.max_body_size {
            return Err(EnvelopeError::BodyTooLarge {
                size: bytes.len(),
                limit: self.config.max_body_size,
            });
        }
        Ok(bytes)
    }

    fn mismatch(&self, expected: &str) -> EnvelopeError {
        EnvelopeError::ContentTypeMismatch {
            expected: expected.to_string(),
            found: self.content_type.clone(),
        }
    }
}

// Compares media types without parameters, e.g. `application/json; charset=utf-8`.
fn same_media_type(actual: &str, expected: &str) -> bool {
    essence(actual).eq_ignore_ascii_case(essence(expected))
}

fn essence(content_type: &str) -> &str {
    content_type
        .split_once(';')
        .map_or(content_type, |(essence, _)| essence)
        .trim()
}
