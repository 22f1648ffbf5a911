//! In-memory columnar tables and the decoders that produce them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_cbor::value::Value as CborValue;
use serde_json::Value;

use crate::TableDecodeError;

/// Content type of the bundled CBOR table encoding.
pub const CBOR_TABLE_CONTENT_TYPE: &str = "application/vnd.dbc.table+cbor";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Named columns of equal length, in wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Vec<Value>>,
    num_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableDecodeError> {
        let num_rows = columns.first().map_or(0, |column| column.values.len());
        let mut table = IndexMap::with_capacity(columns.len());
        for Column { name, values } in columns {
            if values.len() != num_rows {
                return Err(TableDecodeError::RaggedColumn {
                    name,
                    expected: num_rows,
                    found: values.len(),
                });
            }
            if table.contains_key(&name) {
                return Err(TableDecodeError::DuplicateColumn { name });
            }
            table.insert(name, values);
        }
        Ok(Self {
            columns: table,
            num_rows,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Row `index` keyed by column name, or `None` past the last row.
    pub fn row(&self, index: usize) -> Option<IndexMap<&str, &Value>> {
        if index >= self.num_rows {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|(name, values)| (name.as_str(), &values[index]))
                .collect(),
        )
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
            .into_iter()
            .map(|(name, values)| Column { name, values })
            .collect()
    }
}

/// Decodes a binary body into a [`Table`]. Implementations name the content
/// type they accept; the envelope refuses any other.
pub trait TableDecoder {
    fn content_type(&self) -> &str;

    fn decode(&self, bytes: &[u8]) -> Result<Table, TableDecodeError>;
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableDocument {
    columns: Vec<Column>,
}

/// Tables carried as a CBOR `{ columns: [{ name, values }] }` document.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborTableDecoder;

impl CborTableDecoder {
    /// Encodes `table` the way [`CborTableDecoder::decode`] expects it,
    /// with a self-describe tag and map keys in canonical order.
    pub fn encode(table: &Table) -> Result<Vec<u8>, serde_cbor::Error> {
        let document = TableDocument {
            columns: table.clone().into_columns(),
        };
        let canonical: CborValue = serde_cbor::value::to_value(&document)?;
        let mut buf = Vec::with_capacity(256);
        let mut serializer = serde_cbor::ser::Serializer::new(&mut buf);
        serializer.self_describe()?;
        canonical.serialize(&mut serializer)?;
        Ok(buf)
    }
}

impl TableDecoder for CborTableDecoder {
    fn content_type(&self) -> &str {
        CBOR_TABLE_CONTENT_TYPE
    }

    fn decode(&self, bytes: &[u8]) -> Result<Table, TableDecodeError> {
        let document: TableDocument = serde_cbor::from_slice(bytes)?;
        Table::new(document.columns)
    }
}
