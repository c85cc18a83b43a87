//! Table descriptors persisted as statistic output data.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Key of the row-header pseudo column.
pub const ROW_HEADER_KEY: &str = "rowHeader";

/// A formatted table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Text(String),
    /// Serialized as `null`.
    Empty,
}

impl Cell {
    /// Null cells become empty strings.
    #[must_use]
    pub fn or_blank(self) -> Self {
        match self {
            Cell::Empty => Cell::Text(String::new()),
            other => other,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Integer(_) => false,
        }
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

/// A column header; group headers carry children instead of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHeader {
    pub header: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ColumnHeader>,
}

impl ColumnHeader {
    pub fn leaf(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            key: Some(key.into()),
            children: Vec::new(),
        }
    }

    pub fn group(header: impl Into<String>, children: Vec<ColumnHeader>) -> Self {
        Self {
            header: header.into(),
            key: None,
            children,
        }
    }

    /// The row-header pseudo column.
    pub fn row_header() -> Self {
        Self::leaf("", ROW_HEADER_KEY)
    }

    /// Leaf headers in display order.
    pub fn leaves(&self) -> Vec<&ColumnHeader> {
        if self.children.is_empty() {
            vec![self]
        } else {
            self.children.iter().flat_map(ColumnHeader::leaves).collect()
        }
    }
}

/// One table row: row-header labels followed by keyed cells.
///
/// Serializes as a flat object, `{ "rowHeader": [...], "<key>": cell, ... }`,
/// keeping the cell order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub row_header: Vec<String>,
    pub cells: Vec<(String, Cell)>,
}

impl Row {
    pub fn new<I, S>(row_header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            row_header: row_header.into_iter().map(Into::into).collect(),
            cells: Vec::new(),
        }
    }

    #[must_use]
    pub fn cell(mut self, key: impl Into<String>, value: impl Into<Cell>) -> Self {
        self.cells.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len() + 1))?;
        map.serialize_entry(ROW_HEADER_KEY, &self.row_header)?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table row object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Row, A::Error> {
                let mut row = Row::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key == ROW_HEADER_KEY {
                        row.row_header = map.next_value()?;
                    } else {
                        let cell: Cell = map.next_value()?;
                        row.cells.push((key, cell));
                    }
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// A display table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub title: String,
    pub column_headers: Vec<ColumnHeader>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(title: impl Into<String>, column_headers: Vec<ColumnHeader>) -> Self {
        Self {
            title: title.into(),
            column_headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keys of the data columns, in display order.
    pub fn data_keys(&self) -> Vec<&str> {
        self.column_headers
            .iter()
            .flat_map(ColumnHeader::leaves)
            .filter_map(|h| h.key.as_deref())
            .filter(|k| *k != ROW_HEADER_KEY)
            .collect()
    }

    /// Cell lookup by row index and column key.
    pub fn cell(&self, row: usize, key: &str) -> Option<&Cell> {
        self.rows.get(row)?.get(key)
    }
}

/// The `output_data` payload of one statistic record.
#[derive(Debug, Clone, Serialize)]
pub struct OutputData<'a> {
    pub tables: Vec<&'a Table>,
}

impl<'a> OutputData<'a> {
    pub fn single(table: &'a Table) -> Self {
        Self {
            tables: vec![table],
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Tables of a stored `output_data` payload.
    pub fn parse_tables(json: &str) -> serde_json::Result<Vec<Table>> {
        #[derive(Deserialize)]
        struct Stored {
            tables: Vec<Table>,
        }
        Ok(serde_json::from_str::<Stored>(json)?.tables)
    }
}
