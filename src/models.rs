use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single user-facing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    Idle,
    CollectingInput,
    Validating,
    Submitting,
    Cancelled,
}

impl OperationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationState::Idle => "idle",
            OperationState::CollectingInput => "collecting_input",
            OperationState::Validating => "validating",
            OperationState::Submitting => "submitting",
            OperationState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One column of a table, as reported by the live schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type, empty when the column has none
    pub decl_type: String,
    pub is_primary_key: bool,
    /// Value is assigned by the database (rowid alias)
    pub is_generated: bool,
    pub not_null: bool,
    pub has_default: bool,
}

impl ColumnDescriptor {
    /// A value must be supplied when inserting.
    pub fn is_required(&self) -> bool {
        self.not_null && !self.has_default && !self.is_generated
    }
}

/// A table and its ordered columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableHandle {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableHandle {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.is_primary_key)
    }

    pub fn primary_key_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_primary_key).count()
    }

    /// Columns the user fills in (everything the database does not assign).
    pub fn input_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.is_generated)
    }
}

/// A cell as stored, keeping its SQLite storage class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Display text; `None` for NULL. Blobs show their length only.
    pub fn text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Real(f) => Some(f.to_string()),
            CellValue::Text(t) => Some(t.clone()),
            CellValue::Blob(b) => Some(format!("<blob {} bytes>", b.len())),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

/// One row in column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    pub cells: Vec<CellValue>,
}

impl RowRecord {
    pub fn new(cells: Vec<CellValue>) -> Self {
        RowRecord { cells }
    }

    pub fn cell(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }

    /// Display text of a cell; `None` for NULL or out of range.
    pub fn text(&self, index: usize) -> Option<String> {
        self.cell(index).and_then(CellValue::text)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Value of a primary-key cell, bound with its stored type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryKeyValue(pub CellValue);

impl fmt::Display for PrimaryKeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.text() {
            Some(text) => write!(f, "{text}"),
            None => write!(f, "NULL"),
        }
    }
}

impl From<&str> for PrimaryKeyValue {
    fn from(s: &str) -> Self {
        PrimaryKeyValue(CellValue::from(s))
    }
}

impl From<i64> for PrimaryKeyValue {
    fn from(i: i64) -> Self {
        PrimaryKeyValue(CellValue::Integer(i))
    }
}

/// A loaded table: header plus grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub table: TableHandle,
    pub rows: Vec<RowRecord>,
}

impl TableView {
    pub fn header(&self) -> Vec<String> {
        self.table.column_names()
    }

    pub fn row(&self, index: usize) -> Option<&RowRecord> {
        self.rows.get(index)
    }

    /// Key of the row at `index`, looked up by the key column's name.
    pub fn primary_key_of(&self, index: usize) -> Option<PrimaryKeyValue> {
        let pk = self.table.primary_key()?;
        let column = self.table.index_of(&pk.name)?;
        match self.row(index)?.cell(column)? {
            CellValue::Null => None,
            cell => Some(PrimaryKeyValue(cell.clone())),
        }
    }
}

/// One input field offered to the form collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    /// Seed value shown to the user (update flow)
    pub current: Option<String>,
    pub required: bool,
}
