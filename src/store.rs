//! The data-access seam the controller talks to.

use crate::error::Result;
use crate::models::{PrimaryKeyValue, RowRecord, TableHandle};

/// All communication with the relational backend.
///
/// Table and column names are checked against the live schema before any
/// statement is built; values are always bound. Writes are atomic: a failed
/// write is rolled back before the error is returned.
pub trait DataStore {
    /// Names of user tables, sorted.
    fn list_tables(&mut self) -> Result<Vec<String>>;

    /// Ordered column names from schema metadata.
    ///
    /// Unknown table is a schema error; unreadable metadata gives an empty list.
    fn list_columns(&mut self, table: &str) -> Result<Vec<String>>;

    /// The single primary-key column from key-constraint metadata.
    fn find_primary_key_column(&mut self, table: &str) -> Result<Option<String>>;

    /// Full column descriptors, key column guaranteed present exactly once.
    fn describe_table(&mut self, table: &str) -> Result<TableHandle>;

    /// Every row, cells in `describe_table` order.
    fn read_all(&mut self, table: &str) -> Result<Vec<RowRecord>>;

    fn insert(
        &mut self,
        table: &str,
        columns: &[String],
        values: &[Option<String>],
    ) -> Result<PrimaryKeyValue>;

    fn update(
        &mut self,
        table: &str,
        pk_column: &str,
        pk_value: &PrimaryKeyValue,
        columns: &[String],
        values: &[Option<String>],
    ) -> Result<()>;

    /// Returns the key of the deleted row.
    fn delete(
        &mut self,
        table: &str,
        pk_column: &str,
        pk_value: &PrimaryKeyValue,
    ) -> Result<PrimaryKeyValue>;
}

/// Put `pk` in front of `columns` if metadata left it out, and drop any
/// repeated occurrence so it appears exactly once.
pub fn ensure_key_column(columns: &mut Vec<String>, pk: &str) {
    let mut seen = false;
    columns.retain(|c| {
        if c == pk {
            let keep = !seen;
            seen = true;
            keep
        } else {
            true
        }
    });
    if !seen {
        columns.insert(0, pk.to_string());
    }
}
