use crate::error::{CrudError, Result};
use crate::models::{CellValue, ColumnDescriptor, PrimaryKeyValue, RowRecord, TableHandle};
use crate::sql;
use crate::store::{ensure_key_column, DataStore};
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension, ToSql, Transaction};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Location of the database file
#[derive(Debug, Clone)]
pub struct DbPath {
    path: PathBuf,
}

impl DbPath {
    pub const DEFAULT_FILE: &'static str = "tablecrud.db";

    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Default for DbPath {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FILE)
    }
}

/// Raw `pragma_table_info` row
#[derive(Debug, Clone)]
struct ColumnInfo {
    name: String,
    decl_type: String,
    not_null: bool,
    has_default: bool,
    /// 1-based position within the primary key, 0 if not a key column
    pk: i64,
}

/// SQLite-backed data store; owns the only connection
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open database connection
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(SqliteStore { conn })
    }

    pub fn open_path(path: &DbPath) -> Result<Self> {
        debug!(path = %path.as_path().display(), "opening database");
        Self::open(path.as_path())
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(SqliteStore { conn })
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Create the demo `items` table.
    pub fn init_demo(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                qty INTEGER
            )",
            [],
        )?;
        Ok(())
    }

    fn is_known_table(&self, table: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master
                 WHERE type = 'table' AND name = ?1
                   AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'",
                [table],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn require_known(&self, table: &str) -> Result<()> {
        if !self.is_known_table(table)? {
            return Err(CrudError::unknown_table(table));
        }
        Ok(())
    }

    /// True when the table has a rowid. WITHOUT ROWID tables report their
    /// key as an index with origin 'pk'; rowid tables with an INTEGER key
    /// have no such index.
    fn has_rowid(&self, table: &str) -> rusqlite::Result<bool> {
        let pk_indexes: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pragma_index_list(?1) WHERE origin = 'pk'",
            [table],
            |row| row.get(0),
        )?;
        Ok(pk_indexes == 0)
    }

    fn column_info(&self, table: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type, \"notnull\", dflt_value IS NOT NULL, pk
             FROM pragma_table_info(?1)
             ORDER BY cid",
        )?;
        let rows = stmt.query_map([table], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                decl_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                not_null: row.get(2)?,
                has_default: row.get(3)?,
                pk: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    /// Resolve a write target and check the requested columns against it.
    fn write_target(
        &mut self,
        table: &str,
        columns: &[String],
        values: &[Option<String>],
    ) -> Result<(TableHandle, String)> {
        if !self.is_known_table(table)? {
            return Err(CrudError::Query(format!(
                "refusing to write to unknown table '{table}'"
            )));
        }
        if columns.len() != values.len() {
            return Err(CrudError::Query(format!(
                "{} columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        let handle = self.describe_known(table)?;
        for (i, column) in columns.iter().enumerate() {
            if handle.column(column).is_none() {
                return Err(CrudError::Schema(format!(
                    "table '{table}' has no column '{column}'"
                )));
            }
            if columns[..i].contains(column) {
                return Err(CrudError::Query(format!("column '{column}' given twice")));
            }
        }
        let pk = handle
            .primary_key()
            .map(|c| c.name.clone())
            .ok_or_else(|| CrudError::Schema(format!("table '{table}' has no primary key")))?;
        Ok((handle, pk))
    }

    fn check_key_column(table: &str, expected: &str, given: &str) -> Result<()> {
        if expected != given {
            return Err(CrudError::Schema(format!(
                "'{given}' is not the primary key of '{table}' (expected '{expected}')"
            )));
        }
        Ok(())
    }

    /// Run `f` in a transaction; commit on success, roll back on any error.
    fn write_tx<T, F>(&mut self, table: &str, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let tx = self.conn.transaction()?;
        match f(&tx) {
            Ok(value) => {
                tx.commit().map_err(write_failed(table))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(table, error = %rollback, "rollback failed");
                }
                debug!(table, error = %e, "write rolled back");
                Err(e)
            }
        }
    }

    /// Describe a table already checked against the schema.
    fn describe_known(&self, table: &str) -> Result<TableHandle> {
        let info = self.column_info(table)?;
        if info.is_empty() {
            return Err(CrudError::Schema(format!(
                "no column metadata for table '{table}'"
            )));
        }
        let pk = primary_key_in(table, &info)?;
        let mut names: Vec<String> = info.iter().map(|c| c.name.clone()).collect();
        if let Some(pk) = &pk {
            ensure_key_column(&mut names, pk);
        }
        // Sole INTEGER key of a rowid table is the rowid alias; SQLite assigns it.
        let rowid_alias = match &pk {
            Some(pk) => {
                info.iter()
                    .any(|c| &c.name == pk && c.decl_type.eq_ignore_ascii_case("INTEGER"))
                    && self.has_rowid(table)?
            }
            None => false,
        };

        let columns = names
            .into_iter()
            .map(|name| {
                let is_primary_key = pk.as_deref() == Some(name.as_str());
                match info.iter().find(|c| c.name == name) {
                    Some(c) => ColumnDescriptor {
                        is_primary_key,
                        is_generated: is_primary_key && rowid_alias,
                        not_null: c.not_null,
                        has_default: c.has_default,
                        decl_type: c.decl_type.clone(),
                        name,
                    },
                    None => ColumnDescriptor {
                        name,
                        decl_type: String::new(),
                        is_primary_key,
                        is_generated: false,
                        not_null: is_primary_key,
                        has_default: false,
                    },
                }
            })
            .collect();

        Ok(TableHandle {
            name: table.to_string(),
            columns,
        })
    }
}

/// The single constraint key among `info`; composite keys are refused.
fn primary_key_in(table: &str, info: &[ColumnInfo]) -> Result<Option<String>> {
    let mut keys: Vec<&ColumnInfo> = info.iter().filter(|c| c.pk > 0).collect();
    keys.sort_by_key(|c| c.pk);
    match keys.as_slice() {
        [] => Ok(None),
        [key] => Ok(Some(key.name.clone())),
        _ => Err(CrudError::Schema(format!(
            "table '{table}' has a composite primary key ({})",
            keys.iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

impl DataStore for SqliteStore {
    fn list_tables(&mut self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
             ORDER BY name",
        )?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
        names
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| e.into())
    }

    fn list_columns(&mut self, table: &str) -> Result<Vec<String>> {
        self.require_known(table)?;
        match self.column_info(table) {
            Ok(info) => Ok(info.into_iter().map(|c| c.name).collect()),
            Err(e) => {
                warn!(table, error = %e, "column metadata unavailable");
                Ok(Vec::new())
            }
        }
    }

    fn find_primary_key_column(&mut self, table: &str) -> Result<Option<String>> {
        self.require_known(table)?;
        primary_key_in(table, &self.column_info(table)?)
    }

    fn describe_table(&mut self, table: &str) -> Result<TableHandle> {
        self.require_known(table)?;
        self.describe_known(table)
    }

    fn read_all(&mut self, table: &str) -> Result<Vec<RowRecord>> {
        if !self.is_known_table(table)? {
            return Err(CrudError::Query(format!(
                "refusing to read unknown table '{table}'"
            )));
        }
        let handle = self.describe_known(table)?;
        let width = handle.columns.len();
        let sql = sql::select_all(&handle);
        debug!(table, %sql, "reading rows");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let cells = (0..width)
                .map(|i| row.get_ref(i).map(cell_value))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(RowRecord::new(cells))
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| e.into())
    }

    fn insert(
        &mut self,
        table: &str,
        columns: &[String],
        values: &[Option<String>],
    ) -> Result<PrimaryKeyValue> {
        let (_, pk) = self.write_target(table, columns, values)?;
        let sql = sql::insert(table, columns, &pk);
        debug!(table, %sql, "inserting row");

        let key = self.write_tx(table, |tx| {
            let key = tx
                .query_row(&sql, params_from_iter(values.iter()), |row| {
                    row.get_ref(0).map(cell_value)
                })
                .map_err(write_failed(table))?;
            if key.is_null() {
                return Err(CrudError::Schema(format!(
                    "insert into '{table}' produced a NULL key"
                )));
            }
            Ok(PrimaryKeyValue(key))
        })?;
        info!(table, key = %key, "row inserted");
        Ok(key)
    }

    fn update(
        &mut self,
        table: &str,
        pk_column: &str,
        pk_value: &PrimaryKeyValue,
        columns: &[String],
        values: &[Option<String>],
    ) -> Result<()> {
        let (_, pk) = self.write_target(table, columns, values)?;
        Self::check_key_column(table, &pk, pk_column)?;
        if columns.is_empty() {
            return Err(CrudError::Query("nothing to update".to_string()));
        }
        let sql = sql::update(table, &pk, columns);
        debug!(table, %sql, key = %pk_value, "updating row");

        self.write_tx(table, |tx| {
            let mut params: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
            params.push(pk_value);
            let changed = tx
                .execute(&sql, params.as_slice())
                .map_err(write_failed(table))?;
            if changed == 0 {
                return Err(not_found(table, &pk, pk_value));
            }
            Ok(())
        })?;
        info!(table, key = %pk_value, "row updated");
        Ok(())
    }

    fn delete(
        &mut self,
        table: &str,
        pk_column: &str,
        pk_value: &PrimaryKeyValue,
    ) -> Result<PrimaryKeyValue> {
        let (_, pk) = self.write_target(table, &[], &[])?;
        Self::check_key_column(table, &pk, pk_column)?;
        let sql = sql::delete(table, &pk);
        debug!(table, %sql, key = %pk_value, "deleting row");

        let deleted = self.write_tx(table, |tx| {
            let deleted = tx
                .query_row(&sql, [pk_value], |row| row.get_ref(0).map(cell_value))
                .optional()
                .map_err(write_failed(table))?;
            match deleted {
                Some(key) => Ok(PrimaryKeyValue(key)),
                None => Err(not_found(table, &pk, pk_value)),
            }
        })?;
        info!(table, key = %deleted, "row deleted");
        Ok(deleted)
    }
}

fn write_failed(table: &str) -> impl Fn(rusqlite::Error) -> CrudError + '_ {
    move |source| CrudError::Write {
        table: table.to_string(),
        source,
    }
}

fn not_found(table: &str, column: &str, key: &PrimaryKeyValue) -> CrudError {
    CrudError::NotFound {
        table: table.to_string(),
        column: column.to_string(),
        key: key.to_string(),
    }
}

fn cell_value(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Real(f),
        ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
    }
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
            CellValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            CellValue::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            CellValue::Text(t) => ToSqlOutput::Borrowed(ValueRef::Text(t.as_bytes())),
            CellValue::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_slice())),
        })
    }
}

impl ToSql for PrimaryKeyValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init_demo().unwrap();
        store
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn vals(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|s| Some(s.to_string())).collect()
    }

    fn widget_row(id: i64, name: &str, qty: i64) -> RowRecord {
        RowRecord::new(vec![
            CellValue::Integer(id),
            CellValue::from(name),
            CellValue::Integer(qty),
        ])
    }

    #[test]
    fn test_db_path_default() {
        let path = DbPath::default();
        assert_eq!(path.as_path(), Path::new("tablecrud.db"));
        assert!(!DbPath::new("definitely-missing.db").exists());

        let temp = tempfile::NamedTempFile::new().unwrap();
        assert!(DbPath::new(temp.path()).exists());
    }

    #[test]
    fn test_list_tables_skips_internal() {
        let mut store = store();
        store
            .conn()
            .execute("CREATE TABLE notes (code TEXT PRIMARY KEY, body TEXT)", [])
            .unwrap();
        // AUTOINCREMENT creates sqlite_sequence
        assert_eq!(store.list_tables().unwrap(), cols(&["items", "notes"]));
    }

    #[test]
    fn test_list_columns_in_declared_order() {
        let mut store = store();
        assert_eq!(
            store.list_columns("items").unwrap(),
            cols(&["id", "name", "qty"])
        );
    }

    #[test]
    fn test_list_columns_unknown_table() {
        let mut store = store();
        let result = store.list_columns("missing");
        assert!(matches!(result, Err(CrudError::Schema(_))));
    }

    #[test]
    fn test_primary_key_from_constraint() {
        let mut store = store();
        assert_eq!(
            store.find_primary_key_column("items").unwrap(),
            Some("id".to_string())
        );
    }

    #[test]
    fn test_primary_key_without_generator_still_found() {
        // A default-based lookup (auto-increment generator) would miss this
        // TEXT key; the constraint lookup finds it.
        let mut store = store();
        store
            .conn()
            .execute("CREATE TABLE notes (body TEXT, code TEXT PRIMARY KEY)", [])
            .unwrap();
        assert_eq!(
            store.find_primary_key_column("notes").unwrap(),
            Some("code".to_string())
        );
        let handle = store.describe_table("notes").unwrap();
        let code = handle.column("code").unwrap();
        assert!(code.is_primary_key);
        assert!(!code.is_generated);
    }

    #[test]
    fn test_primary_key_missing_and_composite() {
        let mut store = store();
        store
            .conn()
            .execute("CREATE TABLE loose (a TEXT, b TEXT)", [])
            .unwrap();
        store
            .conn()
            .execute(
                "CREATE TABLE pairs (a INTEGER, b INTEGER, PRIMARY KEY (a, b))",
                [],
            )
            .unwrap();
        assert_eq!(store.find_primary_key_column("loose").unwrap(), None);
        assert!(matches!(
            store.find_primary_key_column("pairs"),
            Err(CrudError::Schema(_))
        ));
    }

    #[test]
    fn test_describe_items() {
        let mut store = store();
        let handle = store.describe_table("items").unwrap();
        assert_eq!(handle.column_names(), cols(&["id", "name", "qty"]));
        assert_eq!(handle.primary_key_count(), 1);

        let id = handle.column("id").unwrap();
        assert!(id.is_primary_key && id.is_generated);
        let name = handle.column("name").unwrap();
        assert!(name.is_required());
        let qty = handle.column("qty").unwrap();
        assert!(!qty.is_required());
    }

    #[test]
    fn test_insert_read_delete_cycle() {
        let mut store = store();
        let key = store
            .insert("items", &cols(&["name", "qty"]), &vals(&["widget", "5"]))
            .unwrap();
        assert_eq!(key, PrimaryKeyValue::from(1_i64));
        assert_eq!(store.read_all("items").unwrap(), vec![widget_row(1, "widget", 5)]);

        let deleted = store.delete("items", "id", &key).unwrap();
        assert_eq!(deleted, key);
        assert!(store.read_all("items").unwrap().is_empty());

        let again = store.delete("items", "id", &key);
        assert!(matches!(again, Err(CrudError::NotFound { .. })));
    }

    #[test]
    fn test_generated_keys_are_distinct() {
        let mut store = store();
        let a = store
            .insert("items", &cols(&["name"]), &vals(&["a"]))
            .unwrap();
        let b = store
            .insert("items", &cols(&["name"]), &vals(&["b"]))
            .unwrap();
        assert_ne!(a, b);
        // NULL for the unset column
        assert_eq!(store.read_all("items").unwrap()[1].cell(2), Some(&CellValue::Null));
    }

    #[test]
    fn test_insert_constraint_violation_rolls_back() {
        let mut store = store();
        store
            .insert("items", &cols(&["name", "qty"]), &vals(&["widget", "5"]))
            .unwrap();
        let result = store.insert("items", &cols(&["name", "qty"]), &[None, Some("1".into())]);
        assert!(matches!(result, Err(CrudError::Write { .. })));
        assert_eq!(store.read_all("items").unwrap().len(), 1);
    }

    #[test]
    fn test_insert_value_is_bound_not_interpolated() {
        let mut store = store();
        let hostile = "x'); DROP TABLE items; --";
        store
            .insert("items", &cols(&["name"]), &vals(&[hostile]))
            .unwrap();
        let rows = store.read_all("items").unwrap();
        assert_eq!(rows[0].text(1).as_deref(), Some(hostile));
    }

    #[test]
    fn test_unknown_identifiers_rejected() {
        let mut store = store();
        assert!(matches!(
            store.read_all("items; DROP TABLE items"),
            Err(CrudError::Query(_))
        ));
        assert!(matches!(
            store.insert("nope", &cols(&["name"]), &vals(&["x"])),
            Err(CrudError::Query(_))
        ));
        assert!(matches!(
            store.insert("items", &cols(&["bogus"]), &vals(&["x"])),
            Err(CrudError::Schema(_))
        ));
        assert!(matches!(
            store.insert("items", &cols(&["name", "qty"]), &vals(&["x"])),
            Err(CrudError::Query(_))
        ));
        assert!(store.list_tables().unwrap().contains(&"items".to_string()));
    }

    #[test]
    fn test_update_row() {
        let mut store = store();
        let key = store
            .insert("items", &cols(&["name", "qty"]), &vals(&["widget", "5"]))
            .unwrap();
        store
            .update("items", "id", &key, &cols(&["name", "qty"]), &vals(&["gizmo", "7"]))
            .unwrap();
        assert_eq!(store.read_all("items").unwrap(), vec![widget_row(1, "gizmo", 7)]);
    }

    #[test]
    fn test_update_missing_key_is_noop() {
        let mut store = store();
        store
            .insert("items", &cols(&["name", "qty"]), &vals(&["widget", "5"]))
            .unwrap();
        let before = store.read_all("items").unwrap();
        let result = store.update(
            "items",
            "id",
            &PrimaryKeyValue::from(42_i64),
            &cols(&["name"]),
            &vals(&["ghost"]),
        );
        assert!(matches!(result, Err(CrudError::NotFound { .. })));
        assert_eq!(store.read_all("items").unwrap(), before);
    }

    #[test]
    fn test_update_rejects_wrong_key_column() {
        let mut store = store();
        let key = store
            .insert("items", &cols(&["name"]), &vals(&["widget"]))
            .unwrap();
        let result = store.update("items", "name", &key, &cols(&["qty"]), &vals(&["1"]));
        assert!(matches!(result, Err(CrudError::Schema(_))));
    }

    #[test]
    fn test_update_failure_leaves_row() {
        let mut store = store();
        let key = store
            .insert("items", &cols(&["name", "qty"]), &vals(&["widget", "5"]))
            .unwrap();
        let result = store.update("items", "id", &key, &cols(&["name"]), &[None]);
        assert!(matches!(result, Err(CrudError::Write { .. })));
        assert_eq!(store.read_all("items").unwrap(), vec![widget_row(1, "widget", 5)]);
    }

    #[test]
    fn test_text_key_table_cycle() {
        let mut store = store();
        store
            .conn()
            .execute("CREATE TABLE notes (code TEXT PRIMARY KEY, body TEXT)", [])
            .unwrap();
        let key = store
            .insert("notes", &cols(&["code", "body"]), &vals(&["a1", "hello"]))
            .unwrap();
        assert_eq!(key, PrimaryKeyValue::from("a1"));
        assert_eq!(
            store.delete("notes", "code", &key).unwrap(),
            PrimaryKeyValue::from("a1")
        );
    }

    #[test]
    fn test_blob_and_real_cells() {
        let mut store = store();
        store
            .conn()
            .execute(
                "CREATE TABLE samples (id INTEGER PRIMARY KEY, ratio REAL, raw BLOB)",
                [],
            )
            .unwrap();
        store
            .conn()
            .execute(
                "INSERT INTO samples (ratio, raw) VALUES (0.5, x'0102')",
                [],
            )
            .unwrap();
        let rows = store.read_all("samples").unwrap();
        assert_eq!(
            rows[0].cells,
            vec![
                CellValue::Integer(1),
                CellValue::Real(0.5),
                CellValue::Blob(vec![1, 2])
            ]
        );
        assert_eq!(rows[0].text(2).as_deref(), Some("<blob 2 bytes>"));
    }

    #[test]
    fn test_untyped_key_matched_by_storage_class() {
        let mut store = store();
        store
            .conn()
            .execute("CREATE TABLE tags (k PRIMARY KEY, label TEXT)", [])
            .unwrap();
        store
            .conn()
            .execute("INSERT INTO tags VALUES (1, 'one'), ('2', 'two')", [])
            .unwrap();
        let rows = store.read_all("tags").unwrap();
        let int_key = PrimaryKeyValue(rows[0].cells[0].clone());
        let text_key = PrimaryKeyValue(rows[1].cells[0].clone());
        assert_eq!(int_key, PrimaryKeyValue::from(1_i64));
        assert_eq!(text_key, PrimaryKeyValue::from("2"));

        store
            .update("tags", "k", &int_key, &cols(&["label"]), &vals(&["uno"]))
            .unwrap();
        assert_eq!(store.read_all("tags").unwrap()[0].text(1).as_deref(), Some("uno"));

        // A text '1' does not match the integer 1 in an untyped column
        let result = store.delete("tags", "k", &PrimaryKeyValue::from("1"));
        assert!(matches!(result, Err(CrudError::NotFound { .. })));

        assert_eq!(store.delete("tags", "k", &int_key).unwrap(), int_key);
        assert_eq!(store.delete("tags", "k", &text_key).unwrap(), text_key);
        assert!(store.read_all("tags").unwrap().is_empty());
    }

    #[test]
    fn test_without_rowid_integer_key_is_not_generated() {
        let mut store = store();
        store
            .conn()
            .execute(
                "CREATE TABLE slots (id INTEGER PRIMARY KEY, v TEXT) WITHOUT ROWID",
                [],
            )
            .unwrap();
        let handle = store.describe_table("slots").unwrap();
        let id = handle.column("id").unwrap();
        assert!(id.is_primary_key);
        assert!(!id.is_generated);

        let key = store
            .insert("slots", &cols(&["id", "v"]), &vals(&["7", "seven"]))
            .unwrap();
        assert_eq!(key, PrimaryKeyValue::from(7_i64));

        // Rowid tables keep the alias
        assert!(store.describe_table("items").unwrap().columns[0].is_generated);
    }

    #[test]
    fn test_update_preserves_untouched_blob() {
        let mut store = store();
        store
            .conn()
            .execute(
                "CREATE TABLE files (id INTEGER PRIMARY KEY, label TEXT, raw BLOB)",
                [],
            )
            .unwrap();
        store
            .conn()
            .execute("INSERT INTO files (label, raw) VALUES ('a', x'0102')", [])
            .unwrap();
        store
            .update(
                "files",
                "id",
                &PrimaryKeyValue::from(1_i64),
                &cols(&["label"]),
                &vals(&["b"]),
            )
            .unwrap();
        let (kind, len): (String, i64) = store
            .conn()
            .query_row("SELECT typeof(raw), length(raw) FROM files", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!((kind.as_str(), len), ("blob", 2));
    }
}
