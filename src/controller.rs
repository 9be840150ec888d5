//! Sequencing of user-facing operations against a [`DataStore`].
//!
//! Each operation runs `Idle -> CollectingInput -> Validating -> Submitting
//! -> Idle`. Any attempted mutation, successful or not, ends by reloading
//! the displayed rows so the view always matches what is persisted.

use crate::error::{CrudError, Result};
use crate::form::InputForm;
use crate::models::{FieldSpec, OperationState, PrimaryKeyValue, TableHandle, TableView};
use crate::store::DataStore;
use tracing::{debug, warn};

/// One user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadTables,
    LoadRows { table: String },
    AddRow { table: String },
    UpdateRow { table: String, selection: Option<usize> },
    DeleteRow { table: String, selection: Option<usize> },
}

/// What a dispatched command did, ready to show the user
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Tables(Vec<String>),
    Rows { table: String, count: usize },
    Inserted(PrimaryKeyValue),
    Updated(PrimaryKeyValue),
    Deleted(PrimaryKeyValue),
    Cancelled,
    Failed { kind: &'static str, message: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    /// One-line status text.
    pub fn message(&self) -> String {
        match self {
            Outcome::Tables(tables) => format!("{} tables", tables.len()),
            Outcome::Rows { table, count } => format!("{table}: {count} rows"),
            Outcome::Inserted(key) => format!("Row added with key {key}"),
            Outcome::Updated(key) => format!("Row {key} updated"),
            Outcome::Deleted(key) => format!("Row deleted with key {key}"),
            Outcome::Cancelled => "Cancelled".to_string(),
            Outcome::Failed { message, .. } => message.clone(),
        }
    }
}

/// Orchestrates the table view over a data store
pub struct TableController<S: DataStore> {
    store: S,
    state: OperationState,
    tables: Vec<String>,
    view: Option<TableView>,
}

impl<S: DataStore> TableController<S> {
    pub fn new(store: S) -> Self {
        TableController {
            store,
            state: OperationState::Idle,
            tables: Vec::new(),
            view: None,
        }
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// The displayed grid, if a table is loaded.
    pub fn view(&self) -> Option<&TableView> {
        self.view.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn transition(&mut self, next: OperationState) {
        debug!(from = %self.state, to = %next, "operation state");
        self.state = next;
    }

    // ==================== Reads ====================

    /// Refresh the selectable table list from the live schema.
    pub fn load_tables(&mut self) -> Result<&[String]> {
        self.tables = self.store.list_tables()?;
        Ok(&self.tables)
    }

    /// Load header and rows for `table` into the view.
    ///
    /// On failure the view is cleared rather than left showing old rows.
    pub fn load_rows(&mut self, table: &str) -> Result<&TableView> {
        match self.fetch_view(table) {
            Ok(view) => Ok(&*self.view.insert(view)),
            Err(e) => {
                self.view = None;
                Err(e)
            }
        }
    }

    fn fetch_view(&mut self, table: &str) -> Result<TableView> {
        let handle = self.store.describe_table(table)?;
        match handle.primary_key_count() {
            1 => {}
            0 => {
                return Err(CrudError::Schema(format!(
                    "table '{table}' has no primary key column"
                )))
            }
            n => {
                return Err(CrudError::Schema(format!(
                    "table '{table}' reports {n} primary key columns"
                )))
            }
        }
        let rows = self.store.read_all(table)?;
        if let Some(bad) = rows.iter().find(|r| r.len() != handle.columns.len()) {
            return Err(CrudError::Schema(format!(
                "row has {} cells but '{table}' has {} columns",
                bad.len(),
                handle.columns.len()
            )));
        }
        debug!(table, rows = rows.len(), "rows loaded");
        Ok(TableView {
            table: handle,
            rows,
        })
    }

    // ==================== Mutations ====================

    /// Collect a new row and insert it. `Ok(None)` means the user cancelled.
    pub fn add_row<F: InputForm + ?Sized>(
        &mut self,
        table: &str,
        form: &mut F,
    ) -> Result<Option<PrimaryKeyValue>> {
        let result = self.run_add(table, form);
        self.finish(table, result)
    }

    fn run_add<F: InputForm + ?Sized>(
        &mut self,
        table: &str,
        form: &mut F,
    ) -> Result<Option<PrimaryKeyValue>> {
        self.transition(OperationState::CollectingInput);
        let handle = self.store.describe_table(table)?;
        let fields: Vec<FieldSpec> = handle
            .input_columns()
            .map(|c| FieldSpec {
                name: c.name.clone(),
                current: None,
                required: c.is_required() || c.is_primary_key,
            })
            .collect();

        let Some(answers) = form.collect_values(&format!("Add row to {table}"), &fields)? else {
            return Ok(None);
        };

        let (columns, values) = self.validate(&fields, answers)?;
        self.transition(OperationState::Submitting);
        self.store.insert(table, &columns, &values).map(Some)
    }

    /// Edit the selected row. `Ok(None)` means the user cancelled.
    pub fn update_row<F: InputForm + ?Sized>(
        &mut self,
        table: &str,
        selection: Option<usize>,
        form: &mut F,
    ) -> Result<Option<PrimaryKeyValue>> {
        let result = self.run_update(table, selection, form);
        self.finish(table, result)
    }

    fn run_update<F: InputForm + ?Sized>(
        &mut self,
        table: &str,
        selection: Option<usize>,
        form: &mut F,
    ) -> Result<Option<PrimaryKeyValue>> {
        self.transition(OperationState::CollectingInput);
        let (pk_column, pk_value) = self.selected_key(table, selection)?;
        let handle = self.store.describe_table(table)?;
        if handle.primary_key().map(|c| c.name.as_str()) != Some(pk_column.as_str()) {
            return Err(CrudError::Schema(format!(
                "primary key of '{table}' changed since it was loaded"
            )));
        }

        let fields = self.seeded_fields(&handle, selection.unwrap_or_default());
        let Some(answers) = form.collect_values(&format!("Update row {pk_value} in {table}"), &fields)?
        else {
            return Ok(None);
        };

        let (columns, values) = self.validate(&fields, answers)?;
        self.transition(OperationState::Submitting);
        if columns.is_empty() {
            debug!(table, key = %pk_value, "no fields changed");
            return Ok(Some(pk_value));
        }
        self.store
            .update(table, &pk_column, &pk_value, &columns, &values)?;
        Ok(Some(pk_value))
    }

    /// Delete the selected row and return its key.
    pub fn delete_row(&mut self, table: &str, selection: Option<usize>) -> Result<PrimaryKeyValue> {
        let result = self.run_delete(table, selection).map(Some);
        self.finish(table, result)?
            .ok_or_else(|| CrudError::Query("delete produced no key".to_string()))
    }

    fn run_delete(&mut self, table: &str, selection: Option<usize>) -> Result<PrimaryKeyValue> {
        let (pk_column, pk_value) = self.selected_key(table, selection)?;
        self.transition(OperationState::Submitting);
        self.store.delete(table, &pk_column, &pk_value)
    }

    /// Key column and value of the selected row in the displayed grid.
    fn selected_key(
        &self,
        table: &str,
        selection: Option<usize>,
    ) -> Result<(String, PrimaryKeyValue)> {
        let index = selection.ok_or(CrudError::NoSelection)?;
        let view = self
            .view
            .as_ref()
            .filter(|v| v.table.name == table)
            .ok_or(CrudError::NoSelection)?;
        if view.row(index).is_none() {
            return Err(CrudError::NoSelection);
        }
        let pk_column = view
            .table
            .primary_key()
            .map(|c| c.name.clone())
            .ok_or_else(|| CrudError::Schema(format!("table '{table}' has no primary key")))?;
        let pk_value = view.primary_key_of(index).ok_or_else(|| {
            CrudError::Schema(format!("selected row has no value in '{pk_column}'"))
        })?;
        Ok((pk_column, pk_value))
    }

    /// Editable fields seeded with the displayed row's cell text.
    fn seeded_fields(&self, handle: &TableHandle, index: usize) -> Vec<FieldSpec> {
        let view = self.view.as_ref();
        handle
            .input_columns()
            .map(|c| FieldSpec {
                name: c.name.clone(),
                current: view.and_then(|v| {
                    let column = v.table.index_of(&c.name)?;
                    v.row(index)?.text(column)
                }),
                required: c.is_required() || c.is_primary_key,
            })
            .collect()
    }

    /// Keep only the fields whose answer differs from the seed (a missing
    /// seed reads as empty). A changed field that is required must not be
    /// blank; a changed optional field answered with nothing becomes NULL.
    ///
    /// Fields left as seeded are not written, so the stored value keeps its
    /// type. A required field with no seed only occurs when adding, and an
    /// empty answer there is rejected.
    fn validate(
        &mut self,
        fields: &[FieldSpec],
        answers: Vec<String>,
    ) -> Result<(Vec<String>, Vec<Option<String>>)> {
        self.transition(OperationState::Validating);
        if answers.len() != fields.len() {
            return Err(CrudError::Query(format!(
                "form returned {} values for {} fields",
                answers.len(),
                fields.len()
            )));
        }
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (field, answer) in fields.iter().zip(answers) {
            let seed = field.current.as_deref().unwrap_or_default();
            if answer == seed {
                if field.required && field.current.is_none() {
                    return Err(CrudError::Validation(field.name.clone()));
                }
                continue;
            }
            if field.required && answer.trim().is_empty() {
                return Err(CrudError::Validation(field.name.clone()));
            }
            columns.push(field.name.clone());
            values.push((!answer.is_empty()).then_some(answer));
        }
        Ok((columns, values))
    }

    /// Return to `Idle`; reload unless the user cancelled.
    fn finish<T>(&mut self, table: &str, result: Result<Option<T>>) -> Result<Option<T>> {
        if let Ok(None) = result {
            self.transition(OperationState::Cancelled);
            self.transition(OperationState::Idle);
            return Ok(None);
        }
        let refreshed = self.load_rows(table).map(|_| ());
        self.transition(OperationState::Idle);
        match (result, refreshed) {
            (Err(e), refreshed) => {
                if let Err(reload) = refreshed {
                    warn!(table, error = %reload, "reload after failed operation also failed");
                }
                Err(e)
            }
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(reload)) => Err(reload),
        }
    }

    // ==================== Dispatch ====================

    /// Run one command; errors are reported in the outcome, never returned.
    pub fn dispatch<F: InputForm + ?Sized>(&mut self, command: Command, form: &mut F) -> Outcome {
        let result = match command {
            Command::LoadTables => self.load_tables().map(|t| Outcome::Tables(t.to_vec())),
            Command::LoadRows { table } => self.load_rows(&table).map(|v| Outcome::Rows {
                count: v.rows.len(),
                table,
            }),
            Command::AddRow { table } => self
                .add_row(&table, form)
                .map(|key| key.map_or(Outcome::Cancelled, Outcome::Inserted)),
            Command::UpdateRow { table, selection } => self
                .update_row(&table, selection, form)
                .map(|key| key.map_or(Outcome::Cancelled, Outcome::Updated)),
            Command::DeleteRow { table, selection } => {
                self.delete_row(&table, selection).map(Outcome::Deleted)
            }
        };
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "operation failed");
                self.state = OperationState::Idle;
                Outcome::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        }
    }
}
