use crate::controller::TableController;
use crate::db::{DbPath, SqliteStore};
use crate::error::{CrudError, Result};
use crate::form::{InputForm, PresetForm, PromptForm};
use crate::output;
use crate::shell::Shell;
use std::io;

fn open_controller(db: &DbPath) -> Result<TableController<SqliteStore>> {
    // Opening a missing file would silently create an empty database
    if !db.exists() {
        return Err(CrudError::NotInitialized);
    }
    Ok(TableController::new(SqliteStore::open_path(db)?))
}

/// `--set` values when given, otherwise prompt on the terminal.
fn form_for(set: &[String]) -> Result<Box<dyn InputForm>> {
    if set.is_empty() {
        Ok(Box::new(PromptForm::new(io::stdin().lock(), io::stdout())))
    } else {
        Ok(Box::new(PresetForm::parse(set)?))
    }
}

/// Handle the init command
pub fn handle_init(db: &DbPath) -> Result<()> {
    if db.exists() {
        return Err(CrudError::AlreadyInitialized);
    }

    let store = SqliteStore::open_path(db)?;
    store.init_demo()?;

    println!("Initialized database {}", db.as_path().display());
    println!("  - Created table: items");

    Ok(())
}

/// Handle the tables command
pub fn handle_tables(db: &DbPath, json: bool) -> Result<()> {
    let mut controller = open_controller(db)?;
    let tables = controller.load_tables()?;

    if json {
        println!("{}", output::tables_json(tables)?);
    } else {
        println!("{}", output::render_tables(tables));
    }
    Ok(())
}

/// Handle the show command
pub fn handle_show(db: &DbPath, table: &str, json: bool) -> Result<()> {
    let mut controller = open_controller(db)?;
    let view = controller.load_rows(table)?;

    if json {
        println!("{}", output::grid_json(view)?);
    } else {
        println!("{}", output::render_grid(view));
    }
    Ok(())
}

/// Handle the add command
pub fn handle_add(db: &DbPath, table: &str, set: &[String]) -> Result<()> {
    let mut controller = open_controller(db)?;
    let mut form = form_for(set)?;

    match controller.add_row(table, form.as_mut())? {
        Some(key) => println!("Added row with key {key}"),
        None => println!("Cancelled"),
    }
    Ok(())
}

/// Handle the update command
pub fn handle_update(db: &DbPath, table: &str, row: usize, set: &[String]) -> Result<()> {
    let mut controller = open_controller(db)?;
    // Selection refers to the grid as `show` prints it
    controller.load_rows(table)?;
    let mut form = form_for(set)?;

    match controller.update_row(table, row.checked_sub(1), form.as_mut())? {
        Some(key) => println!("Updated row with key {key}"),
        None => println!("Cancelled"),
    }
    Ok(())
}

/// Handle the delete command
pub fn handle_delete(db: &DbPath, table: &str, row: usize) -> Result<()> {
    let mut controller = open_controller(db)?;
    controller.load_rows(table)?;

    let key = controller.delete_row(table, row.checked_sub(1))?;
    println!("Deleted row with key {key}");
    Ok(())
}

/// Handle the shell command
pub fn handle_shell(db: &DbPath) -> Result<()> {
    let controller = open_controller(db)?;
    let mut shell = Shell::new(controller);
    shell.run(io::stdin().lock(), io::stdout())
}
