//! # tablecrud
//!
//! Pick a table, view its rows, and insert, update or delete rows through
//! input forms. Table and column names come from live schema metadata and
//! every write runs in its own transaction.

pub mod cli;
pub mod cli_handlers;
pub mod controller;
pub mod db;
pub mod error;
pub mod form;
pub mod models;
pub mod output;
pub mod shell;
pub mod sql;
pub mod store;

pub use controller::{Command, Outcome, TableController};
pub use db::{DbPath, SqliteStore};
pub use error::{CrudError, Result};
pub use form::InputForm;
pub use models::*;
pub use store::DataStore;
