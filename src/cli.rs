use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tablecrud")]
#[command(about = "Browse and edit SQLite tables row by row")]
#[command(version)]
pub struct Cli {
    /// Database file
    #[arg(long, global = true, env = "TABLECRUD_DB", default_value = "tablecrud.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database with a demo `items` table
    Init,

    /// List tables
    Tables {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show every row of a table
    Show {
        /// Table name
        table: String,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a row (prompts for values unless --set is given)
    Add {
        /// Table name
        table: String,
        /// Column value as column=value; repeatable
        #[arg(long = "set", value_name = "COLUMN=VALUE")]
        set: Vec<String>,
    },

    /// Edit a row (prompts for values unless --set is given)
    Update {
        /// Table name
        table: String,
        /// Row number as shown by `show`
        #[arg(long)]
        row: usize,
        /// Column value as column=value; repeatable
        #[arg(long = "set", value_name = "COLUMN=VALUE")]
        set: Vec<String>,
    },

    /// Delete a row
    Delete {
        /// Table name
        table: String,
        /// Row number as shown by `show`
        #[arg(long)]
        row: usize,
    },

    /// Interactive session
    Shell,
}
