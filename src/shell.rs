//! Interactive session: one command at a time, each mapped to a single
//! controller dispatch.

use crate::controller::{Command, Outcome, TableController};
use crate::error::Result;
use crate::form::PromptForm;
use crate::output;
use crate::store::DataStore;
use std::io::{BufRead, Write};

const HELP: &str = "\
Commands:
  tables           List tables
  use <table>      Load a table
  show             Reload the current table
  select <n>       Select row n (as numbered in the grid)
  add              Add a row
  update           Edit the selected row
  delete           Delete the selected row
  help             Show this help
  quit             Leave";

/// Shell state on top of the controller
pub struct Shell<S: DataStore> {
    controller: TableController<S>,
    table: Option<String>,
    selection: Option<usize>,
}

impl<S: DataStore> Shell<S> {
    pub fn new(controller: TableController<S>) -> Self {
        Shell {
            controller,
            table: None,
            selection: None,
        }
    }

    pub fn controller(&self) -> &TableController<S> {
        &self.controller
    }

    /// Read commands from `input` until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        writeln!(out, "tablecrud shell. Type `help` for commands.")?;
        loop {
            write!(out, "{}> ", self.table.as_deref().unwrap_or(""))?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                return Ok(());
            }
            let mut words = line.split_whitespace();
            let Some(verb) = words.next() else {
                continue;
            };
            let arg = words.next();

            match verb {
                "quit" | "exit" => return Ok(()),
                "help" => writeln!(out, "{HELP}")?,
                "tables" => {
                    let outcome = self
                        .controller
                        .dispatch(Command::LoadTables, &mut PromptForm::new(&mut input, &mut out));
                    match outcome {
                        Outcome::Tables(tables) => writeln!(out, "{}", output::render_tables(&tables))?,
                        other => writeln!(out, "{}", other.message())?,
                    }
                }
                "use" => match arg {
                    Some(table) => {
                        self.table = Some(table.to_string());
                        self.selection = None;
                        self.reload(&mut input, &mut out)?;
                    }
                    None => writeln!(out, "Usage: use <table>")?,
                },
                "show" => {
                    if self.require_table(&mut out)? {
                        self.reload(&mut input, &mut out)?;
                    }
                }
                "select" => self.select(arg, &mut out)?,
                "add" | "update" | "delete" => {
                    if !self.require_table(&mut out)? {
                        continue;
                    }
                    let table = self.table.clone().unwrap_or_default();
                    let command = match verb {
                        "add" => Command::AddRow { table },
                        "update" => Command::UpdateRow {
                            table,
                            selection: self.selection,
                        },
                        _ => Command::DeleteRow {
                            table,
                            selection: self.selection,
                        },
                    };
                    let outcome = self
                        .controller
                        .dispatch(command, &mut PromptForm::new(&mut input, &mut out));
                    if matches!(outcome, Outcome::Deleted(_)) {
                        self.selection = None;
                    }
                    writeln!(out, "{}", outcome.message())?;
                    self.print_view(&mut out)?;
                }
                other => writeln!(out, "Unknown command '{other}'. Type `help`.")?,
            }
        }
    }

    fn require_table<W: Write>(&self, out: &mut W) -> Result<bool> {
        if self.table.is_none() {
            writeln!(out, "No table in use. Type `use <table>`.")?;
            return Ok(false);
        }
        Ok(true)
    }

    fn reload<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        let table = self.table.clone().unwrap_or_default();
        let outcome = self
            .controller
            .dispatch(Command::LoadRows { table }, &mut PromptForm::new(input, &mut *out));
        if outcome.is_failure() {
            writeln!(out, "{}", outcome.message())?;
        }
        self.print_view(out)
    }

    fn select<W: Write>(&mut self, arg: Option<&str>, out: &mut W) -> Result<()> {
        let rows = self.controller.view().map(|v| v.rows.len()).unwrap_or(0);
        match arg.and_then(|a| a.parse::<usize>().ok()) {
            Some(n) if n >= 1 && n <= rows => {
                self.selection = Some(n - 1);
                writeln!(out, "Row {n} selected")?;
            }
            Some(n) => writeln!(out, "No row {n}")?,
            None => writeln!(out, "Usage: select <n>")?,
        }
        Ok(())
    }

    fn print_view<W: Write>(&self, out: &mut W) -> Result<()> {
        if let Some(view) = self.controller.view() {
            writeln!(out, "{}", output::render_grid(view))?;
        }
        Ok(())
    }
}
