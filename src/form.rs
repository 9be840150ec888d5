//! Input collection for the add/update flows.

use crate::error::{CrudError, Result};
use crate::models::FieldSpec;
use std::io::{BufRead, Write};

/// Typed at a prompt to abandon the form
pub const CANCEL_WORD: &str = ":cancel";

/// Modal form collaborator: one string per field, or `None` if cancelled.
pub trait InputForm {
    fn collect_values(&mut self, title: &str, fields: &[FieldSpec]) -> Result<Option<Vec<String>>>;
}

/// Values given up front as `column=value` pairs.
///
/// Fields without a preset keep their seed value (empty when there is none).
#[derive(Debug, Clone, Default)]
pub struct PresetForm {
    values: Vec<(String, String)>,
}

impl PresetForm {
    pub fn new(values: Vec<(String, String)>) -> Self {
        PresetForm { values }
    }

    /// Parse `column=value` arguments. The value may itself contain `=`.
    pub fn parse(assignments: &[String]) -> Result<Self> {
        let values = assignments
            .iter()
            .map(|a| match a.split_once('=') {
                Some((column, value)) if !column.trim().is_empty() => {
                    Ok((column.trim().to_string(), value.to_string()))
                }
                _ => Err(CrudError::Query(format!(
                    "expected column=value, got '{a}'"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PresetForm { values })
    }
}

impl InputForm for PresetForm {
    fn collect_values(&mut self, _title: &str, fields: &[FieldSpec]) -> Result<Option<Vec<String>>> {
        if let Some((column, _)) = self
            .values
            .iter()
            .find(|(column, _)| !fields.iter().any(|f| &f.name == column))
        {
            return Err(CrudError::Schema(format!("'{column}' is not an editable column")));
        }
        let values = fields
            .iter()
            .map(|field| {
                self.values
                    .iter()
                    .rev()
                    .find(|(column, _)| column == &field.name)
                    .map(|(_, value)| value.clone())
                    .or_else(|| field.current.clone())
                    .unwrap_or_default()
            })
            .collect();
        Ok(Some(values))
    }
}

/// Line-oriented prompt on a terminal (or any reader/writer pair).
///
/// An empty answer keeps the seed value; `:cancel` or end of input cancels.
pub struct PromptForm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptForm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        PromptForm { input, output }
    }
}

impl<R: BufRead, W: Write> InputForm for PromptForm<R, W> {
    fn collect_values(&mut self, title: &str, fields: &[FieldSpec]) -> Result<Option<Vec<String>>> {
        writeln!(self.output, "{title} (empty keeps current, {CANCEL_WORD} aborts)")?;
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            let marker = if field.required { "*" } else { "" };
            match &field.current {
                Some(current) => write!(self.output, "  {}{marker} [{current}]: ", field.name)?,
                None => write!(self.output, "  {}{marker}: ", field.name)?,
            }
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let answer = line.trim_end_matches(['\r', '\n']);
            if answer.trim() == CANCEL_WORD {
                return Ok(None);
            }
            if answer.is_empty() {
                values.push(field.current.clone().unwrap_or_default());
            } else {
                values.push(answer.to_string());
            }
        }
        Ok(Some(values))
    }
}
