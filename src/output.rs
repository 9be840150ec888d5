//! Rendering of table lists and grids for the terminal.

use crate::error::Result;
use crate::models::TableView;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde_json::{Map, Value};

/// Shown for SQL NULL cells
pub const NULL_TEXT: &str = "NULL";

/// Grid with a leading `#` column holding the 1-based row number used for
/// selection.
pub fn render_grid(view: &TableView) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("#").add_attribute(Attribute::Bold)];
    header.extend(view.table.columns.iter().map(|c| {
        let label = if c.is_primary_key {
            format!("{} (pk)", c.name)
        } else {
            c.name.clone()
        };
        Cell::new(label).add_attribute(Attribute::Bold)
    }));
    table.set_header(header);

    for (i, row) in view.rows.iter().enumerate() {
        let mut cells = vec![(i + 1).to_string()];
        cells.extend(
            row.cells
                .iter()
                .map(|c| c.text().unwrap_or_else(|| NULL_TEXT.to_string())),
        );
        table.add_row(cells);
    }

    format!("{table}\n{} rows in {}", view.rows.len(), view.table.name)
}

pub fn render_tables(tables: &[String]) -> String {
    if tables.is_empty() {
        return "No tables found.".to_string();
    }
    tables.join("\n")
}

/// Rows as an array of objects keyed by column name.
pub fn grid_json(view: &TableView) -> Result<String> {
    let header = view.header();
    let rows: Vec<Value> = view
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = header
                .iter()
                .cloned()
                .zip(row.cells.iter().map(|c| match c.text() {
                    Some(text) => Value::String(text),
                    None => Value::Null,
                }))
                .collect();
            Value::Object(object)
        })
        .collect();
    let document = serde_json::json!({
        "table": view.table.name,
        "columns": view.table.columns,
        "rows": rows,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn tables_json(tables: &[String]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tables)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellValue, ColumnDescriptor, RowRecord, TableHandle};

    fn view() -> TableView {
        let column = |name: &str, pk: bool| ColumnDescriptor {
            name: name.to_string(),
            decl_type: String::new(),
            is_primary_key: pk,
            is_generated: pk,
            not_null: false,
            has_default: false,
        };
        TableView {
            table: TableHandle {
                name: "items".to_string(),
                columns: vec![column("id", true), column("name", false)],
            },
            rows: vec![
                RowRecord::new(vec![CellValue::Integer(1), "widget".into()]),
                RowRecord::new(vec![CellValue::Integer(2), CellValue::Null]),
            ],
        }
    }

    #[test]
    fn test_grid_has_row_numbers_and_nulls() {
        let text = render_grid(&view());
        assert!(text.contains("id (pk)"));
        assert!(text.contains("widget"));
        assert!(text.contains(NULL_TEXT));
        assert!(text.ends_with("2 rows in items"));
    }

    #[test]
    fn test_grid_json_shape() {
        let parsed: Value = serde_json::from_str(&grid_json(&view()).unwrap()).unwrap();
        assert_eq!(parsed["table"], "items");
        assert_eq!(parsed["rows"][0]["name"], "widget");
        assert_eq!(parsed["rows"][1]["name"], Value::Null);
        assert_eq!(parsed["columns"][0]["is_primary_key"], true);
    }

    #[test]
    fn test_empty_table_list() {
        assert_eq!(render_tables(&[]), "No tables found.");
        assert_eq!(tables_json(&["a".to_string()]).unwrap().replace(char::is_whitespace, ""), "[\"a\"]");
    }
}
