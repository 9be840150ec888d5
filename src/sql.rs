//! Statement text for the CRUD cycle.
//!
//! Every identifier that reaches this module has already been matched
//! against the live schema; it is still quoted so names with spaces or
//! quotes survive. Values never appear in statement text, only `?N`
//! placeholders.

use crate::models::TableHandle;

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn select_all(table: &TableHandle) -> String {
    let mut sql = format!(
        "SELECT {} FROM {}",
        column_list(&table.column_names()),
        quote_ident(&table.name)
    );
    if let Some(pk) = table.primary_key() {
        sql.push_str(&format!(" ORDER BY {}", quote_ident(&pk.name)));
    }
    sql
}

pub fn insert(table: &str, columns: &[String], returning: &str) -> String {
    if columns.is_empty() {
        return format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            quote_ident(table),
            quote_ident(returning)
        );
    }
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quote_ident(table),
        column_list(columns),
        placeholders,
        quote_ident(returning)
    )
}

/// `UPDATE` with the key bound as the last parameter.
pub fn update(table: &str, pk_column: &str, columns: &[String]) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", quote_ident(c), i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        quote_ident(table),
        assignments,
        quote_ident(pk_column),
        columns.len() + 1
    )
}

pub fn delete(table: &str, pk_column: &str) -> String {
    format!(
        "DELETE FROM {table} WHERE {pk} = ?1 RETURNING {pk}",
        table = quote_ident(table),
        pk = quote_ident(pk_column)
    )
}
