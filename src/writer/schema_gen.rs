use std::collections::HashMap;

use tracing::warn;

use crate::error::StoreError;
use crate::schema::{resolve_type, ColumnType};
use crate::table::{fold, Table};

/// Quote an SQL identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Work out the relational shape of `table`, rejecting anything SQLite
/// could not hold as a single relation.
///
/// A blank column name is replaced with `column_<n>`, `n` being its
/// 1-based position.
pub fn plan_columns(table: &Table) -> Result<Vec<(String, ColumnType)>, StoreError> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut planned = Vec::with_capacity(table.columns().len());

    for (i, column) in table.columns().iter().enumerate() {
        let name = if column.name.trim().is_empty() {
            let fallback = format!("column_{}", i + 1);
            warn!("store: blank column name at position {}, using `{}`", i + 1, fallback);
            fallback
        } else {
            column.name.clone()
        };
        if let Some(prev) = seen.insert(fold(&name), name.clone()) {
            return Err(StoreError::Schema(format!(
                "columns `{}` and `{}` differ only in case",
                prev, name
            )));
        }
        if column.data.len() != table.row_count() {
            return Err(StoreError::Schema(format!(
                "column `{}` has {} values for {} rows",
                name,
                column.data.len(),
                table.row_count()
            )));
        }
        planned.push((name, resolve_type(column)));
    }

    if planned.is_empty() {
        return Err(StoreError::Schema("table has no columns".into()));
    }

    Ok(planned)
}

/// Generate CREATE TABLE SQL for the planned columns
pub fn generate_create_table(table_name: &str, columns: &[(String, ColumnType)]) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", quote_ident(table_name));
    let defs: Vec<String> = columns
        .iter()
        .map(|(name, ty)| format!("    {} {}", quote_ident(name), ty.sql_type()))
        .collect();

    sql.push_str(&defs.join(",\n"));
    sql.push_str("\n)");
    sql
}

pub fn generate_insert(table_name: &str, columns: &[(String, ColumnType)]) -> String {
    let names: Vec<String> = columns.iter().map(|(n, _)| quote_ident(n)).collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table_name),
        names.join(", "),
        placeholders.join(", ")
    )
}
