use tracing::{debug, info};

use crate::table::{Column, Table};

/// Drop columns that are null in every row and trim every column name.
///
/// Cell values are left as they are.
pub fn normalize(table: &Table) -> Table {
    let mut out = Table::new(table.row_count());
    let mut dropped = Vec::new();

    for column in table.columns() {
        if column.data.is_all_null() {
            dropped.push(column.name.as_str());
            continue;
        }

        let name = column.name.trim();
        if name != column.name {
            debug!("normalize: renamed `{}` -> `{}`", column.name, name);
        }
        out.push_column(Column {
            name: name.to_string(),
            data: column.data.clone(),
        });
    }

    if !dropped.is_empty() {
        info!("normalize: dropped {} empty column(s): {:?}", dropped.len(), dropped);
    }

    out
}
