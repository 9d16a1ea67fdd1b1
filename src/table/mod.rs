//! In-memory column table shared by every pipeline stage.

mod io;

pub use io::*;

use std::collections::HashMap;

/// One company as delivered by the remote directory, keys in source order.
pub type CompanyRecord = serde_json::Map<String, serde_json::Value>;

/// Cell storage for a single column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Raw values as read from the cache; `None` is an empty cell.
    Text(Vec<Option<String>>),
    /// Values computed by the pipeline.
    Integer(Vec<Option<i64>>),
}

/// Borrowed view of one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Null,
    Text(&'a str),
    Integer(i64),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell(&self, row: usize) -> Cell<'_> {
        match self {
            ColumnData::Text(v) => match v.get(row) {
                Some(Some(s)) => Cell::Text(s),
                _ => Cell::Null,
            },
            ColumnData::Integer(v) => match v.get(row) {
                Some(Some(i)) => Cell::Integer(*i),
                _ => Cell::Null,
            },
        }
    }

    /// True when no row holds a value. Vacuously true for zero rows.
    pub fn is_all_null(&self) -> bool {
        match self {
            ColumnData::Text(v) => v.iter().all(Option::is_none),
            ColumnData::Integer(v) => v.iter().all(Option::is_none),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    pub fn integer(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Integer(values),
        }
    }
}

/// Ordered set of named columns over a fixed number of rows.
///
/// Column lookup by name is case-insensitive and goes through an index of
/// case-folded names built as columns are added. When two columns fold to
/// the same name the first one wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    row_count: usize,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl Table {
    pub fn new(row_count: usize) -> Self {
        Self {
            row_count,
            columns: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn from_columns(row_count: usize, columns: Vec<Column>) -> Self {
        let mut table = Self::new(row_count);
        for column in columns {
            table.push_column(column);
        }
        table
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn push_column(&mut self, column: Column) {
        self.index
            .entry(fold(&column.name))
            .or_insert(self.columns.len());
        self.columns.push(column);
    }

    /// Replace the column at `position`, keeping its place in the order.
    pub fn replace_column(&mut self, position: usize, column: Column) {
        self.columns[position] = column;
        self.rebuild_index();
    }

    /// Position of the first column whose name matches case-insensitively
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&fold(name)).copied()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, column) in self.columns.iter().enumerate() {
            self.index.entry(fold(&column.name)).or_insert(i);
        }
    }
}

/// Canonical form used for all column-name comparisons
pub fn fold(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(String::from)).collect()
    }

    #[test]
    fn test_lookup_is_case_insensitive_first_wins() {
        let table = Table::from_columns(
            1,
            vec![
                Column::text("Batch", text(&[Some("W21")])),
                Column::text("batch", text(&[Some("S07")])),
            ],
        );

        assert_eq!(table.position("BATCH"), Some(0));
        assert_eq!(table.column("batch").unwrap().name, "Batch");
        assert!(table.column("team_size").is_none());
    }

    #[test]
    fn test_replace_column_reindexes() {
        let mut table = Table::from_columns(
            1,
            vec![
                Column::text("a", text(&[Some("x")])),
                Column::text("b", text(&[Some("y")])),
            ],
        );

        table.replace_column(0, Column::integer("c", vec![Some(1)]));

        assert!(table.position("a").is_none());
        assert_eq!(table.position("c"), Some(0));
        assert_eq!(table.position("b"), Some(1));
    }

    #[test]
    fn test_all_null_is_vacuous_for_zero_rows() {
        assert!(ColumnData::Text(vec![]).is_all_null());
        assert!(ColumnData::Integer(vec![None, None]).is_all_null());
        assert!(!ColumnData::Integer(vec![None, Some(3)]).is_all_null());
    }

    #[test]
    fn test_cell_out_of_range_is_null() {
        let data = ColumnData::Text(text(&[Some("a")]));
        assert_eq!(data.cell(0), Cell::Text("a"));
        assert_eq!(data.cell(5), Cell::Null);
    }
}
