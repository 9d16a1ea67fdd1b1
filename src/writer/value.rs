use crate::schema::{coerce_integer, parse_real, ColumnType};
use crate::table::Cell;

/// A value ready for binding into an INSERT
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Convert a table cell into the storage class of its column.
    ///
    /// Cells that do not fit a numeric column become NULL rather than
    /// failing the load.
    pub fn coerce(cell: Cell<'_>, col_type: ColumnType) -> Self {
        match (cell, col_type) {
            (Cell::Null, _) => SqlValue::Null,
            (Cell::Integer(i), ColumnType::Integer) => SqlValue::Integer(i),
            (Cell::Integer(i), ColumnType::Real) => SqlValue::Real(i as f64),
            (Cell::Integer(i), ColumnType::Text) => SqlValue::Text(i.to_string()),
            (Cell::Text(s), ColumnType::Integer) => {
                coerce_integer(s).map(SqlValue::Integer).unwrap_or(SqlValue::Null)
            }
            (Cell::Text(s), ColumnType::Real) => {
                parse_real(s).map(SqlValue::Real).unwrap_or(SqlValue::Null)
            }
            (Cell::Text(s), ColumnType::Text) => SqlValue::Text(s.to_string()),
        }
    }

    /// NULL out negative numbers for columns that only hold counts
    pub fn reject_negative(self) -> Self {
        match self {
            SqlValue::Integer(i) if i < 0 => SqlValue::Null,
            SqlValue::Real(f) if f < 0.0 => SqlValue::Null,
            other => other,
        }
    }

    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}
