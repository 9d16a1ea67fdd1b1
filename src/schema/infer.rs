use tracing::debug;

use super::types::{known_column, ColumnType};
use crate::table::{Column, ColumnData};

/// Storage type for a column when it is written to the store.
///
/// Known columns keep their declared type. Passthrough text columns are
/// scanned: empty cells are ignored, and the narrowest type that fits every
/// remaining cell wins (INTEGER, then REAL, then TEXT). A column with no
/// values at all stays TEXT.
pub fn resolve_type(column: &Column) -> ColumnType {
    if let Some(known) = known_column(&column.name) {
        return known.col_type;
    }

    match &column.data {
        ColumnData::Integer(_) => ColumnType::Integer,
        ColumnData::Text(values) => infer_text(&column.name, values),
    }
}

fn infer_text(name: &str, values: &[Option<String>]) -> ColumnType {
    let mut current: Option<ColumnType> = None;

    for cell in values.iter().flatten() {
        let inferred = infer_cell(cell);
        current = Some(match current {
            None => inferred,
            Some(prev) => widen(prev, inferred),
        });
        if current == Some(ColumnType::Text) {
            break;
        }
    }

    let ty = current.unwrap_or(ColumnType::Text);
    debug!("infer: column `{}` -> {}", name, ty.sql_type());
    ty
}

fn infer_cell(cell: &str) -> ColumnType {
    let cell = cell.trim();
    if parse_integer(cell).is_some() {
        ColumnType::Integer
    } else if parse_real(cell).is_some() {
        ColumnType::Real
    } else {
        ColumnType::Text
    }
}

fn widen(a: ColumnType, b: ColumnType) -> ColumnType {
    use ColumnType::*;
    match (a, b) {
        (Integer, Integer) => Integer,
        (Integer | Real, Integer | Real) => Real,
        _ => Text,
    }
}

/// Strict integer parse used for inference
pub fn parse_integer(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Finite floating point parse; "NaN" and "inf" are text.
pub fn parse_real(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Lenient integer parse used when coercing into an INTEGER column.
///
/// Accepts whole-valued decimals such as `"12.0"`, which spreadsheet exports
/// produce for integer columns that contain blanks.
pub fn coerce_integer(s: &str) -> Option<i64> {
    if let Some(i) = parse_integer(s) {
        return Some(i);
    }
    let f = parse_real(s)?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
