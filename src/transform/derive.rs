use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::{debug, info, warn};

use crate::schema::{BATCH, BATCH_YEAR};
use crate::table::{Cell, Column, Table};

/// Season letter (Summer, Winter, Fall) followed by a two-digit year.
static BATCH_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[SWF]([0-9]{2})$").expect("batch code pattern should compile"));

/// Map a batch code such as `"W21"` to its calendar year.
///
/// Surrounding whitespace is ignored. Anything that is not a season letter
/// followed by exactly two digits yields `None`.
pub fn batch_to_year(batch: &str) -> Option<i64> {
    let caps = BATCH_CODE.captures(batch.trim())?;
    let yy: u64 = caps[1].parse().ok()?;
    two_digit_year(yy)
}

fn two_digit_year(yy: u64) -> Option<i64> {
    if yy >= 100 {
        return None;
    }
    i64::try_from(yy).ok()?.checked_add(2000)
}

/// A batch value that could not be turned into a year.
///
/// Never fatal: the row gets a NULL `batch_year`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivationWarning {
    pub row: usize,
    pub value: String,
}

impl fmt::Display for DerivationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: unrecognised batch code {:?}", self.row, self.value)
    }
}

/// Outcome of deriving `batch_year` over a table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivationReport {
    /// Name of the column the codes were read from, as it appears in the table
    pub source_column: Option<String>,
    pub derived: usize,
    /// Rows whose batch cell was empty
    pub missing: usize,
    pub warnings: Vec<DerivationWarning>,
}

/// Append (or replace) the `batch_year` column.
///
/// The batch column is found case-insensitively. When the table has none,
/// `batch_year` is still added with every value NULL.
pub fn derive_batch_year(table: &Table) -> (Table, DerivationReport) {
    let rows = table.row_count();
    let mut report = DerivationReport::default();

    let years: Vec<Option<i64>> = match table.column(BATCH.name) {
        Some(source) => {
            report.source_column = Some(source.name.clone());
            (0..rows)
                .map(|row| match source.data.cell(row) {
                    Cell::Null => {
                        report.missing += 1;
                        None
                    }
                    cell => {
                        let year = match cell {
                            Cell::Text(s) => batch_to_year(s),
                            _ => None,
                        };
                        match year {
                            Some(_) => report.derived += 1,
                            None => report.warnings.push(DerivationWarning {
                                row,
                                value: cell_text(cell),
                            }),
                        }
                        year
                    }
                })
                .collect()
        }
        None => {
            warn!("derive: no `{}` column; `{}` will be all NULL", BATCH.name, BATCH_YEAR.name);
            vec![None; rows]
        }
    };

    for w in &report.warnings {
        debug!("derive: {}", w);
    }
    info!(
        "derive: {} of {} rows have a batch year ({} unparseable, {} missing)",
        report.derived,
        rows,
        report.warnings.len(),
        report.missing
    );

    let mut out = table.clone();
    let derived = Column::integer(BATCH_YEAR.name, years);
    match out.position(BATCH_YEAR.name) {
        Some(pos) => out.replace_column(pos, derived),
        None => out.push_column(derived),
    }

    (out, report)
}

fn cell_text(cell: Cell<'_>) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Text(s) => s.to_string(),
        Cell::Integer(i) => i.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnData;

    fn text(name: &str, values: &[Option<&str>]) -> Column {
        Column::text(name, values.iter().map(|v| v.map(String::from)).collect())
    }

    fn years(table: &Table) -> Vec<Option<i64>> {
        match &table.column("batch_year").unwrap().data {
            ColumnData::Integer(v) => v.clone(),
            other => panic!("batch_year should be integer, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_to_year_valid_codes() {
        assert_eq!(batch_to_year("W21"), Some(2021));
        assert_eq!(batch_to_year("S07"), Some(2007));
        assert_eq!(batch_to_year("F99"), Some(2099));
        assert_eq!(batch_to_year("S00"), Some(2000));
        assert_eq!(batch_to_year(" W21 "), Some(2021));
    }

    #[test]
    fn test_batch_to_year_rejects_other_shapes() {
        for code in ["Summer 2021", "", "bad", "X21", "w21", "W2", "W211", "21", "W2a", "W٢١"] {
            assert_eq!(batch_to_year(code), None, "{:?}", code);
        }
    }

    #[test]
    fn test_two_digit_year_overflow_is_null() {
        assert_eq!(two_digit_year(99), Some(2099));
        assert_eq!(two_digit_year(100), None);
        assert_eq!(two_digit_year(u64::MAX), None);
    }

    #[test]
    fn test_derives_per_row_with_warnings() {
        let table = Table::from_columns(
            4,
            vec![text("Batch", &[Some("W21"), Some("bad"), None, Some("S07")])],
        );

        let (out, report) = derive_batch_year(&table);

        assert_eq!(years(&out), vec![Some(2021), None, None, Some(2007)]);
        assert_eq!(report.source_column.as_deref(), Some("Batch"));
        assert_eq!(report.derived, 2);
        assert_eq!(report.missing, 1);
        assert_eq!(
            report.warnings,
            vec![DerivationWarning {
                row: 1,
                value: "bad".into()
            }]
        );
    }

    #[test]
    fn test_first_matching_batch_column_wins() {
        let table = Table::from_columns(
            1,
            vec![text("BATCH", &[Some("S10")]), text("batch", &[Some("W20")])],
        );

        let (out, _) = derive_batch_year(&table);

        assert_eq!(years(&out), vec![Some(2010)]);
    }

    #[test]
    fn test_missing_batch_column_still_adds_null_column() {
        let table = Table::from_columns(2, vec![text("name", &[Some("Acme"), Some("Beta")])]);

        let (out, report) = derive_batch_year(&table);

        assert_eq!(years(&out), vec![None, None]);
        assert_eq!(report.source_column, None);
        assert_eq!(out.columns().last().unwrap().name, "batch_year");
    }

    #[test]
    fn test_zero_rows_still_adds_column() {
        let (out, _) = derive_batch_year(&Table::new(0));
        assert_eq!(years(&out), Vec::<Option<i64>>::new());
        assert_eq!(out.columns().len(), 1);
    }

    #[test]
    fn test_existing_batch_year_is_replaced_in_place() {
        let table = Table::from_columns(
            1,
            vec![
                text("Batch_Year", &[Some("1999")]),
                text("batch", &[Some("F24")]),
            ],
        );

        let (out, _) = derive_batch_year(&table);

        assert_eq!(out.columns().len(), 2);
        assert_eq!(out.columns()[0].name, "batch_year");
        assert_eq!(years(&out), vec![Some(2024)]);
    }
}
