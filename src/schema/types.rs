use crate::table::fold;

/// SQL storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// A column the pipeline depends on, with a fixed SQL type.
///
/// Every other column passes through and is typed from its cells.
#[derive(Debug, Clone)]
pub struct KnownColumn {
    pub name: &'static str,
    pub col_type: ColumnType,
    /// Computed by the pipeline rather than read from the source
    pub derived: bool,
    /// Negative values are invalid and load as NULL
    pub non_negative: bool,
}

impl KnownColumn {
    pub const fn source(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            derived: false,
            non_negative: false,
        }
    }

    pub const fn derived(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            derived: true,
            non_negative: false,
        }
    }

    pub const fn non_negative(self) -> Self {
        Self {
            non_negative: true,
            ..self
        }
    }
}

pub static BATCH: KnownColumn = KnownColumn::source("batch", ColumnType::Text);

/// Non-negative head count; unparseable values load as NULL, never 0.
pub static TEAM_SIZE: KnownColumn =
    KnownColumn::source("team_size", ColumnType::Integer).non_negative();

pub static BATCH_YEAR: KnownColumn = KnownColumn::derived("batch_year", ColumnType::Integer);

pub static KNOWN_COLUMNS: &[&KnownColumn] = &[&BATCH, &TEAM_SIZE, &BATCH_YEAR];

/// Look up a known column, ignoring case
pub fn known_column(name: &str) -> Option<&'static KnownColumn> {
    let name = fold(name);
    KNOWN_COLUMNS.iter().copied().find(|c| c.name == name)
}
