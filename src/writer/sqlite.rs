use rusqlite::Connection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::schema_gen::{generate_create_table, generate_insert, plan_columns, quote_ident};
use super::value::SqlValue;
use crate::error::StoreError;
use crate::schema::{known_column, ColumnType};
use crate::table::Table;
use crate::ui::Ui;

const PROGRESS_EVERY: usize = 1000;

/// File-backed analytical store holding one relation per table name
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    /// Open or create the store. Existing relations are left alone.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let write_err = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open(path).map_err(write_err)?;

        // journal_mode forces SQLite to touch the file, so an unwritable
        // location fails here rather than half way through a load.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )
        .map_err(write_err)?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Drop `table_name` if present and recreate it from `table`.
    ///
    /// Runs in one transaction: readers see either the old relation or the
    /// complete new one. Schema problems are detected before the store is
    /// touched.
    pub fn replace_table(
        &mut self,
        table_name: &str,
        table: &Table,
        ui: &mut impl Ui,
    ) -> Result<u64, StoreError> {
        let columns = plan(table_name, table)?;
        self.write_planned(table_name, table, &columns, ui)
    }

    fn write_planned(
        &mut self,
        table_name: &str,
        table: &Table,
        columns: &[(String, ColumnType)],
        ui: &mut impl Ui,
    ) -> Result<u64, StoreError> {
        let path = self.path.clone();
        let write_err = |source| StoreError::Write {
            path: path.clone(),
            source,
        };

        let rows = table.row_count();
        let counts_only: Vec<bool> = columns
            .iter()
            .map(|(name, _)| known_column(name).is_some_and(|k| k.non_negative))
            .collect();
        let tx = self.conn.transaction().map_err(write_err)?;

        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table_name)))
            .map_err(write_err)?;
        tx.execute(&generate_create_table(table_name, columns), [])
            .map_err(write_err)?;

        {
            let mut stmt = tx
                .prepare(&generate_insert(table_name, columns))
                .map_err(write_err)?;

            for row in 0..rows {
                for (idx, (column, (_, col_type))) in
                    table.columns().iter().zip(columns).enumerate()
                {
                    let mut value = SqlValue::coerce(column.data.cell(row), *col_type);
                    if counts_only[idx] {
                        value = value.reject_negative();
                    }
                    value.bind_to(idx + 1, &mut stmt).map_err(write_err)?;
                }
                stmt.raw_execute().map_err(write_err)?;

                if (row + 1) % PROGRESS_EVERY == 0 {
                    ui.set_progress((row + 1) as u64, rows as u64, table_name);
                }
            }
        }

        tx.commit().map_err(write_err)?;
        ui.set_progress(rows as u64, rows as u64, table_name);
        ui.clear_progress();

        info!(
            "store: replaced {} with {} rows x {} columns in {:?}",
            table_name,
            rows,
            columns.len(),
            self.path
        );
        Ok(rows as u64)
    }

    /// Column names, declared types and row count of a relation
    pub fn describe(&self, table_name: &str) -> Result<TableInfo, StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table_name)))
            .map_err(write_err)?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    sql_type: row.get(2)?,
                })
            })
            .map_err(write_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(write_err)?;

        if columns.is_empty() {
            return Err(StoreError::Schema(format!("no table named `{}`", table_name)));
        }

        let row_count: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", quote_ident(table_name)),
                [],
                |r| r.get(0),
            )
            .map_err(write_err)?;

        Ok(TableInfo {
            name: table_name.to_string(),
            row_count: row_count as u64,
            columns,
        })
    }

    /// Run `PRAGMA optimize` before handing the store over
    pub fn finalize(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch("PRAGMA optimize;")
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub sql_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: u64,
    pub columns: Vec<ColumnInfo>,
}

fn plan(table_name: &str, table: &Table) -> Result<Vec<(String, ColumnType)>, StoreError> {
    if table_name.trim().is_empty() {
        return Err(StoreError::Schema("empty table name".into()));
    }
    plan_columns(table)
}

/// Full-refresh load of `table` into the store at `store_path`.
///
/// The schema is validated before the store file is opened, so a
/// `StoreError::Schema` never leaves a trace. Returns the open connection
/// for querying.
pub fn load_table(
    store_path: &Path,
    table_name: &str,
    table: &Table,
    ui: &mut impl Ui,
) -> Result<Connection, StoreError> {
    let columns = plan(table_name, table)?;

    let mut store = SqliteStore::open(store_path)?;
    store.write_planned(table_name, table, &columns, ui)?;
    store.finalize()?;

    Ok(store.into_connection())
}
