//! End-to-end run: cache → normalize → derive → load.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::download::{CacheStatus, CsvCache, HttpSource, RecordSource};
use crate::error::{FetchError, Result};
use crate::table::{read_table_file, Table};
use crate::transform::{derive_batch_year, normalize, DerivationReport};
use crate::ui::{Stage, Ui};
use crate::writer::load_table;

/// Everything a run needs; defaults are chosen by the caller.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source_url: String,
    pub cache_path: PathBuf,
    pub store_path: PathBuf,
    pub table_name: String,
    /// Re-fetch even when the cache file exists
    pub force_refresh: bool,
    pub timeout: Duration,
}

impl PipelineConfig {
    /// HTTP source for `source_url` with the configured timeout
    pub fn http_source(&self) -> Result<HttpSource, FetchError> {
        HttpSource::new(self.source_url.clone(), self.timeout)
    }
}

/// Result of a completed run, handed to whatever renders or queries it
pub struct PipelineOutput {
    /// The augmented table handed to the loader, before type coercion.
    /// The store holds the coerced values, so garbage or negative
    /// `team_size` cells read back as NULL there.
    pub table: Table,
    /// Open handle on the store
    pub connection: Connection,
    pub cache_status: CacheStatus,
    pub derivation: DerivationReport,
}

/// Run the whole pipeline against `source`.
///
/// The store is only written by the final load, so a failure in any earlier
/// stage leaves it exactly as it was.
pub fn run(
    config: &PipelineConfig,
    source: &dyn RecordSource,
    ui: &mut impl Ui,
) -> Result<PipelineOutput> {
    ui.set_stage(Stage::Empty);

    let cache = CsvCache::new(config.cache_path.clone());
    let (csv_path, cache_status) = cache.ensure(source, config.force_refresh)?;
    if cache_status == CacheStatus::Fetched {
        ui.set_stage(Stage::Fetched);
    }
    ui.set_stage(Stage::Cached);
    ui.set_info(format!("Using {:?}", csv_path));

    let (table, connection, derivation) =
        transform_and_load(&csv_path, &config.store_path, &config.table_name, ui)?;

    Ok(PipelineOutput {
        table,
        connection,
        cache_status,
        derivation,
    })
}

/// Run the pipeline from an existing CSV, never touching the network.
pub fn run_from_csv(
    csv_path: &Path,
    store_path: &Path,
    table_name: &str,
    ui: &mut impl Ui,
) -> Result<PipelineOutput> {
    ui.set_stage(Stage::Empty);
    ui.set_stage(Stage::Cached);

    let (table, connection, derivation) =
        transform_and_load(csv_path, store_path, table_name, ui)?;

    Ok(PipelineOutput {
        table,
        connection,
        cache_status: CacheStatus::Hit,
        derivation,
    })
}

fn transform_and_load(
    csv_path: &Path,
    store_path: &Path,
    table_name: &str,
    ui: &mut impl Ui,
) -> Result<(Table, Connection, DerivationReport)> {
    let raw = read_table_file(csv_path)?;
    info!(
        "read {} rows x {} columns from {:?}",
        raw.row_count(),
        raw.columns().len(),
        csv_path
    );

    let normalized = normalize(&raw);
    ui.set_stage(Stage::Normalized);

    let (augmented, derivation) = derive_batch_year(&normalized);
    ui.set_stage(Stage::Augmented);
    if !derivation.warnings.is_empty() {
        ui.log(format!(
            "{} batch code(s) not recognised; their batch_year is NULL",
            derivation.warnings.len()
        ));
    }

    let connection = load_table(store_path, table_name, &augmented, ui)?;
    ui.set_stage(Stage::Loaded);

    Ok((augmented, connection, derivation))
}
