use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use super::client::RecordSource;
use crate::error::{CacheError, Error};
use crate::table::{write_records, CompanyRecord};

/// Write-once CSV copy of the remote record list.
///
/// Once the file exists it is reused as-is on every run. It never expires;
/// it is replaced only when the caller forces a refresh or the file is
/// removed by hand.
pub struct CsvCache {
    path: PathBuf,
}

/// Whether the cache already held the artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Fetched,
}

impl CsvCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_cached(&self) -> bool {
        self.path.is_file()
    }

    /// Make sure the artifact exists, fetching from `source` only if needed.
    pub fn ensure(
        &self,
        source: &dyn RecordSource,
        force_refresh: bool,
    ) -> Result<(PathBuf, CacheStatus), Error> {
        if self.is_cached() && !force_refresh {
            info!("cache hit: {:?}", self.path);
            return Ok((self.path.clone(), CacheStatus::Hit));
        }

        if force_refresh {
            info!("forced refresh of {:?} from {}", self.path, source.describe());
        } else {
            info!("cache miss: {:?}, fetching {}", self.path, source.describe());
        }

        let records = source.fetch()?;
        self.store(&records)?;

        Ok((self.path.clone(), CacheStatus::Fetched))
    }

    /// Persist `records` as CSV, replacing any existing artifact atomically.
    pub fn store(&self, records: &[CompanyRecord]) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            write_records(&mut writer, records).map_err(|source| CacheError::Csv {
                path: self.path.clone(),
                source,
            })?;
            writer.flush().map_err(io_err)?;
        }
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        info!("cached {} records to {:?}", records.len(), self.path);
        Ok(())
    }
}
