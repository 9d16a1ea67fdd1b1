use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::PipelineConfig;

pub const DEFAULT_SOURCE_URL: &str = "https://yc-oss.github.io/api/companies/all.json";
pub const DEFAULT_TABLE: &str = "yc_companies";
const CACHE_FILE_NAME: &str = "yc_companies.csv";
const DB_FILE_NAME: &str = "yc_companies.db";

#[derive(Parser, Debug)]
#[command(name = "yc-to-sqlite")]
#[command(version, about = "Load the Y Combinator company directory into SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch (if not cached) and load into the store
    Sync {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Fetch the directory into the local CSV cache only
    Download {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Load a local CSV file without touching the network
    Load {
        /// CSV file with a header row
        csv: PathBuf,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show columns and row count of the loaded table
    Inspect {
        #[command(flatten)]
        store: StoreArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Endpoint returning a JSON array of companies
    #[arg(long, env = "YC_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub url: String,

    /// Local CSV cache file
    #[arg(short, long, env = "YC_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Re-fetch even if the cache file exists
    #[arg(short, long)]
    pub force: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// SQLite database path
    #[arg(short, long, env = "YC_DB")]
    pub db: Option<PathBuf>,

    /// Table to replace
    #[arg(short, long, env = "YC_TABLE", default_value = DEFAULT_TABLE)]
    pub table: String,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "yc-to-sqlite").context("Could not determine data directories")
}

impl SourceArgs {
    pub fn cache_path(&self) -> Result<PathBuf> {
        match &self.cache_file {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.cache_dir().join(CACHE_FILE_NAME)),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl StoreArgs {
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db {
            Some(path) => Ok(path.clone()),
            None => {
                let dir = project_dirs()?.data_dir().to_path_buf();
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create data directory {:?}", dir))?;
                Ok(dir.join(DB_FILE_NAME))
            }
        }
    }
}

/// Build a pipeline configuration from the parsed options
pub fn pipeline_config(source: &SourceArgs, store: &StoreArgs) -> Result<PipelineConfig> {
    Ok(PipelineConfig {
        source_url: source.url.clone(),
        cache_path: source.cache_path()?,
        store_path: store.db_path()?,
        table_name: store.table.clone(),
        force_refresh: source.force,
        timeout: source.timeout(),
    })
}
