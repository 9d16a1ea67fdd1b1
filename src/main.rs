use anyhow::{Context, Result};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};
use yc_to_sqlite::{
    cli::{pipeline_config, Cli, Commands},
    download::{CacheStatus, CsvCache, HttpSource},
    pipeline::{run, run_from_csv},
    writer::SqliteStore,
    ConsoleUi,
};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    match cli.command {
        Commands::Sync { source, store } => {
            let start = Instant::now();
            let config = pipeline_config(&source, &store)?;
            let http = config.http_source()?;
            let mut ui = ConsoleUi::new();

            let output = run(&config, &http, &mut ui)?;

            let how = match output.cache_status {
                CacheStatus::Hit => "cached copy",
                CacheStatus::Fetched => "fresh download",
            };
            println!(
                "\nLoaded {} rows into {} in {:?} from {} in {:.1}s",
                output.table.row_count(),
                config.table_name,
                config.store_path,
                how,
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Download { source } => {
            let cache = CsvCache::new(source.cache_path()?);
            let http = HttpSource::new(source.url.clone(), source.timeout())?;
            let (path, status) = cache.ensure(&http, source.force)?;
            match status {
                CacheStatus::Hit => println!("Already cached at {:?}", path),
                CacheStatus::Fetched => println!("Downloaded {} to {:?}", http.url(), path),
            }
        }

        Commands::Load { csv, store } => {
            let start = Instant::now();
            let db = store.db_path()?;
            let mut ui = ConsoleUi::new();

            let output = run_from_csv(&csv, &db, &store.table, &mut ui)
                .with_context(|| format!("Failed to load {:?}", csv))?;

            println!(
                "\nLoaded {} rows into {} in {:?} in {:.1}s",
                output.table.row_count(),
                store.table,
                db,
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Inspect { store, json } => {
            let db = store.db_path()?;
            let info = SqliteStore::open(&db)?.describe(&store.table)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{} ({} rows)\n", info.name, info.row_count);
                for col in &info.columns {
                    println!("  {:30} {}", col.name, col.sql_type);
                }
            }
        }
    }

    Ok(())
}
