pub mod cli;
pub mod download;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod table;
pub mod transform;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::{CacheError, Error, FetchError, StoreError};
pub use pipeline::{run, run_from_csv, PipelineConfig, PipelineOutput};
pub use transform::{batch_to_year, DerivationWarning};
pub use ui::{ConsoleUi, SilentUi, Stage, Ui};
