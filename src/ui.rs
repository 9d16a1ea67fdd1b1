//! Progress reporting for pipeline runs
//!
//! The pipeline reports which stage it has reached, free-form info, row
//! progress while loading, and log lines. Implementations decide how (or
//! whether) to show them.

use indicatif::{ProgressBar, ProgressStyle};

/// States a run moves through, in order.
///
/// `Fetched` is skipped when the cache already holds the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Empty,
    Fetched,
    Cached,
    Normalized,
    Augmented,
    Loaded,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Empty => write!(f, "Starting"),
            Stage::Fetched => write!(f, "Fetched remote records"),
            Stage::Cached => write!(f, "Cache ready"),
            Stage::Normalized => write!(f, "Columns normalized"),
            Stage::Augmented => write!(f, "Batch year derived"),
            Stage::Loaded => write!(f, "Loaded into store"),
        }
    }
}

/// Trait for UI implementations - allows console and silent/test modes
pub trait Ui {
    fn set_stage(&mut self, stage: Stage);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
}

/// Prints stages and draws a progress bar on stderr
pub struct ConsoleUi {
    bar: Option<ProgressBar>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self { bar: None }
    }

    fn bar(&mut self, total: u64) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let pb = ProgressBar::new(total);
            if let Ok(style) =
                ProgressStyle::default_bar().template("{msg:20} [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb
        })
    }
}

impl Default for ConsoleUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for ConsoleUi {
    fn set_stage(&mut self, stage: Stage) {
        println!("==> {}", stage);
    }

    fn set_info(&mut self, info: impl Into<String>) {
        println!("    {}", info.into());
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        let bar = self.bar(total);
        bar.set_length(total);
        bar.set_position(current);
        bar.set_message(label.into());
    }

    fn clear_progress(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        match &self.bar {
            Some(bar) => bar.println(message),
            None => println!("{}", message),
        }
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_stage(&mut self, _stage: Stage) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
}
