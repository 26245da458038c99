//! Terminal implementations of the session seams.

use crate::Verbosity;
use indicatif::{ProgressBar, ProgressStyle};
use recast_core::{
    Catalog, Delivery, DeliveryError, Download, Frontend, Notice, NoticeLevel, ProgressReporter,
    human_size,
};
use std::path::PathBuf;
use tracing::debug;

/// Prints the catalog and notices to the terminal.
pub struct TerminalFrontend {
    verbosity: Verbosity,
    /// Print every render at normal verbosity (otherwise only with -v).
    echo_catalog: bool,
    errors: usize,
}

impl TerminalFrontend {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            echo_catalog: false,
            errors: 0,
        }
    }

    pub fn echo_catalog(mut self, echo: bool) -> Self {
        self.echo_catalog = echo;
        self
    }

    /// Number of error notices shown so far.
    pub fn errors(&self) -> usize {
        self.errors
    }

    fn line(&self, msg: &str) {
        if self.echo_catalog {
            self.verbosity.info(msg);
        } else {
            self.verbosity.debug(msg);
        }
    }
}

impl Frontend for TerminalFrontend {
    fn render(&mut self, catalog: &Catalog) {
        if catalog.is_empty() {
            self.line("No images loaded");
            return;
        }

        for (i, entry) in catalog.entries().iter().enumerate() {
            let mark = if entry.is_included() { "x" } else { " " };
            self.line(&format!("[{}] {:>3}. {}", mark, i + 1, entry.summary()));
        }
        self.line(&format!(
            "{} image(s), {}",
            catalog.len(),
            human_size(catalog.total_bytes())
        ));
    }

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => {
                self.errors += 1;
                eprintln!("{}", notice);
            }
            NoticeLevel::Warning => {
                if !matches!(self.verbosity, Verbosity::Quiet) {
                    eprintln!("{}", notice);
                }
            }
            NoticeLevel::Success => self.verbosity.result(&notice.to_string()),
        }
    }

    /// Commands run to completion without prompting, so destructive
    /// actions are declined.
    fn confirm(&mut self, prompt: &str) -> bool {
        debug!(prompt, "declined without prompting");
        false
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Progress bar for a conversion batch; hidden when quiet.
pub struct BarProgress {
    verbosity: Verbosity,
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            bar: None,
        }
    }
}

impl ProgressReporter for BarProgress {
    fn start(&mut self, total: usize) {
        let bar = if matches!(self.verbosity, Verbosity::Quiet) {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar
        };
        bar.set_message("Preparing conversion...");
        self.bar = Some(bar);
    }

    fn update(&mut self, completed: usize, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_position(completed as u64);
            bar.set_message(message.to_string());
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

// ============================================================================
// Delivery
// ============================================================================

/// Writes each download into an output directory.
pub struct DirectoryDelivery {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectoryDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far, in delivery order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Delivery for DirectoryDelivery {
    fn deliver(&mut self, download: Download) -> Result<(), DeliveryError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| DeliveryError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(&download.file_name);
        std::fs::write(&path, &download.data).map_err(|source| DeliveryError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), mime = download.mime_type, bytes = download.data.len(), "wrote");
        self.written.push(path);
        Ok(())
    }
}
