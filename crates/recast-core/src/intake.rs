//! Intake: turn file inputs into catalog entries.
//!
//! Non-image inputs and inputs that fail to decode are skipped; neither
//! aborts the rest of the batch. Entries are appended in input order even
//! when decoding runs in parallel.

use crate::catalog::Catalog;
use crate::entry::{EntryId, FileInput, ImageEntry};
use crate::notice::Notice;
use tracing::{debug, warn};

/// Natural pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Decodes raw bytes far enough to prove they are a displayable image.
pub trait Probe: Send + Sync {
    fn probe(&self, data: &[u8]) -> Result<Dimensions, ProbeError>;
}

/// Errors from probing an input.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("unsupported image format: {0}")]
    Unsupported(String),
}

/// Outcome of one intake invocation.
#[derive(Debug, Default)]
pub struct IntakeReport {
    /// Ids of the entries added, in input order.
    pub accepted: Vec<EntryId>,
    /// Names of inputs whose media type was not an image.
    pub rejected: Vec<String>,
    /// Image inputs that failed to decode.
    pub failed: Vec<(String, ProbeError)>,
}

impl IntakeReport {
    /// Warning to surface when some inputs were not images.
    ///
    /// Decode failures are logged only.
    pub fn notice(&self) -> Option<Notice> {
        if self.rejected.is_empty() {
            None
        } else {
            Some(Notice::warning("Some files are not images"))
        }
    }

    pub fn skipped(&self) -> usize {
        self.rejected.len() + self.failed.len()
    }
}

/// Validate, decode and append `inputs` to `catalog`.
pub fn ingest(catalog: &mut Catalog, inputs: Vec<FileInput>, probe: &dyn Probe) -> IntakeReport {
    let mut report = IntakeReport::default();
    if inputs.is_empty() {
        return report;
    }

    let mut images = Vec::with_capacity(inputs.len());
    for input in inputs {
        if input.is_image() {
            images.push(input);
        } else {
            debug!(name = %input.name, media_type = %input.media_type, "not an image");
            report.rejected.push(input.name);
        }
    }

    for (input, probed) in probe_all(images, probe) {
        match probed {
            Ok(dims) => {
                debug!(name = %input.name, width = dims.width, height = dims.height, "accepted");
                let entry = ImageEntry::new(input, dims.width, dims.height);
                report.accepted.push(catalog.add(entry));
            }
            Err(e) => {
                warn!(name = %input.name, error = %e, "skipping image that failed to load");
                report.failed.push((input.name, e));
            }
        }
    }

    report
}

type Probed = (FileInput, Result<Dimensions, ProbeError>);

#[cfg(not(feature = "parallel"))]
fn probe_all(images: Vec<FileInput>, probe: &dyn Probe) -> Vec<Probed> {
    images
        .into_iter()
        .map(|input| {
            let probed = probe.probe(&input.data);
            (input, probed)
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn probe_all(images: Vec<FileInput>, probe: &dyn Probe) -> Vec<Probed> {
    use rayon::prelude::*;

    // Indexed collect keeps input order.
    images
        .into_par_iter()
        .map(|input| {
            let probed = probe.probe(&input.data);
            (input, probed)
        })
        .collect()
}
