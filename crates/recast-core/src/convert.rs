//! Batch conversion: re-encode a list of entries and deliver the results.
//!
//! Items are processed strictly in order, one at a time. Each output is
//! either delivered as its own download or appended to an archive that is
//! delivered once at the end. The first failure aborts the batch; progress
//! is finished on every path.

use crate::archive::{ArchiveBuilder, ArchiveError, ArchiveLayout};
use crate::entry::ImageEntry;
use crate::format::{OutputFormat, Quality};
use crate::progress::{ProgressGuard, ProgressReporter};
use std::path::PathBuf;
use tracing::{debug, info};

/// Batches larger than this are archived under the default policy.
pub const DEFAULT_ARCHIVE_THRESHOLD: usize = 1;

/// Re-encodes one image into the target format.
pub trait Encoder {
    fn encode(
        &self,
        entry: &ImageEntry,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, EncodeError>;
}

/// Errors from the encode primitive.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to decode source: {0}")]
    Decode(String),

    #[error("output format {0} is not enabled")]
    Unsupported(OutputFormat),

    #[error("failed to encode: {0}")]
    Failed(String),
}

/// One file handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

/// Hands finished files to the user (browser download, directory, ...).
pub trait Delivery {
    fn deliver(&mut self, download: Download) -> Result<(), DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("delivery rejected '{0}'")]
    Rejected(String),
}

/// How converted outputs reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// One download per image.
    Individual,
    /// All images in one archive download.
    Archive,
}

/// Chooses the delivery mode for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModePolicy {
    /// Always use this mode.
    Explicit(DeliveryMode),
    /// Archive when the batch has more than this many images.
    Threshold(usize),
}

impl Default for ModePolicy {
    fn default() -> Self {
        ModePolicy::Threshold(DEFAULT_ARCHIVE_THRESHOLD)
    }
}

impl ModePolicy {
    pub fn resolve(self, count: usize) -> DeliveryMode {
        match self {
            ModePolicy::Explicit(mode) => mode,
            ModePolicy::Threshold(n) if count > n => DeliveryMode::Archive,
            ModePolicy::Threshold(_) => DeliveryMode::Individual,
        }
    }
}

/// Parameters of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub format: OutputFormat,
    pub quality: Quality,
    pub mode: ModePolicy,
    pub layout: ArchiveLayout,
}

impl ConversionRequest {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            quality: Quality::default(),
            mode: ModePolicy::default(),
            layout: ArchiveLayout::default(),
        }
    }

    pub fn quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn mode(mut self, mode: ModePolicy) -> Self {
        self.mode = mode;
        self
    }

    pub fn layout(mut self, layout: ArchiveLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// What a finished batch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub mode: DeliveryMode,
    /// Number of images encoded.
    pub converted: usize,
    /// File names delivered, in order.
    pub downloads: Vec<String>,
    /// Total encoded bytes (before archiving).
    pub bytes_out: u64,
}

/// Errors that abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("no images to convert")]
    EmptySelection,

    #[error("failed to convert '{name}' (item {}): {source}", .index + 1)]
    Encode {
        index: usize,
        name: String,
        #[source]
        source: EncodeError,
    },

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Name of the `index`-th (1-based) individual download.
pub fn download_file_name(index: usize, format: OutputFormat) -> String {
    format!("converted_{}.{}", index, format.extension())
}

/// Name of the `index`-th (1-based) entry inside an archive.
pub fn archive_entry_name(index: usize, format: OutputFormat) -> String {
    format!("image_{}.{}", index, format.extension())
}

/// Name of the archive download.
pub fn archive_file_name(extension: &str) -> String {
    format!("converted_images.{}", extension)
}

type ArchiveFactory<'a> = Box<dyn Fn() -> Result<Box<dyn ArchiveBuilder>, ArchiveError> + 'a>;

/// Runs conversion batches against an encoder.
pub struct BatchConverter<'a> {
    encoder: &'a dyn Encoder,
    new_archive: ArchiveFactory<'a>,
}

impl<'a> BatchConverter<'a> {
    /// Converter using the default archive backend (zip when enabled).
    pub fn new(encoder: &'a dyn Encoder) -> Self {
        Self {
            encoder,
            new_archive: Box::new(default_archive),
        }
    }

    /// Use a different archive backend.
    pub fn with_archive<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ArchiveBuilder>, ArchiveError> + 'a,
    {
        self.new_archive = Box::new(factory);
        self
    }

    /// Convert `images` in order and deliver the results.
    pub fn convert(
        &self,
        images: &[ImageEntry],
        request: &ConversionRequest,
        delivery: &mut dyn Delivery,
        progress: &mut dyn ProgressReporter,
    ) -> Result<BatchSummary, BatchError> {
        if images.is_empty() {
            return Err(BatchError::EmptySelection);
        }

        let total = images.len();
        let mode = request.mode.resolve(total);
        info!(
            total,
            format = %request.format,
            quality = %request.quality,
            ?mode,
            "starting batch conversion"
        );

        let mut guard = ProgressGuard::start(progress, total);
        let mut archive = match mode {
            DeliveryMode::Archive => Some((self.new_archive)()?),
            DeliveryMode::Individual => None,
        };

        let mut downloads = Vec::new();
        let mut bytes_out = 0u64;

        for (i, entry) in images.iter().enumerate() {
            let data = self
                .encoder
                .encode(entry, request.format, request.quality)
                .map_err(|source| BatchError::Encode {
                    index: i,
                    name: entry.name().to_string(),
                    source,
                })?;
            bytes_out += data.len() as u64;

            match archive.as_mut() {
                Some(archive) => {
                    let path = request
                        .layout
                        .entry_path(&archive_entry_name(i + 1, request.format));
                    debug!(name = entry.name(), %path, "archived");
                    archive.add(&path, &data)?;
                }
                None => {
                    let file_name = download_file_name(i + 1, request.format);
                    debug!(name = entry.name(), %file_name, "delivering");
                    delivery.deliver(Download {
                        file_name: file_name.clone(),
                        mime_type: request.format.mime_type(),
                        data,
                    })?;
                    downloads.push(file_name);
                }
            }

            guard.update(i + 1, &format!("Processed {} of {}", i + 1, total));
        }

        if let Some(archive) = archive {
            let file_name = archive_file_name(archive.extension());
            let data = archive.finish()?;
            delivery.deliver(Download {
                file_name: file_name.clone(),
                mime_type: "application/zip",
                data,
            })?;
            downloads.push(file_name);
        }

        info!(converted = total, bytes_out, "batch conversion finished");
        Ok(BatchSummary {
            mode,
            converted: total,
            downloads,
            bytes_out,
        })
    }
}

#[cfg(feature = "zip")]
fn default_archive() -> Result<Box<dyn ArchiveBuilder>, ArchiveError> {
    Ok(Box::new(crate::archive::ZipArchiveBuilder::new()))
}

#[cfg(not(feature = "zip"))]
fn default_archive() -> Result<Box<dyn ArchiveBuilder>, ArchiveError> {
    Err(ArchiveError::Unavailable)
}
