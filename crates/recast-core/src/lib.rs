//! Recast: batch image re-encoding workflow
//!
//! Files come in through intake, land in an ordered catalog, and are
//! re-encoded by the batch converter into individual downloads or a
//! single archive. Decoding, encoding and delivery are pluggable seams;
//! `recast-image` provides the codec backend.

mod archive;
mod catalog;
mod convert;
mod entry;
mod format;
mod intake;
mod notice;
mod progress;
mod session;
mod theme;

#[cfg(test)]
mod test_support;

#[cfg(feature = "zip")]
pub use archive::ZipArchiveBuilder;
pub use archive::{ARCHIVE_FOLDER, ArchiveBuilder, ArchiveError, ArchiveLayout};
pub use catalog::{Catalog, CatalogError, Selection};
pub use convert::{
    BatchConverter, BatchError, BatchSummary, ConversionRequest, DEFAULT_ARCHIVE_THRESHOLD,
    Delivery, DeliveryError, DeliveryMode, Download, EncodeError, Encoder, ModePolicy,
    archive_entry_name, archive_file_name, download_file_name,
};
pub use entry::{EntryId, EntrySummary, FileInput, ImageEntry, human_size};
pub use format::{OutputFormat, Quality};
pub use intake::{Dimensions, IntakeReport, Probe, ProbeError, ingest};
pub use notice::{Notice, NoticeLevel};
pub use progress::{ProgressGuard, ProgressReporter, ProgressState};
pub use session::{Frontend, Session, SessionConfig, SessionError};
pub use theme::{MemoryStore, PreferenceError, PreferenceStore, THEME_KEY, Theme};
