//! Archive delivery: bundle converted outputs into one container.

/// Folder used inside archives unless a flat layout is requested.
pub const ARCHIVE_FOLDER: &str = "converted_images";

/// Where entries sit inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveLayout {
    /// Entries at the archive root.
    Flat,
    /// Entries under a single folder.
    Folder(String),
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        ArchiveLayout::Folder(ARCHIVE_FOLDER.into())
    }
}

impl ArchiveLayout {
    /// Full path of an entry named `name`.
    pub fn entry_path(&self, name: &str) -> String {
        match self {
            ArchiveLayout::Flat => name.to_string(),
            ArchiveLayout::Folder(folder) => {
                let folder = folder.trim_matches('/');
                if folder.is_empty() {
                    name.to_string()
                } else {
                    format!("{}/{}", folder, name)
                }
            }
        }
    }
}

/// Errors from building an archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to add entry '{path}': {reason}")]
    Entry { path: String, reason: String },

    #[error("failed to finalize archive: {0}")]
    Finalize(String),

    #[error("archive support is not enabled")]
    Unavailable,
}

/// Incrementally built archive with a single owner.
pub trait ArchiveBuilder {
    /// File extension of the finished archive, without the dot.
    fn extension(&self) -> &'static str;

    /// Append one entry.
    fn add(&mut self, path: &str, data: &[u8]) -> Result<(), ArchiveError>;

    /// Finalize and return the archive bytes.
    fn finish(self: Box<Self>) -> Result<Vec<u8>, ArchiveError>;
}

#[cfg(feature = "zip")]
mod zip_impl {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// Deflate-compressed zip archive held in memory.
    pub struct ZipArchiveBuilder {
        writer: ZipWriter<Cursor<Vec<u8>>>,
        options: SimpleFileOptions,
    }

    impl ZipArchiveBuilder {
        pub fn new() -> Self {
            Self {
                writer: ZipWriter::new(Cursor::new(Vec::new())),
                options: SimpleFileOptions::default()
                    .compression_method(zip::CompressionMethod::Deflated),
            }
        }
    }

    impl Default for ZipArchiveBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ArchiveBuilder for ZipArchiveBuilder {
        fn extension(&self) -> &'static str {
            "zip"
        }

        fn add(&mut self, path: &str, data: &[u8]) -> Result<(), ArchiveError> {
            self.writer
                .start_file(path, self.options)
                .map_err(|e| ArchiveError::Entry {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;
            self.writer.write_all(data).map_err(|e| ArchiveError::Entry {
                path: path.to_string(),
                reason: e.to_string(),
            })
        }

        fn finish(self: Box<Self>) -> Result<Vec<u8>, ArchiveError> {
            let cursor = self
                .writer
                .finish()
                .map_err(|e| ArchiveError::Finalize(e.to_string()))?;
            Ok(cursor.into_inner())
        }
    }
}

#[cfg(feature = "zip")]
pub use zip_impl::ZipArchiveBuilder;
