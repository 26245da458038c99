//! Image entries and the raw inputs they are built from.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A file-like input: what a file picker or drop target hands over.
#[derive(Debug, Clone)]
pub struct FileInput {
    /// Display name (usually the file name).
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data,
        }
    }

    /// Whether the declared media type marks this input as an image.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Stable identifier of a catalog entry.
///
/// Ids are never reused within a catalog, so an id held across a mutation
/// either still names the same entry or names nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryId(pub(crate) u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One accepted image.
///
/// Source bytes are shared and never change; the inclusion flag is the only
/// mutable state and is changed through the catalog.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub(crate) id: EntryId,
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
    width: u32,
    height: u32,
    pub(crate) included: bool,
}

impl ImageEntry {
    /// Build an entry from decoded input. The id is assigned on catalog insert.
    pub fn new(input: FileInput, width: u32, height: u32) -> Self {
        Self {
            id: EntryId(0),
            name: input.name,
            media_type: input.media_type,
            bytes: input.data.into(),
            width,
            height,
            included: true,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the source in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_included(&self) -> bool {
        self.included
    }

    pub fn summary(&self) -> EntrySummary {
        EntrySummary {
            id: self.id,
            name: self.name.clone(),
            media_type: self.media_type.clone(),
            size: self.size(),
            width: self.width,
            height: self.height,
            included: self.included,
        }
    }
}

/// Serializable view of an entry, without the bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySummary {
    pub id: EntryId,
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub included: bool,
}

impl fmt::Display for EntrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} • {} • {}×{}",
            self.name,
            human_size(self.size),
            self.width,
            self.height
        )
    }
}

/// Format a byte count as `B`, `KB` or `MB` with one decimal.
pub fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1024), "1.0 KB");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_is_image() {
        assert!(FileInput::new("a.png", "image/png", vec![]).is_image());
        assert!(!FileInput::new("a.txt", "text/plain", vec![]).is_image());
        assert!(!FileInput::new("a", "", vec![]).is_image());
    }

    #[test]
    fn test_entry_starts_included() {
        let entry = ImageEntry::new(FileInput::new("a.png", "image/png", vec![1, 2, 3]), 4, 5);
        assert!(entry.is_included());
        assert_eq!(entry.size(), 3);
        assert_eq!(entry.summary().to_string(), "a.png • 3 B • 4×5");
    }
}
