//! The catalog: ordered collection of accepted images.

use crate::entry::{EntryId, ImageEntry};

/// Which entries of the catalog a conversion covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// Every entry.
    #[default]
    All,
    /// Only entries whose inclusion flag is set.
    Included,
}

/// Errors from index- or id-addressed catalog operations.
///
/// The catalog is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("index {index} out of range (catalog has {len} entries)")]
    OutOfRange { index: usize, len: usize },

    #[error("no entry with id {0}")]
    UnknownId(EntryId),
}

/// Ordered sequence of image entries.
///
/// Insertion order is preserved and duplicates are allowed. Every mutation
/// bumps [`Catalog::revision`] so views can tell when to re-render.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<ImageEntry>,
    next_id: u64,
    revision: u64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, assigning it a fresh id.
    pub fn add(&mut self, mut entry: ImageEntry) -> EntryId {
        self.next_id += 1;
        let id = EntryId(self.next_id);
        entry.id = id;
        self.entries.push(entry);
        self.revision += 1;
        id
    }

    /// Remove the entry at `index`, keeping the others in order.
    pub fn remove(&mut self, index: usize) -> Result<ImageEntry, CatalogError> {
        self.check_index(index)?;
        let entry = self.entries.remove(index);
        self.revision += 1;
        Ok(entry)
    }

    /// Remove the entry with the given id.
    pub fn remove_id(&mut self, id: EntryId) -> Result<ImageEntry, CatalogError> {
        let index = self.position(id).ok_or(CatalogError::UnknownId(id))?;
        self.remove(index)
    }

    /// Flip the inclusion flag at `index`. Returns the new state.
    pub fn toggle_inclusion(&mut self, index: usize) -> Result<bool, CatalogError> {
        self.check_index(index)?;
        let entry = &mut self.entries[index];
        entry.included = !entry.included;
        self.revision += 1;
        Ok(entry.included)
    }

    /// Flip the inclusion flag of the entry with the given id.
    pub fn toggle_id(&mut self, id: EntryId) -> Result<bool, CatalogError> {
        let index = self.position(id).ok_or(CatalogError::UnknownId(id))?;
        self.toggle_inclusion(index)
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.revision += 1;
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageEntry> {
        self.entries.get(index)
    }

    pub fn get_id(&self, id: EntryId) -> Option<&ImageEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    /// Current index of the entry with the given id.
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn included(&self) -> impl Iterator<Item = &ImageEntry> {
        self.entries.iter().filter(|e| e.included)
    }

    /// Entries covered by a selection, in catalog order.
    pub fn select(&self, selection: Selection) -> Vec<ImageEntry> {
        match selection {
            Selection::All => self.entries.clone(),
            Selection::Included => self.included().cloned().collect(),
        }
    }

    /// Sum of source sizes.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(ImageEntry::size).sum()
    }

    /// Mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn check_index(&self, index: usize) -> Result<(), CatalogError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(CatalogError::OutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }
}
