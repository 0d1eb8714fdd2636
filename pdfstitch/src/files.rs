//! The ordered list of files selected for a merge.
//!
//! Order is user-controlled. Insertion rejects unsupported extensions,
//! missing files and paths that are already present (compared after
//! canonicalization, so `./a.pdf` and `a.pdf` are the same entry).

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::classify::{FileKind, classify, extension_of};
use crate::error::{Result, StitchError};

/// One file in a [`FileList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Path as given by the user.
    pub path: PathBuf,
    /// Lower-cased extension without the dot.
    pub extension: String,
    /// Conversion strategy derived from the extension.
    pub kind: FileKind,
    /// Canonical path, used to detect duplicates.
    #[serde(skip)]
    key: PathBuf,
}

impl FileEntry {
    /// Build an entry for `path`, checking that it exists and is supported.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, is not a regular file,
    /// or has an unsupported extension.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let kind = classify(&path)?;
        check_path_is_file(&path)?;

        let key = std::fs::canonicalize(&path)?;
        Ok(Self {
            extension: extension_of(&path),
            kind,
            key,
            path,
        })
    }

    /// Final path component, for status lines.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Canonical form of the path, resolved when the entry was created.
    pub fn canonical_path(&self) -> &Path {
        &self.key
    }
}

/// Check that `path` exists and is a regular file.
pub fn check_path_is_file(path: &Path) -> Result<()> {
    let exists = path.try_exists()?;
    if !exists {
        return Err(StitchError::file_not_found(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(StitchError::not_a_file(path.to_path_buf()));
    }

    Ok(())
}

/// Ordered, duplicate-free list of supported files.
#[derive(Debug, Clone, Default)]
pub struct FileList {
    entries: Vec<FileEntry>,
}

impl FileList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file to the end of the list.
    ///
    /// # Errors
    ///
    /// Rejects unsupported, missing and duplicate files; the list is left
    /// unchanged in that case.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> Result<&FileEntry> {
        let entry = FileEntry::new(path)?;

        if self.entries.iter().any(|existing| existing.key == entry.key) {
            return Err(StitchError::DuplicateEntry { path: entry.path });
        }

        debug!(path = %entry.path.display(), kind = %entry.kind, "added file");
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Append several files, keeping the ones that are accepted.
    ///
    /// Returns one error per rejected path, in input order.
    pub fn add_all<I, P>(&mut self, paths: I) -> Vec<StitchError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .filter_map(|path| self.add(path).err())
            .collect()
    }

    /// Remove the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::InvalidConfig`] when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Result<FileEntry> {
        if index >= self.entries.len() {
            return Err(out_of_range(index, self.entries.len()));
        }
        Ok(self.entries.remove(index))
    }

    /// Move the entry at `from` so that it ends up at `to`.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::InvalidConfig`] when either index is out of
    /// range.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.entries.len();
        if from >= len {
            return Err(out_of_range(from, len));
        }
        if to >= len {
            return Err(out_of_range(to, len));
        }

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in merge order.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Iterate over the entries in merge order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a FileList {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn out_of_range(index: usize, len: usize) -> StitchError {
    StitchError::invalid_config(format!(
        "No file at position {index} (list has {len} entries)"
    ))
}
