//! PDF reading and loading operations.
//!
//! Loading is synchronous: callers on the async side wrap it in
//! `spawn_blocking`, the job driver already runs it on a blocking thread.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(Path::new("a.pdf"))?;
//! println!("{} pages", loaded.page_count);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{Result, StitchError};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    fn new(document: Document, path: PathBuf, load_time: Duration) -> Self {
        let page_count = document.get_pages().len();
        let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Self {
            document,
            path,
            page_count,
            load_time,
            file_size,
        }
    }
}

/// PDF reader with configurable loading behavior.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Whether to reject documents without pages.
    verify: bool,
}

impl PdfReader {
    /// Create a new PDF reader with default settings.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts documents without pages.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - File is not a valid PDF (or is encrypted)
    /// - Verification is on and the PDF has no pages
    pub fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let start = Instant::now();

        let doc = Document::load(path)
            .map_err(|e| StitchError::failed_to_load_pdf(path.to_path_buf(), e.to_string()))?;

        if self.verify && doc.get_pages().is_empty() {
            return Err(StitchError::failed_to_load_pdf(
                path.to_path_buf(),
                "PDF has no pages",
            ));
        }

        Ok(LoadedPdf::new(doc, path.to_path_buf(), start.elapsed()))
    }

    /// Count the pages of a PDF without keeping the document around.
    pub fn page_count(&self, path: &Path) -> Result<usize> {
        self.load(path).map(|loaded| loaded.page_count)
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}
