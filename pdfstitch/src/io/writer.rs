//! PDF writing and saving operations.
//!
//! The merged output is written atomically: the document is serialized to a
//! temporary file next to the destination and renamed into place only once
//! it is complete. A failure at any point leaves the destination untouched.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(doc, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{Result, StitchError};

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone, Serialize)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self {
            options: WriteOptions::default(),
        }
    }

    /// Create a writer without atomic writes, for scratch files.
    pub fn non_atomic() -> Self {
        Self {
            options: WriteOptions {
                atomic: false,
                ..Default::default()
            },
        }
    }

    /// Save a PDF document to a file on a blocking thread.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output directory cannot be created
    /// - Insufficient permissions
    /// - Disk full
    /// - Write operation fails
    pub async fn save(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let writer = self.clone();
        let path = path.to_path_buf();

        task::spawn_blocking(move || {
            let mut doc = doc;
            writer.write_blocking(&mut doc, &path)
        })
        .await
        .map_err(|e| StitchError::other(format!("Write task failed: {e}")))?
    }

    /// Save a PDF document on the current thread.
    ///
    /// # Errors
    ///
    /// Same as [`PdfWriter::save`].
    pub fn write_blocking(&self, doc: &mut Document, path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();

        // Ensure the containing directory exists.
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| StitchError::FailedToCreateOutput {
            path: path.to_path_buf(),
            source: e,
        })?;

        if self.options.atomic {
            let temp = tempfile::Builder::new()
                .prefix(".pdfstitch-")
                .suffix(".part")
                .tempfile_in(&parent)
                .map_err(|e| StitchError::FailedToCreateOutput {
                    path: path.to_path_buf(),
                    source: e,
                })?;

            self.serialize(doc, temp.as_file(), temp.path())?;

            // Dropping `temp` on an error path above removes the partial file.
            temp.persist(path).map_err(|e| StitchError::FailedToWrite {
                path: path.to_path_buf(),
                source: e.error,
            })?;
        } else {
            let file =
                std::fs::File::create(path).map_err(|e| StitchError::FailedToCreateOutput {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            self.serialize(doc, &file, path)?;
        }

        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size,
            output_path: path.to_path_buf(),
        })
    }

    fn serialize(&self, doc: &mut Document, file: &std::fs::File, path: &Path) -> Result<()> {
        let mut writer = BufWriter::with_capacity(self.options.buffer_size, file);

        doc.save_to(&mut writer)
            .map_err(|e| StitchError::FailedToWrite {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            })?;

        writer.flush().map_err(|e| StitchError::FailedToWrite {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }
}
