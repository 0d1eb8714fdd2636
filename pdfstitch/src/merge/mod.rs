//! PDF merging operations.
//!
//! This module concatenates intermediate PDFs into one document:
//! - Pages keep the order of the inputs, nothing is dropped or reordered
//! - Appended pages keep their geometry and resources
//! - Output is deterministic for identical inputs
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::merge::Merger;
//! use pdfstitch::config::CompressionLevel;
//! use std::path::PathBuf;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let merger = Merger::new().with_compression(CompressionLevel::Maximum);
//! let result = merger.merge_files(&[PathBuf::from("a.pdf"), PathBuf::from("b.pdf")])?;
//! println!("Merged {} pages", result.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod merger;

pub use merger::{MergeResult, MergeStatistics, Merger};

use crate::config::CompressionLevel;
use crate::error::{Result, StitchError};
use lopdf::Document;
use std::path::PathBuf;

/// Merge PDF files on a blocking thread.
///
/// Convenience function that creates a merger and performs the merge.
///
/// # Errors
///
/// Returns an error if any merge step fails.
///
/// # Examples
///
/// ```no_run
/// use pdfstitch::merge::merge_pdfs;
/// use pdfstitch::config::CompressionLevel;
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
/// let (document, stats) = merge_pdfs(inputs, CompressionLevel::Standard).await?;
/// println!("Created {} page document", stats.total_pages);
/// # Ok(())
/// # }
/// ```
pub async fn merge_pdfs(
    inputs: Vec<PathBuf>,
    compression: CompressionLevel,
) -> Result<(Document, MergeStatistics)> {
    let merger = Merger::new().with_compression(compression);
    let result = tokio::task::spawn_blocking(move || merger.merge_files(&inputs))
        .await
        .map_err(|e| StitchError::merge_failed(format!("Merge task failed: {e}")))??;
    Ok((result.document, result.statistics))
}
