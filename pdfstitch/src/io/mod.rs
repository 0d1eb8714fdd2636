//! I/O operations for PDF files.
//!
//! This module handles reading PDFs, assembling generated documents and
//! writing the merged output.

pub mod builder;
pub mod reader;
pub mod writer;

pub use builder::DocumentBuilder;
pub use reader::{LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
