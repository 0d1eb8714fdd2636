//! File type classification.
//!
//! Maps a file extension onto the conversion strategy used for it. This is a
//! pure lookup; anything outside [`SUPPORTED_EXTENSIONS`] is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Result, StitchError};

/// Every extension accepted into a file list, lower-case, without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "txt", "jpg", "jpeg", "png", "bmp", "gif",
];

/// Office document family. Selects the export filter of the office renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfficeKind {
    /// Word processing (`doc`, `docx`).
    Word,
    /// Spreadsheet (`xls`, `xlsx`).
    Spreadsheet,
    /// Presentation (`ppt`, `pptx`).
    Presentation,
}

/// Conversion strategy for one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "family")]
pub enum FileKind {
    /// Already a PDF; used unmodified.
    Pdf,
    /// Rendered through the office automation environment.
    Office(OfficeKind),
    /// Raster image placed on a single page.
    Image,
    /// Plain text drawn on a fixed-size page.
    Text,
}

impl FileKind {
    /// Classify an extension. Case-insensitive; a leading dot is ignored.
    ///
    /// Returns `None` for anything outside the supported set.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfstitch::classify::{FileKind, OfficeKind};
    ///
    /// assert_eq!(FileKind::from_extension("PDF"), Some(FileKind::Pdf));
    /// assert_eq!(
    ///     FileKind::from_extension(".xlsx"),
    ///     Some(FileKind::Office(OfficeKind::Spreadsheet))
    /// );
    /// assert_eq!(FileKind::from_extension("odt"), None);
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        let kind = match ext.as_str() {
            "pdf" => Self::Pdf,
            "doc" | "docx" => Self::Office(OfficeKind::Word),
            "xls" | "xlsx" => Self::Office(OfficeKind::Spreadsheet),
            "ppt" | "pptx" => Self::Office(OfficeKind::Presentation),
            "jpg" | "jpeg" | "png" | "bmp" | "gif" => Self::Image,
            "txt" => Self::Text,
            _ => return None,
        };
        Some(kind)
    }

    /// Short label used in status lines and plans.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Office(OfficeKind::Word) => "word",
            Self::Office(OfficeKind::Spreadsheet) => "spreadsheet",
            Self::Office(OfficeKind::Presentation) => "presentation",
            Self::Image => "image",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower-cased extension of `path`, or an empty string when it has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Classify a path by its extension.
///
/// # Errors
///
/// Returns [`StitchError::UnsupportedFileType`] when the extension is not
/// in [`SUPPORTED_EXTENSIONS`].
pub fn classify(path: &Path) -> Result<FileKind> {
    let extension = extension_of(path);
    FileKind::from_extension(&extension)
        .ok_or_else(|| StitchError::unsupported(path.to_path_buf(), extension))
}
