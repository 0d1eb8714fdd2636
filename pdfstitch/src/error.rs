//! Error types for pdfstitch.
//!
//! Every failure in the pipeline and in the toolchain wrappers is expressed
//! as a [`StitchError`]. Messages are meant to be shown to the user as-is,
//! so they name the offending file and, where it helps, a hint.
//!
//! # Error Categories
//!
//! - **Input errors**: unsupported file type, duplicate entry, missing file
//! - **Conversion errors**: office automation unavailable, malformed source
//! - **Merge errors**: unreadable intermediate PDF, unwritable output
//! - **Toolchain errors**: packager or compiler missing or failing
//! - **Job errors**: a job is already running

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfstitch operations.
pub type Result<T> = std::result::Result<T, StitchError>;

/// Main error type for pdfstitch operations.
#[derive(Debug, thiserror::Error)]
pub enum StitchError {
    /// The file extension is outside the supported set.
    #[error("Unsupported file type '{extension}': {}", path.display())]
    UnsupportedFileType {
        /// Path of the rejected file.
        path: PathBuf,
        /// The extension that was looked up (lower-cased, may be empty).
        extension: String,
    },

    /// The file is already part of the list.
    #[error("File is already in the list: {}", path.display())]
    DuplicateEntry {
        /// Path of the duplicate.
        path: PathBuf,
    },

    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// No files were provided for merging.
    #[error("No input files to merge")]
    NoFilesToMerge,

    /// A merge job is already running.
    #[error("A merge job is already in progress; wait for it to finish")]
    JobInProgress,

    /// The office automation environment could not be started.
    #[error(
        "Office automation is not available ({program}): {reason}\n  \
         Hint: install LibreOffice or point --soffice at its 'soffice' binary"
    )]
    OfficeUnavailable {
        /// Program that was attempted.
        program: String,
        /// Why it could not be started.
        reason: String,
    },

    /// A source file could not be converted to PDF.
    #[error("Failed to convert {} to PDF\n  Reason: {reason}", path.display())]
    ConversionFailed {
        /// Source file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A PDF (source or intermediate) could not be loaded.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Concatenating the intermediate PDFs failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An external toolchain program could not be started.
    #[error("Could not run '{program}': {reason}")]
    ToolchainNotFound {
        /// Program that was attempted.
        program: String,
        /// Why it could not be started.
        reason: String,
    },

    /// An external toolchain program exited unsuccessfully.
    #[error("'{program}' failed ({status})\n{output}")]
    ToolchainFailed {
        /// Program that was run.
        program: String,
        /// Exit status description.
        status: String,
        /// Raw diagnostic output of the program.
        output: String,
    },

    /// Failed to read input list file.
    #[error("Failed to read input list file: {}\n  Reason: {source}", path.display())]
    FailedToReadInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for StitchError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl StitchError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an UnsupportedFileType error.
    pub fn unsupported(path: PathBuf, extension: impl Into<String>) -> Self {
        Self::UnsupportedFileType {
            path,
            extension: extension.into(),
        }
    }

    /// Create a ConversionFailed error.
    pub fn conversion_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::ConversionFailed {
            path,
            reason: reason.into(),
        }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether the error was raised while building the file list, before
    /// any job started.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFileType { .. }
                | Self::DuplicateEntry { .. }
                | Self::FileNotFound { .. }
                | Self::NotAFile { .. }
        )
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedFileType { .. } => 1,
            Self::DuplicateEntry { .. } => 1,
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::NoFilesToMerge => 1,
            Self::JobInProgress => 1,
            Self::OfficeUnavailable { .. } => 3,
            Self::ConversionFailed { .. } => 3,
            Self::FailedToLoadPdf { .. } => 3,
            Self::MergeFailed { .. } => 6,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::ToolchainNotFound { .. } => 7,
            Self::ToolchainFailed { .. } => 7,
            Self::FailedToReadInputList { .. } => 2,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
