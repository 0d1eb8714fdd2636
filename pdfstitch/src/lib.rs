//! pdfstitch - Convert mixed documents to PDF and stitch them into one file.
//!
//! An ordered list of files (PDFs, Word/Excel/PowerPoint documents, images
//! and plain text) is converted file by file into intermediate PDFs, which
//! are then concatenated in list order into a single output document. It
//! provides:
//!
//! - Extension-based classification of inputs
//! - Per-type converters (pass-through, office suite, image, text)
//! - Order-preserving PDF concatenation
//! - A single-job driver with observable status and optional removal of
//!   the source files
//! - Thin wrappers around PyInstaller and a C compiler
//!
//! # Examples
//!
//! ## Merge through a session
//!
//! ```no_run
//! use pdfstitch::{Config, JobDriver, Session};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new(vec![], PathBuf::from("merged.pdf"));
//! let mut session = Session::new(JobDriver::from_config(&config));
//! session.add_file("cover.png")?;
//! session.add_file("chapter.pdf")?;
//! session.add_file("notes.txt")?;
//!
//! let report = session.merge("merged.pdf").await?;
//! println!("Created {} page document", report.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Compile a C program
//!
//! ```no_run
//! use pdfstitch::toolchain::Compiler;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = Compiler::default().compile(Path::new("hello.c")).await?;
//! println!("Built {}", outcome.artifact.display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod config;
pub mod convert;
pub mod error;
pub mod files;
pub mod io;
pub mod job;
pub mod merge;
pub mod output;
pub mod session;
pub mod toolchain;
pub mod utils;

pub use classify::{FileKind, OfficeKind};
pub use config::Config;
pub use error::{Result, StitchError};
pub use job::{Job, JobDriver, JobReport, JobStatus};
pub use session::Session;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
