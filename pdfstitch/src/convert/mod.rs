//! Per-type conversion of input files into intermediate PDFs.
//!
//! Each [`FileKind`] has one leaf converter:
//!
//! - [`pdf`]: pass-through, the source is its own artifact
//! - [`office`]: rendered by an [`OfficeRenderer`]
//! - [`image`]: decoded and placed on a single page
//! - [`text`]: drawn in a monospaced font on A4 pages
//!
//! Converters are synchronous; the job driver calls them from a blocking
//! task. Produced artifacts are written into the job's scratch directory
//! under names that cannot collide (see [`intermediate_path`]).

pub mod image;
pub mod office;
pub mod pdf;
pub mod text;

pub use office::{LibreOfficeRenderer, OfficeRenderer};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::classify::FileKind;
use crate::config::{Config, TextOverflow};
use crate::error::Result;
use crate::files::FileEntry;

/// Dispatches file entries to the converter for their kind.
#[derive(Clone)]
pub struct Converters {
    office: Arc<dyn OfficeRenderer>,
    text_overflow: TextOverflow,
}

impl Converters {
    /// Create converters that render office documents with `office`.
    pub fn new(office: Arc<dyn OfficeRenderer>) -> Self {
        Self {
            office,
            text_overflow: TextOverflow::default(),
        }
    }

    /// Converters using LibreOffice and the text settings from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(LibreOfficeRenderer::new(config.office.clone())))
            .with_text_overflow(config.text_overflow)
    }

    /// Set how the text converter handles long files.
    pub fn with_text_overflow(mut self, overflow: TextOverflow) -> Self {
        self.text_overflow = overflow;
        self
    }

    /// Convert the entry at position `index` of a job.
    ///
    /// Returns the path of the intermediate PDF: the source itself for
    /// PDFs, a new file inside `scratch` for everything else.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the selected converter.
    pub fn convert(&self, index: usize, entry: &FileEntry, scratch: &Path) -> Result<PathBuf> {
        debug!(index, path = %entry.path.display(), kind = %entry.kind, "converting");

        match entry.kind {
            FileKind::Pdf => pdf::pass_through(&entry.path),
            FileKind::Office(kind) => {
                let target = intermediate_path(scratch, index, entry);
                self.office.render(&entry.path, kind, &target)?;
                Ok(target)
            }
            FileKind::Image => {
                let target = intermediate_path(scratch, index, entry);
                image::convert_image(&entry.path, &target)?;
                Ok(target)
            }
            FileKind::Text => {
                let target = intermediate_path(scratch, index, entry);
                text::convert_text(&entry.path, &target, self.text_overflow)?;
                Ok(target)
            }
        }
    }
}

/// Scratch location of the artifact for the entry at `index`.
///
/// The index prefix keeps `a/notes.txt` and `b/notes.txt` apart.
pub fn intermediate_path(scratch: &Path, index: usize, entry: &FileEntry) -> PathBuf {
    scratch.join(format!("{index:04}-{}.pdf", entry.file_name()))
}
