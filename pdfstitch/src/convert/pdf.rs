//! Pass-through for inputs that are already PDFs.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::files::check_path_is_file;

/// Use the source PDF as its own intermediate artifact.
///
/// The file is not copied or parsed here; an unreadable PDF surfaces when
/// the merge loads it.
///
/// # Errors
///
/// Returns an error if the file disappeared after it was added.
pub fn pass_through(source: &Path) -> Result<PathBuf> {
    check_path_is_file(source)?;
    Ok(source.to_path_buf())
}
