//! Utilities for path collection and size formatting.

use anyhow::Context;
use std::path::PathBuf;

use crate::{Result, error::StitchError};

/// Expand multiple glob patterns into filesystem paths, in argument order.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// A pattern without glob metacharacters is kept as a literal path even when
/// nothing exists there, so the file list can report it as missing.
/// Matches of one pattern are returned in the sorted order `glob` yields.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let pattern = pattern.as_ref();
        if !is_glob_pattern(pattern) {
            resolved_paths.push(PathBuf::from(pattern));
            continue;
        }

        let paths = collect_paths_for_pattern(pattern)
            .map_err(|err| StitchError::other(format!("{err:#}")))?;
        resolved_paths.extend(paths);
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./scans/*.png"`
fn collect_paths_for_pattern(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let paths =
        glob::glob(pattern).with_context(|| format!("Invalid input pattern '{pattern}'"))?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.with_context(|| format!("Failed to expand pattern '{pattern}'"))?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}

fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
