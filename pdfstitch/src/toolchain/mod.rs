//! Wrappers around external build toolchains.
//!
//! Two stateless one-file actions:
//!
//! - [`Packager`]: bundle a Python script into a single executable with
//!   PyInstaller
//! - [`Compiler`]: compile a C source file with a C compiler
//!
//! Both run exactly one subprocess and place the artifact next to the
//! source. A program that cannot be started is reported as
//! [`StitchError::ToolchainNotFound`]; a non-zero exit as
//! [`StitchError::ToolchainFailed`] carrying the tool's own diagnostics.

pub mod compile;
pub mod package;

pub use compile::{Compiler, DEFAULT_COMPILER};
pub use package::{DEFAULT_PYINSTALLER, Packager};

use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::classify::extension_of;
use crate::error::{Result, StitchError};
use crate::files::check_path_is_file;

/// Result of a successful toolchain action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutcome {
    /// The produced executable.
    pub artifact: PathBuf,
    /// Time the action took.
    pub elapsed: Duration,
}

/// Run `command` to completion and capture its output.
///
/// # Errors
///
/// [`StitchError::ToolchainNotFound`] if the program cannot be spawned,
/// [`StitchError::ToolchainFailed`] if it exits unsuccessfully.
pub(crate) async fn run_tool(program: &Path, mut command: Command) -> Result<Output> {
    debug!(program = %program.display(), "running toolchain program");

    let output = command
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| StitchError::ToolchainNotFound {
            program: program.display().to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(StitchError::ToolchainFailed {
            program: program.display().to_string(),
            status: output.status.to_string(),
            output: diagnostics(&output),
        });
    }

    Ok(output)
}

/// Raw stderr, or stdout when stderr is empty.
fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).trim_end().to_string()
    } else {
        stderr.trim_end().to_string()
    }
}

/// Check that `source` is an existing file with extension `expected`.
pub(crate) fn check_source(source: &Path, expected: &str) -> Result<()> {
    let extension = extension_of(source);
    if extension != expected {
        return Err(StitchError::unsupported(source.to_path_buf(), extension));
    }
    check_path_is_file(source)
}

/// `<stem><EXE_SUFFIX>` for the platform.
pub(crate) fn executable_name(source: &Path) -> OsString {
    let mut name = source
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_default();
    name.push(std::env::consts::EXE_SUFFIX);
    name
}

/// Directory containing `source`, `.` for bare file names.
pub(crate) fn source_dir(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
