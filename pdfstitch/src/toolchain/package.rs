//! Python script to single-file executable, via PyInstaller.
//!
//! PyInstaller's `dist`, `build` and `.spec` outputs all go to a temporary
//! directory; only the finished executable is moved next to the script.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;
use tracing::info;

use super::{ToolOutcome, check_source, executable_name, run_tool, source_dir};
use crate::error::{Result, StitchError};

/// Default PyInstaller executable.
pub const DEFAULT_PYINSTALLER: &str = "pyinstaller";

/// Packages Python scripts with PyInstaller.
#[derive(Debug, Clone)]
pub struct Packager {
    program: PathBuf,
}

impl Packager {
    /// Create a packager that runs `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The PyInstaller executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command line arguments for packaging `script` inside `work_dir`.
    pub fn arguments(&self, script: &Path, work_dir: &Path) -> Vec<OsString> {
        vec![
            "--onefile".into(),
            "--noconfirm".into(),
            "--distpath".into(),
            work_dir.join("dist").into_os_string(),
            "--workpath".into(),
            work_dir.join("build").into_os_string(),
            "--specpath".into(),
            work_dir.as_os_str().to_owned(),
            script.as_os_str().to_owned(),
        ]
    }

    /// Package `script` into `<script dir>/<stem><EXE_SUFFIX>`.
    ///
    /// An existing executable at that path is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the script is missing or not a `.py` file, if
    /// PyInstaller cannot be started or fails, or if it produced no
    /// executable.
    pub async fn package(&self, script: &Path) -> Result<ToolOutcome> {
        check_source(script, "py")?;
        let start = Instant::now();

        let script = std::path::absolute(script)?;
        let work = tempfile::Builder::new()
            .prefix("pdfstitch-pyinstaller-")
            .tempdir()?;

        let mut command = Command::new(&self.program);
        command
            .args(self.arguments(&script, work.path()))
            .current_dir(work.path());
        run_tool(&self.program, command).await?;

        let name = executable_name(&script);
        let built = work.path().join("dist").join(&name);
        if !built.is_file() {
            return Err(StitchError::ToolchainFailed {
                program: self.program.display().to_string(),
                status: "exit status: 0".to_string(),
                output: format!("no executable was produced at {}", built.display()),
            });
        }

        let artifact = source_dir(&script).join(&name);
        move_file(&built, &artifact).await?;

        info!(artifact = %artifact.display(), "packaged executable");
        Ok(ToolOutcome {
            artifact,
            elapsed: start.elapsed(),
        })
    }
}

impl Default for Packager {
    fn default() -> Self {
        Self::new(DEFAULT_PYINSTALLER)
    }
}

/// Move `from` to `to`, copying when they are on different filesystems.
async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    tokio::fs::copy(from, to)
        .await
        .map_err(|e| StitchError::FailedToWrite {
            path: to.to_path_buf(),
            source: e,
        })?;
    tokio::fs::remove_file(from).await?;
    Ok(())
}
