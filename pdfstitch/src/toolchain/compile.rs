//! C source to executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;
use tracing::info;

use super::{ToolOutcome, check_source, executable_name, run_tool, source_dir};
use crate::error::Result;

/// Default C compiler.
pub const DEFAULT_COMPILER: &str = "gcc";

/// Compiles single C source files.
#[derive(Debug, Clone)]
pub struct Compiler {
    program: PathBuf,
}

impl Compiler {
    /// Create a compiler wrapper that runs `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The compiler executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command line arguments for compiling `source` into `output`.
    pub fn arguments(&self, source: &Path, output: &Path) -> Vec<OsString> {
        vec![
            source.as_os_str().to_owned(),
            "-o".into(),
            output.as_os_str().to_owned(),
        ]
    }

    /// Compile `source` into `<source dir>/<stem><EXE_SUFFIX>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing or not a `.c` file, or if
    /// the compiler cannot be started or reports errors.
    pub async fn compile(&self, source: &Path) -> Result<ToolOutcome> {
        check_source(source, "c")?;
        let start = Instant::now();

        let artifact = source_dir(source).join(executable_name(source));
        let mut command = Command::new(&self.program);
        command.args(self.arguments(source, &artifact));
        run_tool(&self.program, command).await?;

        info!(artifact = %artifact.display(), "compiled executable");
        Ok(ToolOutcome {
            artifact,
            elapsed: start.elapsed(),
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER)
    }
}
