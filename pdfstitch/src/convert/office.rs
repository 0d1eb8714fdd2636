//! Office document rendering.
//!
//! Word processing documents, spreadsheets and presentations are rendered
//! by an external office suite. [`OfficeRenderer`] is the seam: the job
//! only needs "turn this document into a PDF at that path", and tests swap
//! in a fake.
//!
//! [`LibreOfficeRenderer`] drives `soffice` in headless mode. Every call
//! gets a throw-away user profile so it neither collides with a running
//! LibreOffice instance nor leaves state behind. The process runs under
//! `tokio::process` and is killed if it outlives the configured timeout.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tokio::runtime::{self, Handle, RuntimeFlavor};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::classify::OfficeKind;
use crate::config::OfficeConfig;
use crate::error::{Result, StitchError};

/// Renders an office document to PDF.
pub trait OfficeRenderer: Send + Sync {
    /// Render `source`, a document of family `kind`, into a PDF at `target`.
    ///
    /// # Errors
    ///
    /// Implementations return [`StitchError::OfficeUnavailable`] when the
    /// rendering environment cannot be started and
    /// [`StitchError::ConversionFailed`] when the document cannot be
    /// rendered.
    fn render(&self, source: &Path, kind: OfficeKind, target: &Path) -> Result<()>;
}

/// Renders office documents with LibreOffice (`soffice --headless`).
#[derive(Debug, Clone, Default)]
pub struct LibreOfficeRenderer {
    config: OfficeConfig,
}

impl LibreOfficeRenderer {
    /// Create a renderer with the given program and timeout.
    pub fn new(config: OfficeConfig) -> Self {
        Self { config }
    }

    /// The `soffice` executable in use.
    pub fn program(&self) -> &Path {
        &self.config.program
    }

    /// PDF export filter for a document family.
    pub fn export_filter(kind: OfficeKind) -> &'static str {
        match kind {
            OfficeKind::Word => "writer_pdf_Export",
            OfficeKind::Spreadsheet => "calc_pdf_Export",
            OfficeKind::Presentation => "impress_pdf_Export",
        }
    }

    /// Command line arguments for one conversion.
    pub fn arguments(
        &self,
        source: &Path,
        kind: OfficeKind,
        out_dir: &Path,
        profile_dir: &Path,
    ) -> Vec<OsString> {
        let mut user_installation = OsString::from("-env:UserInstallation=");
        user_installation.push(file_url(profile_dir));

        let mut convert_to = OsString::from("pdf:");
        convert_to.push(Self::export_filter(kind));

        vec![
            "--headless".into(),
            "--norestore".into(),
            "--nolockcheck".into(),
            user_installation,
            "--convert-to".into(),
            convert_to,
            "--outdir".into(),
            out_dir.as_os_str().to_owned(),
            source.as_os_str().to_owned(),
        ]
    }

    fn unavailable(&self, reason: impl Into<String>) -> StitchError {
        StitchError::OfficeUnavailable {
            program: self.config.program.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl OfficeRenderer for LibreOfficeRenderer {
    fn render(&self, source: &Path, kind: OfficeKind, target: &Path) -> Result<()> {
        // Work next to the target so the final rename stays on one filesystem.
        let work_root = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let work = tempfile::Builder::new()
            .prefix("soffice-")
            .tempdir_in(&work_root)?;
        let out_dir = work.path().join("out");
        let profile_dir = work.path().join("profile");
        std::fs::create_dir_all(&out_dir)?;

        let stderr_path = work.path().join("stderr.log");
        let stderr = File::create(&stderr_path)?;

        let mut command = Command::new(&self.config.program);
        command
            .args(self.arguments(source, kind, &out_dir, &profile_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(stderr)
            .kill_on_drop(true);

        debug!(
            program = %self.config.program.display(),
            source = %source.display(),
            filter = Self::export_filter(kind),
            "starting office conversion"
        );

        let status = block_on(self.run_to_completion(command, source))??;

        if !status.success() {
            let diagnostics = std::fs::read_to_string(&stderr_path).unwrap_or_default();
            let mut reason = format!("{} exited with {status}", self.config.program.display());
            let diagnostics = diagnostics.trim();
            if !diagnostics.is_empty() {
                reason.push_str(": ");
                reason.push_str(diagnostics);
            }
            return Err(StitchError::conversion_failed(source.to_path_buf(), reason));
        }

        let produced = out_dir.join(produced_name(source));
        if !produced.is_file() {
            return Err(StitchError::conversion_failed(
                source.to_path_buf(),
                "the office suite produced no PDF (is the document password protected?)",
            ));
        }

        std::fs::rename(&produced, target)?;
        Ok(())
    }
}

impl LibreOfficeRenderer {
    /// Spawn `command` and wait for it, killing it after the timeout.
    async fn run_to_completion(&self, mut command: Command, source: &Path) -> Result<ExitStatus> {
        let mut child = command
            .spawn()
            .map_err(|e| self.unavailable(e.to_string()))?;

        match timeout(self.config.timeout, child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                if let Err(err) = child.kill().await {
                    warn!(error = %err, "failed to kill office process");
                }
                Err(StitchError::conversion_failed(
                    source.to_path_buf(),
                    format!(
                        "{} did not finish within {}s",
                        self.config.program.display(),
                        self.config.timeout.as_secs()
                    ),
                ))
            }
        }
    }
}

/// Drive `future` from synchronous code.
///
/// Converters run on the blocking pool. A multi-threaded runtime keeps
/// driving process and timer events from its workers, so its handle is
/// reused; otherwise a private current-thread runtime is built.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            Ok(handle.block_on(future))
        }
        _ => {
            let runtime = runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            Ok(runtime.block_on(future))
        }
    }
}

/// Name LibreOffice gives the exported file: the source stem plus `.pdf`.
fn produced_name(source: &Path) -> OsString {
    let mut name = source
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_default();
    name.push(".pdf");
    name
}

fn file_url(path: &Path) -> OsString {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let text = path.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{text}").into()
    } else {
        format!("file:///{text}").into()
    }
}
