//! The merge job driver.
//!
//! A job walks its entries in order, converts each to an intermediate PDF,
//! merges them and writes the output:
//!
//! ```text
//! Idle -> Converting(0..n) -> Merging -> Writing -> Done
//!                 \______________\___________\_____-> Failed
//! ```
//!
//! Every transition is published on a [`tokio::sync::watch`] channel and
//! logged. Intermediate artifacts live in a per-job scratch directory that
//! is removed on every exit path, and the output is written atomically, so
//! a failed job leaves neither scratch files nor a partial output behind.
//!
//! Only one job runs at a time per driver: [`JobDriver::try_begin`] hands
//! out a [`BusyGuard`] and refuses while one is alive.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::watch;
use tokio::task;
use tracing::{error, info, warn};

use crate::classify::FileKind;
use crate::config::{CompressionLevel, Config};
use crate::convert::Converters;
use crate::error::{Result, StitchError};
use crate::files::{FileEntry, FileList};
use crate::io::{PdfReader, PdfWriter};
use crate::merge::Merger;
use crate::utils::format_file_size;

/// Progress of the current or last job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    /// No job has run yet.
    Idle,
    /// Converting the entry at `index` (0-based) of `total`.
    Converting {
        /// Position of the entry in the job.
        index: usize,
        /// Number of entries in the job.
        total: usize,
        /// File name of the entry.
        name: String,
    },
    /// Concatenating the intermediate PDFs.
    Merging {
        /// Number of intermediate PDFs.
        files: usize,
    },
    /// Writing the merged document.
    Writing {
        /// Output path.
        path: PathBuf,
    },
    /// The job finished successfully.
    Done {
        /// Output path.
        output: PathBuf,
        /// Pages in the output.
        pages: usize,
        /// Wall-clock time of the job.
        elapsed: Duration,
    },
    /// The job failed.
    Failed {
        /// Error message.
        message: String,
    },
}

impl JobStatus {
    /// Whether the job has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Failed { .. })
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Converting { index, total, name } => {
                write!(f, "Converting [{}/{total}]: {name}", index + 1)
            }
            Self::Merging { files } => write!(f, "Merging {files} PDF(s)..."),
            Self::Writing { path } => write!(f, "Writing {}", path.display()),
            Self::Done {
                output,
                pages,
                elapsed,
            } => write!(
                f,
                "Done: {pages} page(s) written to {} in {:.2}s",
                output.display(),
                elapsed.as_secs_f64()
            ),
            Self::Failed { message } => write!(f, "Failed: {message}"),
        }
    }
}

/// One merge operation: entries in order, an output path, and whether the
/// sources are removed afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    /// Entries in merge order.
    pub entries: Vec<FileEntry>,
    /// Where the merged PDF is written.
    pub output: PathBuf,
    /// Remove the source files after a successful merge.
    pub delete_originals: bool,
}

impl Job {
    /// Create a job that keeps the source files.
    pub fn new(entries: Vec<FileEntry>, output: impl Into<PathBuf>) -> Self {
        Self {
            entries,
            output: output.into(),
            delete_originals: false,
        }
    }

    /// Snapshot a file list.
    pub fn from_list(files: &FileList, output: impl Into<PathBuf>) -> Self {
        Self::new(files.entries().to_vec(), output)
    }

    /// Set whether source files are removed after a successful merge.
    pub fn with_delete_originals(mut self, delete_originals: bool) -> Self {
        self.delete_originals = delete_originals;
        self
    }
}

/// A source file that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
    /// The file.
    pub path: PathBuf,
    /// Why removal failed.
    pub reason: String,
}

/// Outcome of removing the source files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// Files that were removed.
    pub removed: Vec<PathBuf>,
    /// Files that were left in place.
    pub failed: Vec<DeletionFailure>,
}

impl DeletionReport {
    /// Whether every file was removed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Remove `paths`, continuing past failures.
pub fn delete_originals<'a>(paths: impl IntoIterator<Item = &'a Path>) -> DeletionReport {
    let mut report = DeletionReport::default();
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => report.removed.push(path.to_path_buf()),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to remove source file");
                report.failed.push(DeletionFailure {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
            }
        }
    }
    report
}

/// Summary of a successful job.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Output path.
    pub output: PathBuf,
    /// Number of inputs merged.
    pub files_merged: usize,
    /// Pages in the output.
    pub total_pages: usize,
    /// Wall-clock time of the job.
    pub elapsed: Duration,
    /// Size of the output in bytes.
    pub output_size: u64,
    /// Source removal outcome, when removal was requested.
    pub deletion: Option<DeletionReport>,
}

impl JobReport {
    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }

    /// Render the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StitchError::other(format!("Failed to serialize report: {e}")))
    }
}

/// One entry of a [`MergePlan`].
#[derive(Debug, Clone, Serialize)]
pub struct PlannedEntry {
    /// Source path.
    pub path: PathBuf,
    /// Conversion strategy.
    pub kind: FileKind,
    /// Page count, known up front for PDFs only.
    pub pages: Option<usize>,
    /// Problem found while planning, if any.
    pub problem: Option<String>,
}

/// What a job would do, without converting or writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct MergePlan {
    /// Entries in merge order.
    pub entries: Vec<PlannedEntry>,
    /// Output path.
    pub output: PathBuf,
    /// Whether the sources would be removed.
    pub delete_originals: bool,
}

impl MergePlan {
    /// Whether planning found a problem with any entry.
    pub fn has_problems(&self) -> bool {
        self.entries.iter().any(|entry| entry.problem.is_some())
    }
}

/// Marks a driver busy until dropped.
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StitchError::JobInProgress)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Runs merge jobs, one at a time.
///
/// Cloning is cheap; clones share the busy flag and the status channel.
#[derive(Clone)]
pub struct JobDriver {
    converters: Converters,
    compression: CompressionLevel,
    scratch_root: Option<PathBuf>,
    writer: PdfWriter,
    busy: Arc<AtomicBool>,
    status: Arc<watch::Sender<JobStatus>>,
}

impl JobDriver {
    /// Create a driver using `converters`.
    pub fn new(converters: Converters) -> Self {
        let (status, _) = watch::channel(JobStatus::Idle);
        Self {
            converters,
            compression: CompressionLevel::default(),
            scratch_root: None,
            writer: PdfWriter::new(),
            busy: Arc::new(AtomicBool::new(false)),
            status: Arc::new(status),
        }
    }

    /// Create a driver from a validated configuration.
    pub fn from_config(config: &Config) -> Self {
        let driver = Self::new(Converters::from_config(config)).with_compression(config.compression);
        match &config.scratch_root {
            Some(root) => driver.with_scratch_root(root),
            None => driver,
        }
    }

    /// Set the compression level of the output.
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    /// Create scratch directories under `root` instead of the system
    /// temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Current status.
    pub fn status(&self) -> JobStatus {
        self.status.borrow().clone()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.status.subscribe()
    }

    /// Whether a job is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the driver for one job.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::JobInProgress`] while another guard is alive.
    pub fn try_begin(&self) -> Result<BusyGuard> {
        BusyGuard::acquire(&self.busy)
    }

    /// Run `job` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::JobInProgress`] if a job is already running,
    /// otherwise the first error of the job. The status is `Failed` in that
    /// case.
    pub async fn run(&self, job: Job) -> Result<JobReport> {
        let guard = self.try_begin()?;
        self.run_guarded(job, guard).await
    }

    /// Run `job` under a guard obtained from [`JobDriver::try_begin`].
    ///
    /// # Errors
    ///
    /// Returns the first error of the job.
    pub async fn run_guarded(&self, job: Job, guard: BusyGuard) -> Result<JobReport> {
        let result = self.execute(&job).await;

        let last = match &result {
            Ok(report) => JobStatus::Done {
                output: report.output.clone(),
                pages: report.total_pages,
                elapsed: report.elapsed,
            },
            Err(err) => {
                error!(error = %err, output = %job.output.display(), "merge job failed");
                JobStatus::Failed {
                    message: err.to_string(),
                }
            }
        };
        self.finish(last, guard);

        result
    }

    /// Classify `job` and count PDF pages without converting anything.
    ///
    /// # Errors
    ///
    /// Returns an error only if the planning task itself fails; problems
    /// with individual entries are recorded in the plan.
    pub async fn plan(&self, job: &Job) -> Result<MergePlan> {
        let entries = job.entries.clone();
        let planned = task::spawn_blocking(move || {
            let reader = PdfReader::new();
            entries
                .into_iter()
                .map(|entry| {
                    let (pages, problem) = match entry.kind {
                        FileKind::Pdf => match reader.page_count(&entry.path) {
                            Ok(pages) => (Some(pages), None),
                            Err(err) => (None, Some(err.to_string())),
                        },
                        _ => (None, None),
                    };
                    PlannedEntry {
                        path: entry.path,
                        kind: entry.kind,
                        pages,
                        problem,
                    }
                })
                .collect()
        })
        .await
        .map_err(|e| StitchError::other(format!("Planning task failed: {e}")))?;

        Ok(MergePlan {
            entries: planned,
            output: job.output.clone(),
            delete_originals: job.delete_originals,
        })
    }

    async fn execute(&self, job: &Job) -> Result<JobReport> {
        if job.entries.is_empty() {
            return Err(StitchError::NoFilesToMerge);
        }
        check_output_is_not_an_input(job)?;

        let start = Instant::now();
        let scratch = self.create_scratch()?;
        let total = job.entries.len();
        let mut artifacts = Vec::with_capacity(total);

        for (index, entry) in job.entries.iter().enumerate() {
            self.publish(JobStatus::Converting {
                index,
                total,
                name: entry.file_name(),
            });

            let converters = self.converters.clone();
            let entry = entry.clone();
            let dir = scratch.path().to_path_buf();
            let artifact = task::spawn_blocking(move || converters.convert(index, &entry, &dir))
                .await
                .map_err(|e| StitchError::other(format!("Conversion task failed: {e}")))??;
            artifacts.push(artifact);
        }

        self.publish(JobStatus::Merging { files: total });
        let merger = Merger::new().with_compression(self.compression);
        let merged = task::spawn_blocking(move || merger.merge_files(&artifacts))
            .await
            .map_err(|e| StitchError::merge_failed(format!("Merge task failed: {e}")))??;

        self.publish(JobStatus::Writing {
            path: job.output.clone(),
        });
        let write_stats = self.writer.save(merged.document, &job.output).await?;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(err) = scratch.close() {
            warn!(path = %scratch_path.display(), error = %err, "failed to remove scratch directory");
        }

        let deletion = if job.delete_originals {
            let paths: Vec<PathBuf> = job.entries.iter().map(|e| e.path.clone()).collect();
            let report = task::spawn_blocking(move || {
                delete_originals(paths.iter().map(PathBuf::as_path))
            })
            .await
            .map_err(|e| StitchError::other(format!("Deletion task failed: {e}")))?;
            info!(
                removed = report.removed.len(),
                failed = report.failed.len(),
                "removed source files"
            );
            Some(report)
        } else {
            None
        };

        Ok(JobReport {
            output: job.output.clone(),
            files_merged: merged.statistics.files_merged,
            total_pages: merged.statistics.total_pages,
            elapsed: start.elapsed(),
            output_size: write_stats.file_size,
            deletion,
        })
    }

    fn create_scratch(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("pdfstitch-");
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(scratch)
    }

    fn publish(&self, status: JobStatus) {
        info!("{status}");
        self.status.send_replace(status);
    }

    /// Release the driver and publish the final status in one step.
    ///
    /// Both happen under the channel's write lock, so a receiver that sees
    /// `Done` or `Failed` also sees the driver idle, and a job started
    /// right after cannot have its first status overwritten.
    fn finish(&self, status: JobStatus, guard: BusyGuard) {
        info!("{status}");
        self.status.send_modify(move |current| {
            drop(guard);
            *current = status;
        });
    }
}

fn check_output_is_not_an_input(job: &Job) -> Result<()> {
    let Ok(output) = std::fs::canonicalize(&job.output) else {
        return Ok(());
    };
    if job
        .entries
        .iter()
        .any(|entry| entry.canonical_path() == output)
    {
        return Err(StitchError::invalid_config(format!(
            "Output file cannot be the same as an input file: {}",
            job.output.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::OfficeKind;
    use crate::convert::OfficeRenderer;
    use crate::io::test_support::write_blank_pdf;
    use tempfile::TempDir;

    struct FailingRenderer;

    impl OfficeRenderer for FailingRenderer {
        fn render(&self, source: &Path, _kind: OfficeKind, _target: &Path) -> Result<()> {
            Err(StitchError::conversion_failed(
                source.to_path_buf(),
                "rendering is disabled in tests",
            ))
        }
    }

    fn driver() -> JobDriver {
        JobDriver::new(Converters::new(Arc::new(FailingRenderer)))
    }

    fn pdf_entry(dir: &TempDir, name: &str, pages: usize) -> FileEntry {
        let path = dir.path().join(name);
        write_blank_pdf(&path, pages);
        FileEntry::new(path).unwrap()
    }

    #[test]
    fn test_status_display() {
        let status = JobStatus::Converting {
            index: 0,
            total: 3,
            name: "a.png".to_string(),
        };
        assert_eq!(status.to_string(), "Converting [1/3]: a.png");
        assert_eq!(
            JobStatus::Failed {
                message: "boom".to_string()
            }
            .to_string(),
            "Failed: boom"
        );
        assert!(!JobStatus::Merging { files: 2 }.is_finished());
    }

    #[test]
    fn test_busy_guard_is_exclusive() {
        let driver = driver();
        let guard = driver.try_begin().unwrap();
        assert!(driver.is_busy());
        assert!(matches!(
            driver.clone().try_begin(),
            Err(StitchError::JobInProgress)
        ));

        drop(guard);
        assert!(!driver.is_busy());
        assert!(driver.try_begin().is_ok());
    }

    #[tokio::test]
    async fn test_run_merges_and_reports() {
        let dir = TempDir::new().unwrap();
        let job = Job::new(
            vec![pdf_entry(&dir, "a.pdf", 1), pdf_entry(&dir, "b.pdf", 2)],
            dir.path().join("out.pdf"),
        );

        let driver = driver();
        let mut status = driver.subscribe();
        let report = driver.run(job).await.unwrap();

        assert_eq!(report.files_merged, 2);
        assert_eq!(report.total_pages, 3);
        assert!(report.output_size > 0);
        assert!(report.deletion.is_none());
        assert!(!driver.is_busy());

        assert!(status.has_changed().unwrap());
        assert!(matches!(
            *status.borrow_and_update(),
            JobStatus::Done { pages: 3, .. }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_driver_is_free_once_finished_status_is_seen() {
        let dir = TempDir::new().unwrap();
        let entry = pdf_entry(&dir, "a.pdf", 1);

        for round in 0..50 {
            let driver = driver();
            let mut status = driver.subscribe();
            let job = Job::new(vec![entry.clone()], dir.path().join(format!("out{round}.pdf")));

            let runner = driver.clone();
            let handle = tokio::spawn(async move { runner.run(job).await });

            status.wait_for(JobStatus::is_finished).await.unwrap();
            assert!(!driver.is_busy(), "round {round}: busy after finished status");
            assert!(driver.try_begin().is_ok(), "round {round}: refused after finished status");

            handle.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn test_failure_publishes_failed_status() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("letter.docx");
        std::fs::write(&doc, b"x").unwrap();
        let output = dir.path().join("out.pdf");
        let job = Job::new(
            vec![pdf_entry(&dir, "a.pdf", 1), FileEntry::new(&doc).unwrap()],
            &output,
        );

        let driver = driver();
        let err = driver.run(job).await.unwrap_err();

        assert!(matches!(err, StitchError::ConversionFailed { .. }));
        assert!(matches!(driver.status(), JobStatus::Failed { .. }));
        assert!(!output.exists());
        assert!(!driver.is_busy());
    }

    #[tokio::test]
    async fn test_empty_job() {
        let dir = TempDir::new().unwrap();
        let err = driver()
            .run(Job::new(Vec::new(), dir.path().join("out.pdf")))
            .await
            .unwrap_err();
        assert!(matches!(err, StitchError::NoFilesToMerge));
    }

    #[tokio::test]
    async fn test_output_may_not_be_an_input() {
        let dir = TempDir::new().unwrap();
        let entry = pdf_entry(&dir, "a.pdf", 1);
        let job = Job::new(vec![entry.clone()], entry.path.clone());

        let err = driver().run(job).await.unwrap_err();
        assert!(matches!(err, StitchError::InvalidConfig { .. }));
    }

    #[test]
    fn test_delete_originals_is_best_effort() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();
        let missing = dir.path().join("missing.txt");
        let folder = dir.path().join("folder");
        std::fs::create_dir(&folder).unwrap();

        let report = delete_originals([
            a.as_path(),
            missing.as_path(),
            folder.as_path(),
            b.as_path(),
        ]);

        assert_eq!(report.removed, vec![a.clone(), b.clone()]);
        assert_eq!(report.failed.len(), 2);
        assert!(!report.is_complete());
        assert!(!a.exists() && !b.exists());
        assert!(folder.exists());
    }

    #[tokio::test]
    async fn test_plan_counts_pdf_pages() {
        let dir = TempDir::new().unwrap();
        let text = dir.path().join("c.txt");
        std::fs::write(&text, "hello").unwrap();
        let job = Job::new(
            vec![pdf_entry(&dir, "b.pdf", 3), FileEntry::new(&text).unwrap()],
            dir.path().join("out.pdf"),
        );

        let plan = driver().plan(&job).await.unwrap();
        assert_eq!(plan.entries[0].pages, Some(3));
        assert_eq!(plan.entries[1].kind, FileKind::Text);
        assert_eq!(plan.entries[1].pages, None);
        assert!(!plan.has_problems());
        assert!(!dir.path().join("out.pdf").exists());
    }

    #[test]
    fn test_report_json() {
        let report = JobReport {
            output: PathBuf::from("out.pdf"),
            files_merged: 2,
            total_pages: 5,
            elapsed: Duration::from_millis(1500),
            output_size: 2048,
            deletion: None,
        };
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["total_pages"], 5);
        assert_eq!(json["output"], "out.pdf");
        assert_eq!(report.format_output_size(), "2.00 KB");
    }
}
