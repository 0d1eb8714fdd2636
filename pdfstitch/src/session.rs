//! Interactive state: the file list, the delete-originals toggle and the
//! job driver.
//!
//! A front end (the CLI, or any UI) owns one [`Session`] and drives it. The
//! list cannot be changed while a merge runs.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::config::Config;
//! use pdfstitch::job::JobDriver;
//! use pdfstitch::session::Session;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new(vec![], PathBuf::from("merged.pdf"));
//! let mut session = Session::new(JobDriver::from_config(&config));
//! session.add_file("cover.png")?;
//! session.add_file("report.docx")?;
//!
//! let report = session.start_merge("merged.pdf")?.await??;
//! println!("{} pages", report.total_pages);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Result, StitchError};
use crate::files::{FileEntry, FileList};
use crate::job::{Job, JobDriver, JobReport, JobStatus};

/// Ordered file list plus the driver that merges it.
pub struct Session {
    files: FileList,
    delete_originals: bool,
    driver: JobDriver,
}

impl Session {
    /// Create an empty session.
    pub fn new(driver: JobDriver) -> Self {
        Self {
            files: FileList::new(),
            delete_originals: false,
            driver,
        }
    }

    /// Append a file.
    ///
    /// # Errors
    ///
    /// Fails while a job runs, and for unsupported, missing or duplicate
    /// files.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> Result<&FileEntry> {
        self.ensure_idle()?;
        self.files.add(path)
    }

    /// Append several files, keeping the accepted ones.
    ///
    /// Returns the rejections, in input order.
    ///
    /// # Errors
    ///
    /// Fails while a job runs.
    pub fn add_files<I, P>(&mut self, paths: I) -> Result<Vec<StitchError>>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.ensure_idle()?;
        Ok(self.files.add_all(paths))
    }

    /// Remove the entry at `index`.
    pub fn remove(&mut self, index: usize) -> Result<FileEntry> {
        self.ensure_idle()?;
        self.files.remove(index)
    }

    /// Move the entry at `from` to position `to`.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<()> {
        self.ensure_idle()?;
        self.files.move_entry(from, to)
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.files.clear();
        Ok(())
    }

    /// Set whether source files are removed after a successful merge.
    pub fn set_delete_originals(&mut self, delete_originals: bool) -> Result<()> {
        self.ensure_idle()?;
        self.delete_originals = delete_originals;
        Ok(())
    }

    /// Whether source files are removed after a successful merge.
    pub fn delete_originals(&self) -> bool {
        self.delete_originals
    }

    /// The file list.
    pub fn files(&self) -> &FileList {
        &self.files
    }

    /// The driver running this session's jobs.
    pub fn driver(&self) -> &JobDriver {
        &self.driver
    }

    /// Current job status.
    pub fn status(&self) -> JobStatus {
        self.driver.status()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.driver.subscribe()
    }

    /// Whether a merge is running.
    pub fn is_busy(&self) -> bool {
        self.driver.is_busy()
    }

    /// Snapshot the list as a job writing to `output`.
    pub fn job(&self, output: impl Into<PathBuf>) -> Job {
        Job::from_list(&self.files, output).with_delete_originals(self.delete_originals)
    }

    /// Start merging the current list into `output` on a tokio task.
    ///
    /// The driver is claimed before this returns, so a second call fails
    /// immediately. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::NoFilesToMerge`] for an empty list and
    /// [`StitchError::JobInProgress`] while another merge runs.
    pub fn start_merge(
        &self,
        output: impl Into<PathBuf>,
    ) -> Result<JoinHandle<Result<JobReport>>> {
        if self.files.is_empty() {
            return Err(StitchError::NoFilesToMerge);
        }

        let guard = self.driver.try_begin()?;
        let job = self.job(output);
        let driver = self.driver.clone();
        Ok(tokio::spawn(
            async move { driver.run_guarded(job, guard).await },
        ))
    }

    /// Merge the current list into `output` and wait for the result.
    ///
    /// # Errors
    ///
    /// Same as [`Session::start_merge`], plus any failure of the job.
    pub async fn merge(&self, output: impl Into<PathBuf>) -> Result<JobReport> {
        self.start_merge(output)?
            .await
            .map_err(|e| StitchError::other(format!("Merge task failed: {e}")))?
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.driver.is_busy() {
            return Err(StitchError::JobInProgress);
        }
        Ok(())
    }
}
