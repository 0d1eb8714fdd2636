//! Configuration module for pdfstitch.
//!
//! This module holds the validated, normalized settings that drive a merge
//! job. The CLI builds a [`Config`] from its arguments; library users can
//! construct one directly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, StitchError};

/// Default program used for office document conversion.
pub const DEFAULT_SOFFICE: &str = "soffice";

/// Default time allowed for a single office document conversion.
pub const DEFAULT_OFFICE_TIMEOUT: Duration = Duration::from_secs(120);

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Compress uncompressed streams.
    #[default]
    Standard,
    /// Compress and drop unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = StitchError;

    /// Parse compression level from "none", "standard" or "maximum".
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(StitchError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// What the text converter does with lines that do not fit on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOverflow {
    /// Render a single page and drop the lines that do not fit.
    #[default]
    Truncate,
    /// Continue onto as many pages as needed.
    Paginate,
}

/// Settings for the office automation environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeConfig {
    /// LibreOffice executable (`soffice`), looked up on `PATH` when relative.
    pub program: PathBuf,
    /// Upper bound for one document conversion.
    pub timeout: Duration,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_SOFFICE),
            timeout: DEFAULT_OFFICE_TIMEOUT,
        }
    }
}

/// Complete configuration for a merge operation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input file paths (in merge order).
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Remove the source files after a successful merge.
    pub delete_originals: bool,

    /// Dry run mode - classify inputs without converting or writing.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Print the final report as JSON.
    pub json: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Text converter overflow behavior.
    pub text_overflow: TextOverflow,

    /// Office automation settings.
    pub office: OfficeConfig,

    /// Directory in which per-job scratch directories are created
    /// (system temp dir when `None`).
    pub scratch_root: Option<PathBuf>,
}

impl Config {
    /// Create a configuration with defaults for everything but the paths.
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf) -> Self {
        Self {
            inputs,
            output,
            delete_originals: false,
            dry_run: false,
            verbose: false,
            quiet: false,
            json: false,
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            text_overflow: TextOverflow::default(),
            office: OfficeConfig::default(),
            scratch_root: None,
        }
    }

    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - The output path is also an input
    /// - The office timeout is zero
    /// - The scratch root is not an existing directory
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(StitchError::NoFilesToMerge);
        }

        if self.verbose && self.quiet {
            return Err(StitchError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if self.inputs.iter().any(|input| input == &self.output) {
            return Err(StitchError::invalid_config(format!(
                "Output file cannot be the same as an input file: {}",
                self.output.display()
            )));
        }

        if self.office.timeout.is_zero() {
            return Err(StitchError::invalid_config(
                "Office conversion timeout must be at least 1 second",
            ));
        }

        if let Some(root) = &self.scratch_root
            && !root.is_dir()
        {
            return Err(StitchError::invalid_config(format!(
                "Scratch directory does not exist: {}",
                root.display()
            )));
        }

        Ok(())
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
