//! CLI argument parsing for pdfstitch.
//!
//! This module defines the command-line interface structure using `clap`.
//! It is also compiled by the build script to render the man page, so it
//! only depends on the library.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use pdfstitch::config::{
    CompressionLevel, Config, DEFAULT_SOFFICE, OfficeConfig, OverwriteMode, TextOverflow,
};
use pdfstitch::error::{Result, StitchError};
use pdfstitch::toolchain::{DEFAULT_COMPILER, DEFAULT_PYINSTALLER};
use pdfstitch::utils::collect_paths_for_patterns;

/// Convert documents, images and text to PDF and stitch them together.
///
/// pdfstitch converts each input (PDF, Word, Excel, PowerPoint, image or
/// plain text) to PDF and concatenates the results in the order given. It
/// also wraps PyInstaller and a C compiler for one-file builds.
#[derive(Parser, Debug)]
#[command(name = "pdfstitch")]
#[command(version)]
#[command(about = "Convert documents to PDF and stitch them into a single file", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert and merge files into one PDF
    Merge(MergeArgs),
    /// Package a Python script into a single executable with PyInstaller
    Package(PackageArgs),
    /// Compile a C source file into an executable
    Compile(CompileArgs),
}

/// Shared output switches.
#[derive(Args, Debug, Clone, Default)]
pub struct Verbosity {
    /// Verbose output - show per-file progress and timings
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Input files to merge (in order)
    ///
    /// Supported: pdf, doc, docx, xls, xlsx, ppt, pptx, jpg, jpeg, png,
    /// bmp, gif, txt. Glob patterns are expanded in place.
    ///
    /// Examples:
    ///   pdfstitch merge cover.png report.docx -o out.pdf
    ///   pdfstitch merge 'scans/*.jpg' notes.txt -o out.pdf
    #[arg(value_name = "FILE", required_unless_present = "input_list")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Remove the source files after a successful merge
    #[arg(long)]
    pub delete_originals: bool,

    /// Dry run - classify inputs and show the plan without converting
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress uncompressed streams (default)
    /// - maximum: Also drop unreferenced objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Continue long text files onto additional pages instead of
    /// truncating them to one page
    #[arg(long)]
    pub paginate_text: bool,

    /// Read additional inputs from a file (one path per line)
    ///
    /// Lines starting with '#' and blank lines are ignored. Use '-' to
    /// read from stdin. Listed paths are appended after direct inputs.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// LibreOffice executable used for office documents
    #[arg(long, value_name = "PATH", env = "PDFSTITCH_SOFFICE", default_value = DEFAULT_SOFFICE)]
    pub soffice: PathBuf,

    /// Seconds allowed for converting one office document
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub office_timeout: u64,

    /// Directory in which per-job scratch directories are created
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub verbosity: Verbosity,
}

#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Python script to package
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// PyInstaller executable
    #[arg(long, value_name = "PATH", env = "PDFSTITCH_PYINSTALLER", default_value = DEFAULT_PYINSTALLER)]
    pub pyinstaller: PathBuf,

    #[command(flatten)]
    pub verbosity: Verbosity,
}

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// C source file to compile
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// C compiler executable
    #[arg(long, value_name = "PATH", env = "CC", default_value = DEFAULT_COMPILER)]
    pub compiler: PathBuf,

    #[command(flatten)]
    pub verbosity: Verbosity,
}

impl MergeArgs {
    /// Convert arguments and the resolved inputs into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is invalid or the
    /// resulting configuration fails validation.
    pub fn to_config(&self, inputs: Vec<PathBuf>) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let text_overflow = if self.paginate_text {
            TextOverflow::Paginate
        } else {
            TextOverflow::Truncate
        };

        let mut config = Config::new(inputs, self.output.clone());
        config.delete_originals = self.delete_originals;
        config.dry_run = self.dry_run;
        config.verbose = self.verbosity.verbose;
        config.quiet = self.verbosity.quiet;
        config.json = self.json;
        config.overwrite_mode = overwrite_mode;
        config.compression = compression;
        config.text_overflow = text_overflow;
        config.office = OfficeConfig {
            program: self.soffice.clone(),
            timeout: Duration::from_secs(self.office_timeout),
        };
        config.scratch_root = self.scratch_dir.clone();

        config.validate()?;
        Ok(config)
    }

    /// All input paths: direct arguments, then the input list, with glob
    /// patterns expanded in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the input list cannot be read or a pattern is
    /// malformed.
    pub async fn collect_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut patterns = self.inputs.clone();

        if let Some(ref input_list_path) = self.input_list {
            patterns.extend(read_input_list(input_list_path).await?);
        }

        collect_paths_for_patterns(patterns)
    }
}

/// Read input paths from a file.
///
/// One path or pattern per line. Lines starting with '#' are treated as
/// comments and ignored. Empty lines are skipped. `-` reads stdin.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn read_input_list(path: &Path) -> Result<Vec<String>> {
    use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

    let read_error = |e: std::io::Error| StitchError::FailedToReadInputList {
        path: path.to_path_buf(),
        source: e,
    };

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = if path.as_os_str() == "-" {
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        let file = tokio::fs::File::open(path).await.map_err(read_error)?;
        Box::new(BufReader::new(file))
    };

    let mut lines = reader.lines();
    let mut entries = Vec::new();
    while let Some(line) = lines.next_line().await.map_err(read_error)? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        entries.push(line.to_string());
    }

    Ok(entries)
}
