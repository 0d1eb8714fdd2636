//! User-facing output: plans, reports and status lines.
//!
//! Diagnostics go through `tracing`; this module is what a person reads.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::output::OutputFormatter;
//! use pdfstitch::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Starting merge");
//! formatter.success("Merge completed");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::job::{DeletionReport, JobReport, MergePlan, PlannedEntry};
use crate::toolchain::ToolOutcome;

/// One plan line: `name [kind, N page(s)]`, plus the problem if any.
pub fn describe_planned_entry(entry: &PlannedEntry) -> String {
    let name = entry
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| entry.path.display().to_string());

    let mut line = match entry.pages {
        Some(pages) => format!("{name} [{}, {pages} page(s)]", entry.kind),
        None => format!("{name} [{}]", entry.kind),
    };
    if let Some(problem) = &entry.problem {
        line.push_str(" - ");
        line.push_str(problem);
    }
    line
}

/// Display a dry-run plan.
pub fn display_plan(formatter: &OutputFormatter, plan: &MergePlan) {
    formatter.info(&format!(
        "Dry run: would merge {} file(s) into {}",
        plan.entries.len(),
        plan.output.display()
    ));
    for (i, entry) in plan.entries.iter().enumerate() {
        formatter.list_item(i + 1, &describe_planned_entry(entry));
    }

    let known_pages: usize = plan.entries.iter().filter_map(|e| e.pages).sum();
    formatter.detail("Known pages", &known_pages.to_string());
    if plan.delete_originals {
        formatter.info("Source files would be removed afterwards");
    }
    if plan.has_problems() {
        formatter.warning("Some inputs would fail; see above");
    }
}

/// Display a finished job.
pub fn display_report(formatter: &OutputFormatter, report: &JobReport) {
    formatter.success(&format!(
        "Merged {} file(s) into {} ({} page(s), {})",
        report.files_merged,
        report.output.display(),
        report.total_pages,
        report.format_output_size()
    ));
    formatter.detail("Time", &format!("{:.2}s", report.elapsed.as_secs_f64()));

    if let Some(deletion) = &report.deletion {
        display_deletion_report(formatter, deletion);
    }
}

/// Display the outcome of removing source files.
pub fn display_deletion_report(formatter: &OutputFormatter, report: &DeletionReport) {
    if !report.removed.is_empty() {
        formatter.info(&format!("Removed {} source file(s)", report.removed.len()));
    }
    for failure in &report.failed {
        formatter.warning(&format!(
            "Could not remove {}: {}",
            failure.path.display(),
            failure.reason
        ));
    }
}

/// Display a packaged or compiled executable.
pub fn display_tool_outcome(formatter: &OutputFormatter, verb: &str, outcome: &ToolOutcome) {
    formatter.success(&format!("{verb} {}", outcome.artifact.display()));
    formatter.detail("Time", &format!("{:.2}s", outcome.elapsed.as_secs_f64()));
}
