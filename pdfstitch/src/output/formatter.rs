//! Message formatting for the terminal.
//!
//! # Examples
//!
//! ```
//! use pdfstitch::output::formatter::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Converting 3 file(s)...");
//! formatter.success("Merged 3 file(s)");
//! formatter.warning("Skipping notes.exe: unsupported file type");
//! ```

use crate::config::Config;
use std::io::{self, IsTerminal};

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Verbose-only message.
    Debug,
}

impl MessageLevel {
    /// Prefix and ANSI colour for the level.
    fn decoration(self) -> (&'static str, &'static str) {
        match self {
            MessageLevel::Info => ("", ""),
            MessageLevel::Success => ("✓ ", "\x1b[32m"),
            MessageLevel::Warning => ("⚠ ", "\x1b[33m"),
            MessageLevel::Error => ("✗ ", "\x1b[31m"),
            MessageLevel::Debug => ("→ ", "\x1b[36m"),
        }
    }

    /// Warnings and errors go to stderr so `--json` output stays clean.
    fn is_diagnostic(self) -> bool {
        matches!(self, MessageLevel::Warning | MessageLevel::Error)
    }
}

/// Terminal output honouring quiet and verbose modes.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a formatter; colour is used when stdout is a terminal.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: io::stdout().is_terminal() && std::env::var_os("TERM").is_some(),
        }
    }

    /// Create a formatter from configuration.
    ///
    /// A dry run always prints its plan, even with `--quiet`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(!config.should_print(), config.verbose)
    }

    /// Create a quiet formatter (only warnings and errors).
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Always displayed.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Always displayed.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Only displayed in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    /// Print a `  label: value` line in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print a numbered list item; suppressed in quiet mode.
    pub fn list_item(&self, index: usize, message: &str) {
        if !self.quiet {
            println!("  {index}. {message}");
        }
    }

    /// Render `message` with the level's prefix, coloured if enabled.
    pub fn render(&self, level: MessageLevel, message: &str) -> String {
        let (prefix, color) = level.decoration();
        if self.colored && !color.is_empty() {
            format!("{color}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let line = self.render(level, message);
        if level.is_diagnostic() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    /// Whether non-diagnostic output is shown.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Whether verbose output is shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Whether quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
