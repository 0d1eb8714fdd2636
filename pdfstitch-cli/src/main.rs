//! pdfstitch - Convert documents to PDF and stitch them into a single file.

mod cli;

use clap::Parser;
use std::process;
use tokio::sync::watch;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, CompileArgs, MergeArgs, PackageArgs, Verbosity};
use pdfstitch::config::{Config, OverwriteMode};
use pdfstitch::error::{Result, StitchError};
use pdfstitch::job::{JobDriver, JobStatus};
use pdfstitch::output::{
    OutputFormatter, display_plan, display_report, display_tool_outcome,
};
use pdfstitch::session::Session;
use pdfstitch::toolchain::{Compiler, Packager};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.command.verbosity());

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the verbosity flags.
fn init_tracing(verbosity: &Verbosity) {
    let default_level = if verbosity.verbose {
        "pdfstitch=debug"
    } else if verbosity.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

impl Command {
    fn verbosity(&self) -> &Verbosity {
        match self {
            Command::Merge(args) => &args.verbosity,
            Command::Package(args) => &args.verbosity,
            Command::Compile(args) => &args.verbosity,
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Merge(args) => run_merge(args).await,
        Command::Package(args) => run_package(args).await,
        Command::Compile(args) => run_compile(args).await,
    }
}

async fn run_merge(args: MergeArgs) -> Result<()> {
    let inputs = args.collect_inputs().await?;
    let config = args.to_config(inputs)?;
    debug!(inputs = config.inputs().len(), output = %config.output.display(), "resolved inputs");
    let formatter = OutputFormatter::from_config(&config);

    let mut session = Session::new(JobDriver::from_config(&config));
    session.set_delete_originals(config.delete_originals)?;
    for rejected in session.add_files(config.inputs().iter().cloned())? {
        formatter.warning(&format!("Skipping: {rejected}"));
    }
    if session.files().is_empty() {
        return Err(StitchError::NoFilesToMerge);
    }

    if config.dry_run {
        let plan = session.driver().plan(&session.job(&config.output)).await?;
        if config.json {
            let json = serde_json::to_string_pretty(&plan)
                .map_err(|e| StitchError::other(format!("Failed to serialize plan: {e}")))?;
            println!("{json}");
        } else {
            display_plan(&formatter, &plan);
        }
        return Ok(());
    }

    handle_output_overwrite(&config, &formatter).await?;

    formatter.info(&format!(
        "Merging {} file(s) into {}",
        session.files().len(),
        config.output.display()
    ));

    let progress = tokio::spawn(show_progress(session.subscribe(), formatter.clone()));
    let result = session.merge(&config.output).await;
    progress.abort();
    let report = result?;

    if config.json {
        println!("{}", report.to_json()?);
    } else {
        display_report(&formatter, &report);
    }

    Ok(())
}

/// Print each in-flight status change until the job finishes.
async fn show_progress(mut status: watch::Receiver<JobStatus>, formatter: OutputFormatter) {
    while status.changed().await.is_ok() {
        let current = status.borrow_and_update().clone();
        if current.is_finished() {
            break;
        }
        if matches!(current, JobStatus::Converting { .. }) {
            formatter.info(&format!("  {current}"));
        } else {
            formatter.debug(&current.to_string());
        }
    }
}

async fn run_package(args: PackageArgs) -> Result<()> {
    let formatter = OutputFormatter::new(args.verbosity.quiet, args.verbosity.verbose);
    formatter.info(&format!("Packaging {}...", args.script.display()));

    let outcome = Packager::new(&args.pyinstaller)
        .package(&args.script)
        .await?;
    display_tool_outcome(&formatter, "Created", &outcome);
    Ok(())
}

async fn run_compile(args: CompileArgs) -> Result<()> {
    let formatter = OutputFormatter::new(args.verbosity.quiet, args.verbosity.verbose);
    formatter.info(&format!("Compiling {}...", args.source.display()));

    let outcome = Compiler::new(&args.compiler).compile(&args.source).await?;
    display_tool_outcome(&formatter, "Compiled", &outcome);
    Ok(())
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    if !tokio::fs::try_exists(&config.output).await.unwrap_or(false) {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(StitchError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Nobody to ask; behave like --no-clobber.
            if formatter.is_quiet() || config.json {
                return Err(StitchError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| StitchError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(StitchError::Cancelled)
            }
        }
    }
}
