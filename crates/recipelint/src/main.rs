/*
 * main.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * recipelint command-line entry point.
 */

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use recipelint_core::{LintOptions, RecipeInput, RunReport, lint};
use recipelint_error_reporting::OutputFormat;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Name reported for a recipe read from standard input.
const STDIN_NAME: &str = "<stdin>";

#[derive(Parser)]
#[command(name = "recipelint")]
#[command(version)]
#[command(about = "Lint alidist build recipes", long_about = None)]
struct Cli {
    /// Don't run shellcheck on recipe scripts
    #[arg(short = 'S', long)]
    no_shellcheck: bool,

    /// Don't run the built-in script checks
    #[arg(short = 'L', long)]
    no_scriptlint: bool,

    /// Don't run yamllint on recipe headers
    #[arg(short = 'Y', long)]
    no_yamllint: bool,

    /// Don't run the built-in header checks
    #[arg(short = 'H', long)]
    no_headerlint: bool,

    /// Format of the printed diagnostics
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Gcc)]
    format: Format,

    /// shellcheck executable to use
    #[arg(long, value_name = "PROG", default_value = "shellcheck")]
    shellcheck: PathBuf,

    /// yamllint executable to use
    #[arg(long, value_name = "PROG", default_value = "yamllint")]
    yamllint: PathBuf,

    /// Recipe files to lint ("-" reads standard input)
    #[arg(value_name = "RECIPE", required = true)]
    recipes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// file:line:column: level: message
    Gcc,
    /// GitHub Actions workflow commands
    Github,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Gcc => OutputFormat::Gcc,
            Format::Github => OutputFormat::Github,
        }
    }
}

impl Cli {
    fn options(&self) -> LintOptions {
        LintOptions {
            headerlint: !self.no_headerlint,
            scriptlint: !self.no_scriptlint,
            yamllint: !self.no_yamllint,
            shellcheck: !self.no_shellcheck,
            yamllint_program: self.yamllint.clone(),
            shellcheck_program: self.shellcheck.clone(),
        }
    }
}

fn read_input(name: &str) -> Result<RecipeInput> {
    if name == "-" {
        let mut content = Vec::new();
        io::stdin()
            .read_to_end(&mut content)
            .context("failed to read recipe from standard input")?;
        return Ok(RecipeInput::new(STDIN_NAME, content));
    }
    let content = std::fs::read(name).with_context(|| format!("failed to read {}", name))?;
    Ok(RecipeInput::new(name, content))
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries only diagnostics.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipelint=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let inputs = cli
        .recipes
        .iter()
        .map(|name| read_input(name))
        .collect::<Result<Vec<_>>>()?;
    debug!(files = inputs.len(), "read recipes");

    let format = OutputFormat::from(cli.format);
    let mut out = BufWriter::new(io::stdout().lock());
    let mut printing = true;
    let report = lint(&inputs, &cli.options(), |diagnostic| {
        if !printing {
            return;
        }
        if let Err(err) = writeln!(out, "{}", format.format(&diagnostic)) {
            // Keep consuming so the exit status still reflects every diagnostic.
            if err.kind() != io::ErrorKind::BrokenPipe {
                warn!(error = %err, "failed to write diagnostic");
            }
            printing = false;
        }
    });
    if printing
        && let Err(err) = out.flush()
        && err.kind() != io::ErrorKind::BrokenPipe
    {
        warn!(error = %err, "failed to write diagnostics");
    }

    Ok(ExitCode::from(exit_status(&report)))
}

/// Exit status for a finished run.
///
/// 1 if any error-level diagnostic was emitted, 0 otherwise, except that a
/// run where a checker failed internally (tool output it could not read, a
/// panic) and that emitted no error exits with 2. Such a failure means some
/// diagnostics may be missing, so a clean 0 would be wrong, and it must not
/// look like a lint error either.
fn exit_status(report: &RunReport) -> u8 {
    if report.have_error {
        1
    } else if report.has_failures() {
        2
    } else {
        0
    }
}
