//! Defines the command-line arguments and subcommands for the TCK runner.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::runner::RunnerConfig;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "dmn-tck",
    version,
    about = "Runs decision-model TCK suites against a pluggable evaluator."
)]
pub struct TckArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Report format for the `run` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Coloured PASS/SKIP/FAIL lines.
    Console,
    /// One JSON object per report event on stdout.
    Json,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every test identity in plan order without running anything.
    List {
        /// A suite descriptor, or a directory to scan for descriptors.
        #[arg(default_value = "TestCases")]
        path: PathBuf,
        /// Only include suites whose name contains this substring.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Run every selected suite and report per-case outcomes.
    Run {
        /// A suite descriptor, or a directory to scan for descriptors.
        #[arg(default_value = "TestCases")]
        path: PathBuf,
        /// Only run suites whose name contains this substring.
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        format: ReportFormat,
        /// Disable coloured output.
        #[arg(long)]
        no_color: bool,
    },
}

impl Command {
    /// Builds the runner configuration for this subcommand.
    pub fn config(&self) -> RunnerConfig {
        match self {
            Command::List { path, filter } => RunnerConfig {
                root: path.clone(),
                filter: filter.clone(),
                ..RunnerConfig::default()
            },
            Command::Run {
                path,
                filter,
                no_color,
                ..
            } => {
                let defaults = RunnerConfig::default();
                RunnerConfig {
                    root: path.clone(),
                    filter: filter.clone(),
                    use_colors: defaults.use_colors && !no_color,
                }
            }
        }
    }
}
