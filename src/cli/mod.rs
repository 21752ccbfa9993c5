//! The TCK runner command-line interface.
//!
//! Vendor crates get the full CLI for their evaluator by calling
//! [`run_with`] from their own `main`:
//!
//! ```rust,no_run
//! use dmn_tck_runner::{cli, DryRun};
//!
//! std::process::exit(cli::run_with(&DryRun));
//! ```

use std::io;

use clap::Parser;

use crate::cli::args::{Command, ReportFormat, TckArgs};
use crate::diagnostics::{print_error, HarnessError};
use crate::evaluator::Evaluator;
use crate::report::{ConsoleReporter, JsonLinesSink};
use crate::runner::{TckRunner, Totals};

pub mod args;
pub mod output;

/// Parses the process arguments and runs the CLI. Returns the exit status.
pub fn run_with<E: Evaluator + ?Sized>(evaluator: &E) -> i32 {
    execute(TckArgs::parse(), evaluator)
}

/// Runs already-parsed arguments. Returns the exit status.
pub fn execute<E: Evaluator + ?Sized>(args: TckArgs, evaluator: &E) -> i32 {
    let runner = TckRunner::new(args.command.config());
    match args.command {
        Command::List { .. } => list(&runner),
        Command::Run { format, .. } => run(&runner, evaluator, format),
    }
}

fn list(runner: &TckRunner) -> i32 {
    let plans = match runner.plans() {
        Ok(plans) => plans,
        Err(e) => {
            print_error(e);
            return 1;
        }
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut status = 0;
    for plan in plans {
        match plan {
            Ok(plan) => {
                if let Err(source) = output::write_plan(&mut out, &plan) {
                    print_error(HarnessError::Report { source });
                    return 1;
                }
            }
            Err(e) => {
                print_error(e);
                status = 1;
            }
        }
    }
    status
}

fn run<E: Evaluator + ?Sized>(runner: &TckRunner, evaluator: &E, format: ReportFormat) -> i32 {
    let use_colors = runner.config().use_colors;
    match format {
        ReportFormat::Console => {
            let mut sink = ConsoleReporter::new(use_colors);
            let outcome = runner.run_all(evaluator, &mut sink);
            let sink_error = sink.take_error();
            finish(outcome, sink_error, |totals| output::print_totals(totals, use_colors))
        }
        ReportFormat::Json => {
            let mut sink = JsonLinesSink::new(io::stdout());
            let outcome = runner.run_all(evaluator, &mut sink);
            let sink_error = sink.take_error();
            finish(outcome, sink_error, |_| Ok(()))
        }
    }
}

/// Prints the summary and every diagnostic of a run, and picks the exit
/// status. Report output that could not be written fails the run.
fn finish(
    outcome: Result<Totals, HarnessError>,
    sink_error: Option<io::Error>,
    summary: impl FnOnce(&Totals) -> io::Result<()>,
) -> i32 {
    let mut report_error = sink_error;
    let mut status = match outcome {
        Ok(mut totals) => {
            let code = totals.exit_code();
            if let Err(e) = summary(&totals) {
                report_error = report_error.or(Some(e));
            }
            let _ = output::write_diagnostics(&mut io::stderr(), &mut totals);
            code
        }
        Err(e) => {
            print_error(e);
            1
        }
    };
    if let Some(source) = report_error {
        print_error(HarnessError::Report { source });
        status = 1;
    }
    status
}
