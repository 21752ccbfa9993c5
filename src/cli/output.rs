//! Handles all user-facing output for the CLI apart from per-case events,
//! which go through a [`ReportSink`](crate::report::ReportSink).

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostics::{write_error, HarnessError};
use crate::identity::TestPlan;
use crate::runner::Totals;

fn color_choice(use_colors: bool) -> ColorChoice {
    if use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Writes a plan listing: the suite header, then one identity per line.
pub fn write_plan(out: &mut impl Write, plan: &TestPlan) -> io::Result<()> {
    writeln!(out, "{} -> {}", plan.suite_name(), plan.model_reference())?;
    for identity in plan.identities() {
        writeln!(out, "  {identity}")?;
    }
    Ok(())
}

/// Prints the run summary to stdout.
pub fn print_totals(totals: &Totals, use_colors: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(use_colors));
    write_totals(&mut stdout, totals)?;
    stdout.flush()
}

/// Drains teardown warnings and aborted-suite errors from `totals` and
/// renders them with full miette diagnostics.
pub fn write_diagnostics(out: &mut impl Write, totals: &mut Totals) -> io::Result<()> {
    let warnings: Vec<HarnessError> = totals
        .suites
        .iter_mut()
        .flat_map(|summary| summary.warnings.drain(..))
        .collect();
    for diagnostic in warnings.into_iter().chain(totals.errors.drain(..)) {
        write_error(out, diagnostic)?;
    }
    Ok(())
}

fn write_totals(out: &mut impl WriteColor, totals: &Totals) -> io::Result<()> {
    let total = totals.passed() + totals.failed() + totals.skipped();
    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, "Test summary")?;
    out.reset()?;
    write!(out, "  suites {}, cases {}, ", totals.suites.len(), total)?;
    write_count(out, "passed", totals.passed(), Color::Green)?;
    write!(out, ", ")?;
    write_count(out, "failed", totals.failed(), Color::Red)?;
    write!(out, ", ")?;
    write_count(out, "skipped", totals.skipped(), Color::Yellow)?;
    writeln!(out)?;
    if !totals.errors.is_empty() {
        write_count(out, "  aborted suites", totals.errors.len(), Color::Red)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_count(out: &mut impl WriteColor, label: &str, count: usize, color: Color) -> io::Result<()> {
    if count > 0 {
        out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    }
    write!(out, "{label} {count}")?;
    out.reset()
}
