//! Report sink protocol and the built-in sinks.
//!
//! A sink receives, for every case, one `test_started` event followed by
//! exactly one terminal event (`test_passed`, `test_skipped` or `test_failed`).
//! Suite-level bracketing events default to no-ops.

use std::io::{self, Write};
use std::time::Duration;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostics::HarnessError;
use crate::identity::TestIdentity;

/// Consumer of per-case report events.
pub trait ReportSink {
    fn suite_started(&mut self, _suite: &str, _case_count: usize) {}

    fn test_started(&mut self, identity: &TestIdentity);

    fn test_passed(&mut self, identity: &TestIdentity);

    fn test_skipped(&mut self, identity: &TestIdentity);

    fn test_failed(&mut self, identity: &TestIdentity, message: &str);

    fn suite_finished(&mut self, _summary: &RunSummary) {}
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn suite_started(&mut self, suite: &str, case_count: usize) {
        (**self).suite_started(suite, case_count)
    }
    fn test_started(&mut self, identity: &TestIdentity) {
        (**self).test_started(identity)
    }
    fn test_passed(&mut self, identity: &TestIdentity) {
        (**self).test_passed(identity)
    }
    fn test_skipped(&mut self, identity: &TestIdentity) {
        (**self).test_skipped(identity)
    }
    fn test_failed(&mut self, identity: &TestIdentity, message: &str) {
        (**self).test_failed(identity, message)
    }
    fn suite_finished(&mut self, summary: &RunSummary) {
        (**self).suite_finished(summary)
    }
}

// =============================================================================
// RUN SUMMARY
// =============================================================================

/// Counts and warnings for one completed suite run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub suite: String,
    pub passed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Teardown failures. They never change a case classification.
    pub warnings: Vec<HarnessError>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            ..Self::default()
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.skipped + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

// =============================================================================
// RECORDED EVENTS
// =============================================================================

/// A report event as data, for recording and serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent {
    SuiteStarted {
        suite: String,
        case_count: usize,
    },
    Started {
        test: String,
    },
    Passed {
        test: String,
    },
    Skipped {
        test: String,
    },
    Failed {
        test: String,
        message: String,
    },
    SuiteFinished {
        suite: String,
        passed: usize,
        skipped: usize,
        failed: usize,
        warnings: usize,
    },
}

impl ReportEvent {
    /// True for the pass/skip/fail events that close a started case.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReportEvent::Passed { .. } | ReportEvent::Skipped { .. } | ReportEvent::Failed { .. }
        )
    }

    fn finished(summary: &RunSummary) -> Self {
        ReportEvent::SuiteFinished {
            suite: summary.suite.clone(),
            passed: summary.passed,
            skipped: summary.skipped,
            failed: summary.failed,
            warnings: summary.warnings.len(),
        }
    }
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<ReportEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-level events only, without suite bracketing.
    pub fn case_events(&self) -> Vec<&ReportEvent> {
        self.events
            .iter()
            .filter(|e| {
                !matches!(
                    e,
                    ReportEvent::SuiteStarted { .. } | ReportEvent::SuiteFinished { .. }
                )
            })
            .collect()
    }
}

impl ReportSink for RecordingSink {
    fn suite_started(&mut self, suite: &str, case_count: usize) {
        self.events.push(ReportEvent::SuiteStarted {
            suite: suite.to_string(),
            case_count,
        });
    }

    fn test_started(&mut self, identity: &TestIdentity) {
        self.events.push(ReportEvent::Started {
            test: identity.to_string(),
        });
    }

    fn test_passed(&mut self, identity: &TestIdentity) {
        self.events.push(ReportEvent::Passed {
            test: identity.to_string(),
        });
    }

    fn test_skipped(&mut self, identity: &TestIdentity) {
        self.events.push(ReportEvent::Skipped {
            test: identity.to_string(),
        });
    }

    fn test_failed(&mut self, identity: &TestIdentity, message: &str) {
        self.events.push(ReportEvent::Failed {
            test: identity.to_string(),
            message: message.to_string(),
        });
    }

    fn suite_finished(&mut self, summary: &RunSummary) {
        self.events.push(ReportEvent::finished(summary));
    }
}

// =============================================================================
// JSON LINES
// =============================================================================

/// Writes one JSON object per event.
///
/// Sink methods cannot fail, so the first write error is kept and later
/// events are dropped. Check [`JsonLinesSink::take_error`] after the run.
pub struct JsonLinesSink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: ReportEvent) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, &event)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(e) = result {
            self.error = Some(e);
        }
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn suite_started(&mut self, suite: &str, case_count: usize) {
        self.write_event(ReportEvent::SuiteStarted {
            suite: suite.to_string(),
            case_count,
        });
    }

    fn test_started(&mut self, identity: &TestIdentity) {
        self.write_event(ReportEvent::Started {
            test: identity.to_string(),
        });
    }

    fn test_passed(&mut self, identity: &TestIdentity) {
        self.write_event(ReportEvent::Passed {
            test: identity.to_string(),
        });
    }

    fn test_skipped(&mut self, identity: &TestIdentity) {
        self.write_event(ReportEvent::Skipped {
            test: identity.to_string(),
        });
    }

    fn test_failed(&mut self, identity: &TestIdentity, message: &str) {
        self.write_event(ReportEvent::Failed {
            test: identity.to_string(),
            message: message.to_string(),
        });
    }

    fn suite_finished(&mut self, summary: &RunSummary) {
        self.write_event(ReportEvent::finished(summary));
        if self.error.is_none() {
            if let Err(e) = self.out.flush() {
                self.error = Some(e);
            }
        }
    }
}

// =============================================================================
// CONSOLE
// =============================================================================

/// Coloured PASS/SKIP/FAIL lines on stdout, failures detailed on stderr.
///
/// Like [`JsonLinesSink`], the first write error is kept and later output is
/// dropped. Check [`ConsoleReporter::take_error`] after the run.
pub struct ConsoleReporter<W: WriteColor = StandardStream> {
    stdout: W,
    stderr: W,
    error: Option<io::Error>,
}

impl ConsoleReporter {
    pub fn new(use_colors: bool) -> Self {
        let choice = if use_colors {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::with_writers(StandardStream::stdout(choice), StandardStream::stderr(choice))
    }
}

impl<W: WriteColor> ConsoleReporter<W> {
    pub fn with_writers(stdout: W, stderr: W) -> Self {
        Self {
            stdout,
            stderr,
            error: None,
        }
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_writers(self) -> (W, W) {
        (self.stdout, self.stderr)
    }

    fn record(&mut self, write: impl FnOnce(&mut W, &mut W) -> io::Result<()>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = write(&mut self.stdout, &mut self.stderr) {
            self.error = Some(e);
        }
    }
}

fn write_tag(out: &mut impl WriteColor, tag: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{tag}")?;
    out.reset()
}

impl<W: WriteColor> ReportSink for ConsoleReporter<W> {
    fn suite_started(&mut self, suite: &str, case_count: usize) {
        self.record(|out, _| writeln!(out, "Running {suite} ({case_count} cases)"));
    }

    fn test_started(&mut self, _identity: &TestIdentity) {}

    fn test_passed(&mut self, identity: &TestIdentity) {
        self.record(|out, _| {
            write_tag(out, "PASS", Color::Green)?;
            writeln!(out, ": {identity}")
        });
    }

    fn test_skipped(&mut self, identity: &TestIdentity) {
        self.record(|out, _| {
            write_tag(out, "SKIP", Color::Yellow)?;
            writeln!(out, ": {identity}")
        });
    }

    fn test_failed(&mut self, identity: &TestIdentity, message: &str) {
        self.record(|_, err| {
            write_tag(err, "FAIL", Color::Red)?;
            writeln!(err, ": {identity}")?;
            for line in message.lines() {
                writeln!(err, "  {line}")?;
            }
            Ok(())
        });
    }

    fn suite_finished(&mut self, summary: &RunSummary) {
        self.record(|out, _| {
            writeln!(
                out,
                "{}: total {}, passed {}, failed {}, skipped {} ({:.2?})\n",
                summary.suite,
                summary.total(),
                summary.passed,
                summary.failed,
                summary.skipped,
                summary.elapsed,
            )?;
            out.flush()
        });
    }
}
