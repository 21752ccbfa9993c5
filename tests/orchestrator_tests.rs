//! Run-loop behaviour: event ordering, failure isolation and teardown.

mod common;

use common::{plan, Scripted};
use dmn_tck_runner::diagnostics::TeardownScope;
use dmn_tck_runner::orchestrator::run;
use dmn_tck_runner::report::RecordingSink;
use dmn_tck_runner::{HarnessError, Outcome, ReportEvent};

fn started(test: &str) -> ReportEvent {
    ReportEvent::Started { test: test.into() }
}

fn passed(test: &str) -> ReportEvent {
    ReportEvent::Passed { test: test.into() }
}

fn skipped(test: &str) -> ReportEvent {
    ReportEvent::Skipped { test: test.into() }
}

fn failed(test: &str, message: &str) -> ReportEvent {
    ReportEvent::Failed {
        test: test.into(),
        message: message.into(),
    }
}

fn case_events(sink: &RecordingSink) -> Vec<ReportEvent> {
    sink.case_events().into_iter().cloned().collect()
}

#[test]
fn mismatch_fails_one_case_and_the_run_completes() {
    let plan = plan("Foo.xml", &["001", "002"]);
    let evaluator = Scripted::new().outcome("002", Outcome::error("mismatch"));
    let mut sink = RecordingSink::new();

    let summary = run(&plan, &evaluator, &mut sink).unwrap();

    assert_eq!(
        case_events(&sink),
        vec![
            started("Foo/001"),
            passed("Foo/001"),
            started("Foo/002"),
            failed("Foo/002", "mismatch"),
        ]
    );
    assert_eq!((summary.passed, summary.failed, summary.skipped), (1, 1, 0));
}

#[test]
fn every_case_gets_one_start_and_one_terminal_event_in_order() {
    let ids = ["a", "b", "c", "d", "e"];
    let plan = plan("a.b.Mixed.yaml", &ids);
    let evaluator = Scripted::new()
        .outcome("b", Outcome::Ignored)
        .outcome("c", Outcome::error("wrong type"))
        .outcome("e", Outcome::error("null"));
    let mut sink = RecordingSink::new();

    let summary = run(&plan, &evaluator, &mut sink).unwrap();

    let events = case_events(&sink);
    assert_eq!(events.len(), 2 * ids.len());
    for (pair, id) in events.chunks(2).zip(ids) {
        let name = format!("a/b/Mixed/{id}");
        assert_eq!(pair[0], started(&name));
        assert!(pair[1].is_terminal());
    }
    assert_eq!(summary.total(), ids.len());
    assert_eq!((summary.passed, summary.skipped, summary.failed), (2, 1, 2));
}

#[test]
fn ignored_outcome_is_a_skip() {
    let plan = plan("Foo.yaml", &["001"]);
    let evaluator = Scripted::new().outcome("001", Outcome::Ignored);
    let mut sink = RecordingSink::new();

    run(&plan, &evaluator, &mut sink).unwrap();

    assert_eq!(case_events(&sink), vec![started("Foo/001"), skipped("Foo/001")]);
}

#[test]
fn suite_setup_failure_aborts_before_any_case() {
    let plan = plan("Foo.yaml", &["001", "002"]);
    let evaluator = Scripted {
        fail_suite_setup: Some("model does not compile".to_string()),
        ..Scripted::default()
    };
    let mut sink = RecordingSink::new();

    let err = run(&plan, &evaluator, &mut sink).unwrap_err();

    match err {
        HarnessError::SuiteSetup { suite, source } => {
            assert_eq!(suite, "Foo");
            assert_eq!(source.message(), "model does not compile");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(sink.events.is_empty());
    assert_eq!(evaluator.calls(), vec!["create_context#1", "before_suite"]);
}

#[test]
fn hooks_run_in_lifecycle_order() {
    let plan = plan("Foo.yaml", &["001", "002"]);
    let evaluator = Scripted::new();
    let mut sink = RecordingSink::new();

    run(&plan, &evaluator, &mut sink).unwrap();

    assert_eq!(
        evaluator.calls(),
        vec![
            "create_context#1",
            "before_suite",
            "before_case:001",
            "evaluate:001@run1",
            "after_case:001",
            "before_case:002",
            "evaluate:002@run1",
            "after_case:002",
            "after_suite",
        ]
    );
}

#[test]
fn teardown_runs_once_per_case_whatever_the_outcome() {
    let plan = plan("Foo.yaml", &["ok", "skip", "fail", "panic", "setup"]);
    let mut evaluator = Scripted::new()
        .outcome("skip", Outcome::Ignored)
        .outcome("fail", Outcome::error("x"));
    evaluator.panic_on.insert("panic".to_string());
    evaluator.fail_before_case.insert("setup".to_string());
    let mut sink = RecordingSink::new();

    run(&plan, &evaluator, &mut sink).unwrap();

    for id in ["ok", "skip", "fail", "panic", "setup"] {
        assert_eq!(evaluator.count(&format!("after_case:{id}")), 1, "case {id}");
    }
}

#[test]
fn panicking_case_is_a_failure_and_the_next_case_runs() {
    let plan = plan("Foo.yaml", &["001", "002"]);
    let mut evaluator = Scripted::new();
    evaluator.panic_on.insert("001".to_string());
    let mut sink = RecordingSink::new();

    let summary = run(&plan, &evaluator, &mut sink).unwrap();

    assert_eq!(
        case_events(&sink),
        vec![
            started("Foo/001"),
            failed("Foo/001", "evaluator panicked: boom"),
            started("Foo/002"),
            passed("Foo/002"),
        ]
    );
    assert_eq!(summary.failed, 1);
}

#[test]
fn case_setup_failure_skips_evaluation_but_not_teardown() {
    let plan = plan("Foo.yaml", &["001"]);
    let mut evaluator = Scripted::new();
    evaluator.fail_before_case.insert("001".to_string());
    let mut sink = RecordingSink::new();

    run(&plan, &evaluator, &mut sink).unwrap();

    assert_eq!(
        case_events(&sink),
        vec![
            started("Foo/001"),
            failed("Foo/001", "case setup failed: fixture unavailable"),
        ]
    );
    assert!(!evaluator.calls().iter().any(|c| c.starts_with("evaluate:")));
    assert_eq!(evaluator.count("after_case:001"), 1);
}

#[test]
fn teardown_failures_are_warnings_and_keep_the_classification() {
    let plan = plan("Foo.yaml", &["001", "002"]);
    let mut evaluator = Scripted::new();
    evaluator.fail_after_case.insert("001".to_string());
    evaluator.fail_after_suite = true;
    let mut sink = RecordingSink::new();

    let summary = run(&plan, &evaluator, &mut sink).unwrap();

    assert_eq!(
        case_events(&sink),
        vec![
            started("Foo/001"),
            passed("Foo/001"),
            started("Foo/002"),
            passed("Foo/002"),
        ]
    );
    let scopes: Vec<_> = summary
        .warnings
        .iter()
        .map(|w| match w {
            HarnessError::Teardown { scope, .. } => scope.to_string(),
            other => panic!("unexpected warning: {other:?}"),
        })
        .collect();
    assert_eq!(scopes, vec!["case Foo/001", "suite Foo"]);
    assert!(matches!(
        &summary.warnings[1],
        HarnessError::Teardown {
            scope: TeardownScope::Suite(_),
            ..
        }
    ));
    assert!(summary.is_success());
}

#[test]
fn each_run_gets_a_fresh_context() {
    let plan = plan("Foo.yaml", &["001"]);
    let evaluator = Scripted::new();

    run(&plan, &evaluator, &mut RecordingSink::new()).unwrap();
    run(&plan, &evaluator, &mut RecordingSink::new()).unwrap();

    assert_eq!(evaluator.count("evaluate:001@run1"), 1);
    assert_eq!(evaluator.count("evaluate:001@run2"), 1);
}

#[test]
fn suite_bracketing_surrounds_case_events() {
    let plan = plan("Foo.yaml", &["001"]);
    let evaluator = Scripted::new().outcome("001", Outcome::error("no"));
    let mut sink = RecordingSink::new();

    run(&plan, &evaluator, &mut sink).unwrap();

    assert_eq!(
        sink.events.first(),
        Some(&ReportEvent::SuiteStarted {
            suite: "Foo".into(),
            case_count: 1
        })
    );
    assert_eq!(
        sink.events.last(),
        Some(&ReportEvent::SuiteFinished {
            suite: "Foo".into(),
            passed: 0,
            skipped: 0,
            failed: 1,
            warnings: 0,
        })
    );
}
