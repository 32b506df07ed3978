//! Full run integration tests.
//!
//! Tests for the orchestrator: downgrade policy, sink output, ordering and
//! the aggregate failure contract.

use crate::mocks::{EventLog, LoggingCheck, LoggingSink, ScriptedCheck};
use node_preflight::engine::ignore::IgnoreSet;
use node_preflight::engine::orchestrator::CheckOrchestrator;
use node_preflight::{
    is_preflight_error, run_checks, run_preflight, Check, Findings, PreflightConfig, IGNORE_HINT,
};
use std::sync::atomic::Ordering;

fn sink_text(sink: Vec<u8>) -> String {
    String::from_utf8(sink).unwrap()
}

#[test]
fn test_clean_run_succeeds_silently() {
    let checks = vec![
        ScriptedCheck::clean("A").boxed(),
        ScriptedCheck::clean("B").boxed(),
        ScriptedCheck::clean("C").boxed(),
    ];
    let mut sink: Vec<u8> = Vec::new();

    let result = run_checks(&checks, &mut sink, &IgnoreSet::new());

    assert!(result.is_ok());
    assert!(sink.is_empty());
}

#[test]
fn test_single_error_fails_run() {
    let checks = vec![
        ScriptedCheck::clean("A").boxed(),
        ScriptedCheck::failing("Port-XXXX", "Port XXXX is in use").boxed(),
    ];
    let mut sink: Vec<u8> = Vec::new();

    let failure = run_checks(&checks, &mut sink, &IgnoreSet::new()).unwrap_err();

    assert_eq!(failure.messages(), "\t[ERROR Port-XXXX]: Port XXXX is in use\n");
    assert_eq!(
        failure.to_string(),
        format!(
            "[preflight] Some fatal errors occurred:\n\t[ERROR Port-XXXX]: Port XXXX is in use\n{}",
            IGNORE_HINT
        )
    );
    assert!(sink.is_empty());
}

#[test]
fn test_ignored_error_becomes_warning() {
    let checks = vec![
        ScriptedCheck::clean("A").boxed(),
        ScriptedCheck::failing("Port-XXXX", "Port XXXX is in use").boxed(),
    ];
    let mut sink: Vec<u8> = Vec::new();
    let ignore = IgnoreSet::from_flag_value("port-xxxx");

    let result = run_checks(&checks, &mut sink, &ignore);

    assert!(result.is_ok());
    assert_eq!(sink_text(sink), "\t[WARNING Port-XXXX]: Port XXXX is in use\n");
}

#[test]
fn test_ignore_all_downgrades_every_check() {
    let checks = vec![
        ScriptedCheck::failing("First", "one").boxed(),
        ScriptedCheck::failing("Second", "two").boxed(),
        ScriptedCheck::failing("Third", "three").boxed(),
    ];
    let mut sink: Vec<u8> = Vec::new();
    let ignore = IgnoreSet::from_flag_value("all");

    let result = run_checks(&checks, &mut sink, &ignore);

    assert!(result.is_ok());
    assert_eq!(
        sink_text(sink),
        "\t[WARNING First]: one\n\t[WARNING Second]: two\n\t[WARNING Third]: three\n"
    );
}

#[test]
fn test_ignore_only_affects_named_check() {
    let checks = vec![
        ScriptedCheck::failing("Swap", "swap is on").boxed(),
        ScriptedCheck::failing("NumCPU", "not enough CPUs").boxed(),
    ];
    let mut sink: Vec<u8> = Vec::new();
    let ignore = IgnoreSet::from_flag_value("SWAP");

    let failure = run_checks(&checks, &mut sink, &ignore).unwrap_err();

    assert_eq!(failure.messages(), "\t[ERROR NumCPU]: not enough CPUs\n");
    assert_eq!(sink_text(sink), "\t[WARNING Swap]: swap is on\n");
}

#[test]
fn test_downgraded_errors_follow_existing_warnings() {
    let findings = Findings::new()
        .with_warning("w1")
        .with_error("e1")
        .with_warning("w2")
        .with_error("e2");
    let checks = vec![ScriptedCheck::new("Mixed", findings).boxed()];
    let mut sink: Vec<u8> = Vec::new();
    let ignore = IgnoreSet::from_flag_value("mixed");

    run_checks(&checks, &mut sink, &ignore).unwrap();

    assert_eq!(
        sink_text(sink),
        "\t[WARNING Mixed]: w1\n\t[WARNING Mixed]: w2\n\t[WARNING Mixed]: e1\n\t[WARNING Mixed]: e2\n"
    );
}

#[test]
fn test_check_with_warnings_and_errors() {
    let findings = Findings::new().with_warning("advisory").with_error("blocking");
    let checks = vec![ScriptedCheck::new("Both", findings).boxed()];
    let mut sink: Vec<u8> = Vec::new();

    let failure = run_checks(&checks, &mut sink, &IgnoreSet::new()).unwrap_err();

    assert_eq!(sink_text(sink), "\t[WARNING Both]: advisory\n");
    assert_eq!(failure.messages(), "\t[ERROR Both]: blocking\n");
}

#[test]
fn test_warnings_alone_never_fail() {
    let checks = vec![
        ScriptedCheck::warning("A", "a").boxed(),
        ScriptedCheck::warning("B", "b").boxed(),
    ];
    let mut sink: Vec<u8> = Vec::new();

    assert!(run_checks(&checks, &mut sink, &IgnoreSet::new()).is_ok());
    assert_eq!(sink_text(sink), "\t[WARNING A]: a\n\t[WARNING B]: b\n");
}

#[test]
fn test_error_buffer_in_check_then_diagnostic_order() {
    let checks = vec![
        ScriptedCheck::new("A", Findings::new().with_error("a1").with_error("a2")).boxed(),
        ScriptedCheck::clean("B").boxed(),
        ScriptedCheck::failing("C", "c1").boxed(),
    ];

    let failure = run_checks(&checks, &mut Vec::<u8>::new(), &IgnoreSet::new()).unwrap_err();

    let lines: Vec<&str> = failure.lines().collect();
    assert_eq!(
        lines,
        vec!["\t[ERROR A]: a1", "\t[ERROR A]: a2", "\t[ERROR C]: c1"]
    );
}

#[test]
fn test_warnings_written_as_each_check_completes() {
    let log = EventLog::new();
    let checks: Vec<Box<dyn Check>> = vec![
        Box::new(LoggingCheck {
            name: "A".to_string(),
            findings: Findings::new().with_warning("first"),
            log: log.clone(),
        }),
        Box::new(LoggingCheck {
            name: "B".to_string(),
            findings: Findings::new().with_error("hidden until the end"),
            log: log.clone(),
        }),
        Box::new(LoggingCheck {
            name: "C".to_string(),
            findings: Findings::new().with_warning("third"),
            log: log.clone(),
        }),
    ];
    let mut sink = LoggingSink { log: log.clone() };

    let result = run_checks(&checks, &mut sink, &IgnoreSet::new());

    assert!(result.is_err());
    assert_eq!(
        log.events(),
        vec![
            "execute A",
            "sink \t[WARNING A]: first",
            "execute B",
            "execute C",
            "sink \t[WARNING C]: third",
        ]
    );
}

#[test]
fn test_each_check_runs_exactly_once() {
    let a = ScriptedCheck::failing("A", "boom");
    let b = ScriptedCheck::clean("B");
    let (a_runs, b_runs) = (a.runs.clone(), b.runs.clone());
    let checks = vec![a.boxed(), b.boxed()];

    let _ = run_checks(&checks, &mut Vec::<u8>::new(), &IgnoreSet::new());

    assert_eq!(a_runs.load(Ordering::SeqCst), 1);
    assert_eq!(b_runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_duplicate_names_are_independent() {
    let checks = vec![
        ScriptedCheck::failing("FileAvailable", "first copy").boxed(),
        ScriptedCheck::failing("FileAvailable", "second copy").boxed(),
    ];

    let report = CheckOrchestrator::default().run(&checks, &mut Vec::<u8>::new(), &IgnoreSet::new());

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].errors, vec!["first copy"]);
    assert_eq!(report.outcomes[1].errors, vec!["second copy"]);
    assert_eq!(report.summary().failed, 2);
}

#[test]
fn test_repeated_runs_are_identical() {
    let checks = vec![
        ScriptedCheck::warning("A", "advisory").boxed(),
        ScriptedCheck::failing("B", "blocking").boxed(),
    ];
    let orchestrator = CheckOrchestrator::default();

    let mut first_sink: Vec<u8> = Vec::new();
    let first = orchestrator.run(&checks, &mut first_sink, &IgnoreSet::new());
    let mut second_sink: Vec<u8> = Vec::new();
    let second = orchestrator.run(&checks, &mut second_sink, &IgnoreSet::new());

    assert_eq!(first, second);
    assert_eq!(first_sink, second_sink);
    assert_eq!(first.failure(), second.failure());
}

#[test]
fn test_failure_present_iff_error_survives() {
    let cases: Vec<(Vec<Box<dyn Check>>, &str, bool)> = vec![
        (vec![ScriptedCheck::clean("A").boxed()], "", false),
        (vec![ScriptedCheck::warning("A", "w").boxed()], "", false),
        (vec![ScriptedCheck::failing("A", "e").boxed()], "", true),
        (vec![ScriptedCheck::failing("A", "e").boxed()], "a", false),
        (vec![ScriptedCheck::failing("A", "e").boxed()], "b", true),
        (
            vec![
                ScriptedCheck::failing("A", "e").boxed(),
                ScriptedCheck::failing("B", "e").boxed(),
            ],
            "a",
            true,
        ),
    ];

    for (checks, ignore, expect_failure) in cases {
        let ignore = IgnoreSet::from_flag_value(ignore);
        let report = CheckOrchestrator::default().run(&checks, &mut Vec::<u8>::new(), &ignore);
        assert_eq!(report.failure().is_some(), expect_failure);
        assert_eq!(report.has_failures(), expect_failure);
    }
}

#[test]
fn test_report_summary() {
    let checks = vec![
        ScriptedCheck::clean("A").boxed(),
        ScriptedCheck::warning("B", "w").boxed(),
        ScriptedCheck::failing("C", "e").boxed(),
        ScriptedCheck::failing("D", "ignored").boxed(),
    ];
    let ignore = IgnoreSet::from_flag_value("d");

    let report = CheckOrchestrator::default().run(&checks, &mut Vec::<u8>::new(), &ignore);
    let summary = report.summary();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.clean, 1);
    assert_eq!(summary.warned, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.downgraded, 1);
    assert_eq!(report.failed_checks(), vec!["C"]);
}

#[test]
fn test_run_preflight_uses_config_ignore_list() {
    let checks = vec![ScriptedCheck::failing("Swap", "swap is on").boxed()];
    let config = PreflightConfig {
        ignore_preflight_errors: vec!["Swap".to_string()],
        ..Default::default()
    };
    let mut sink: Vec<u8> = Vec::new();

    assert!(run_preflight(&checks, &mut sink, &config).is_ok());
    assert_eq!(sink_text(sink), "\t[WARNING Swap]: swap is on\n");
}

#[test]
fn test_returned_failure_is_marked_preflight() {
    let checks = vec![ScriptedCheck::failing("A", "e").boxed()];
    let failure = run_checks(&checks, &mut Vec::<u8>::new(), &IgnoreSet::new()).unwrap_err();

    let boxed: Box<dyn std::error::Error> = Box::new(failure);
    assert!(is_preflight_error(boxed.as_ref()));
}

#[test]
fn test_empty_check_list() {
    let checks: Vec<Box<dyn Check>> = Vec::new();
    let mut sink: Vec<u8> = Vec::new();

    assert!(run_checks(&checks, &mut sink, &IgnoreSet::from_flag_value("all")).is_ok());
    assert!(sink.is_empty());
}

#[cfg(feature = "json")]
#[test]
fn test_report_serializes_outcomes() {
    let checks = vec![
        ScriptedCheck::warning("A", "w").boxed(),
        ScriptedCheck::failing("B", "e").boxed(),
    ];
    let report = CheckOrchestrator::default().run(&checks, &mut Vec::<u8>::new(), &IgnoreSet::new());

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["outcomes"][0]["name"], "A");
    assert_eq!(json["outcomes"][0]["warnings"][0], "w");
    assert_eq!(json["outcomes"][1]["errors"][0], "e");
    assert_eq!(json["outcomes"][1]["downgraded"], false);
}
