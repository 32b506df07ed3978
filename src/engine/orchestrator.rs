//! Check execution orchestrator.
//!
//! Runs checks strictly in the order given, one at a time, and applies the
//! ignore list to each check's findings.
//!
//! # Run semantics
//!
//! For every check:
//! - `name()` is read, then `execute()` runs exactly once
//! - If the ignore list names the check (or holds `all`), its errors are
//!   appended to its warnings and no errors remain
//! - Every surviving warning is written to the sink immediately as
//!   `\t[WARNING <name>]: <message>`
//! - Every surviving error is buffered as `\t[ERROR <name>]: <message>`
//!
//! After the last check the buffered errors, if any, become a single
//! `AggregateFailure`. Warnings never fail a run.
//!
//! # Panics inside checks
//!
//! With `PanicPolicy::Isolate` a panicking check is recorded as one error
//! (`check panicked: <payload>`) and the remaining checks still run. With
//! `PanicPolicy::Propagate` the panic unwinds out of the run.

use crate::engine::ignore::IgnoreSet;
use crate::engine::result::{warning_line, CheckOutcome, ResultAggregator, RunReport};
use crate::{AggregateFailure, Check, Findings};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// How the orchestrator treats a panic raised by `Check::execute`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanicPolicy {
    /// Convert the panic into an error for that check and keep going.
    ///
    /// The process panic hook still runs first, so the default hook prints
    /// its `thread '...' panicked at ...` message to stderr. Applications
    /// that use stderr as the output sink should install a quieter hook with
    /// `std::panic::set_hook`.
    #[default]
    Isolate,
    /// Let the panic abort the whole run
    Propagate,
}

/// Orchestrator configuration
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub on_panic: PanicPolicy,
}

/// Check orchestrator
pub struct CheckOrchestrator {
    config: OrchestratorConfig,
}

impl CheckOrchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: OrchestratorConfig) -> Self {
        CheckOrchestrator { config }
    }

    /// Run every check in order and collect the outcomes.
    pub fn run<W: Write + ?Sized>(
        &self,
        checks: &[Box<dyn Check>],
        sink: &mut W,
        ignore: &IgnoreSet,
    ) -> RunReport {
        let mut aggregator = ResultAggregator::new();

        for (index, check) in checks.iter().enumerate() {
            let outcome = self.run_one(index, check.as_ref(), sink, ignore);
            aggregator.add_outcome(outcome);
        }

        let summary = aggregator.get_summary();
        info!(
            total = summary.total,
            failed = summary.failed,
            warned = summary.warned,
            downgraded = summary.downgraded,
            "preflight checks complete"
        );

        aggregator.into_report()
    }

    /// Run every check in order; fail if any error survives the ignore list.
    pub fn run_checks<W: Write + ?Sized>(
        &self,
        checks: &[Box<dyn Check>],
        sink: &mut W,
        ignore: &IgnoreSet,
    ) -> Result<(), AggregateFailure> {
        self.run(checks, sink, ignore).into_result()
    }

    fn run_one<W: Write + ?Sized>(
        &self,
        index: usize,
        check: &dyn Check,
        sink: &mut W,
        ignore: &IgnoreSet,
    ) -> CheckOutcome {
        let (name, mut findings, panicked) = match self.isolate(|| check.name()) {
            Ok(name) => {
                debug!(check = %name, "running preflight check");
                let (findings, panicked) = self.execute_check(check, &name);
                (name, findings, panicked)
            }
            Err(message) => {
                // Labeled by position and never executed
                let name = unnamed_check(index);
                warn!(check = %name, panic = %message, "check name panicked, skipping execution");
                let findings = Findings::new().with_error(format!("check name panicked: {}", message));
                (name, findings, true)
            }
        };

        let mut downgraded = false;
        if ignore.ignores(&name) {
            if !findings.errors.is_empty() {
                warn!(
                    check = %name,
                    errors = findings.errors.len(),
                    "check is ignored, treating its errors as warnings"
                );
                downgraded = true;
            }
            findings.downgrade();
        }

        if !findings.warnings.is_empty() {
            for diagnostic in &findings.warnings {
                let line = warning_line(&name, diagnostic.message());
                if let Err(e) = sink.write_all(line.as_bytes()) {
                    warn!(check = %name, error = %e, "failed to write warning to output sink");
                }
            }
            if let Err(e) = sink.flush() {
                warn!(check = %name, error = %e, "failed to flush output sink");
            }
        }

        CheckOutcome {
            name,
            warnings: findings.warnings.iter().map(|d| d.to_string()).collect(),
            errors: findings.errors.iter().map(|d| d.to_string()).collect(),
            downgraded,
            panicked,
        }
    }

    /// Execute a single check, applying the panic policy
    fn execute_check(&self, check: &dyn Check, name: &str) -> (Findings, bool) {
        match self.isolate(|| check.execute()) {
            Ok(findings) => (findings, false),
            Err(message) => {
                warn!(check = %name, panic = %message, "check panicked, continuing with remaining checks");
                let findings = Findings::new().with_error(format!("check panicked: {}", message));
                (findings, true)
            }
        }
    }

    /// Run `f`, returning the panic message if it panicked under `Isolate`.
    fn isolate<T>(&self, f: impl FnOnce() -> T) -> Result<T, String> {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Ok(value),
            Err(payload) => match self.config.on_panic {
                PanicPolicy::Propagate => panic::resume_unwind(payload),
                PanicPolicy::Isolate => Err(panic_message(payload.as_ref())),
            },
        }
    }
}

/// Label for a check whose `name()` panicked, 1-based by position.
fn unnamed_check(index: usize) -> String {
    format!("Check-{}", index + 1)
}

impl Default for CheckOrchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run checks with the default configuration.
///
/// Warnings go to `sink` as they are found; surviving errors are returned
/// together as one `AggregateFailure`.
pub fn run_checks<W: Write + ?Sized>(
    checks: &[Box<dyn Check>],
    sink: &mut W,
    ignore: &IgnoreSet,
) -> Result<(), AggregateFailure> {
    CheckOrchestrator::default().run_checks(checks, sink, ignore)
}
