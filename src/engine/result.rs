//! Result aggregation and reporting.
//!
//! Collects per-check outcomes in execution order, buffers the error lines of
//! the run and decides whether the run ends in an `AggregateFailure`.

use crate::AggregateFailure;
use serde::Serialize;

/// Format one warning line as written to the output sink.
pub fn warning_line(name: &str, message: &str) -> String {
    format!("\t[WARNING {}]: {}\n", name, message)
}

/// Format one error line as buffered for the aggregate failure.
pub fn error_line(name: &str, message: &str) -> String {
    format!("\t[ERROR {}]: {}\n", name, message)
}

/// What one check reported after the ignore list was applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    /// Surviving warnings, including downgraded errors
    pub warnings: Vec<String>,
    /// Surviving errors
    pub errors: Vec<String>,
    /// Errors were demoted because the check is ignored
    pub downgraded: bool,
    /// The check panicked and was isolated
    pub panicked: bool,
}

impl CheckOutcome {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    pub fn is_failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Result summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub total: usize,
    /// Checks with no findings
    pub clean: usize,
    /// Checks with warnings only
    pub warned: usize,
    /// Checks with at least one surviving error
    pub failed: usize,
    /// Checks whose errors were demoted
    pub downgraded: usize,
    pub warning_lines: usize,
    pub error_lines: usize,
}

fn summarize(outcomes: &[CheckOutcome]) -> ResultSummary {
    let mut summary = ResultSummary::default();

    for outcome in outcomes {
        summary.total += 1;

        if outcome.is_failed() {
            summary.failed += 1;
        } else if !outcome.warnings.is_empty() {
            summary.warned += 1;
        } else {
            summary.clean += 1;
        }

        if outcome.downgraded {
            summary.downgraded += 1;
        }

        summary.warning_lines += outcome.warnings.len();
        summary.error_lines += outcome.errors.len();
    }

    summary
}

/// Report of a complete preflight run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// One outcome per executed check, in execution order
    pub outcomes: Vec<CheckOutcome>,
    #[serde(skip)]
    error_buffer: String,
}

impl RunReport {
    /// Calculate summary statistics
    pub fn summary(&self) -> ResultSummary {
        summarize(&self.outcomes)
    }

    pub fn has_failures(&self) -> bool {
        !self.error_buffer.is_empty()
    }

    /// Names of the checks with surviving errors
    pub fn failed_checks(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failed())
            .map(|o| o.name.as_str())
            .collect()
    }

    /// The aggregate failure, present iff at least one error survived.
    pub fn failure(&self) -> Option<AggregateFailure> {
        if self.error_buffer.is_empty() {
            None
        } else {
            Some(AggregateFailure::new(self.error_buffer.clone()))
        }
    }

    pub fn into_result(self) -> Result<(), AggregateFailure> {
        if self.error_buffer.is_empty() {
            Ok(())
        } else {
            Err(AggregateFailure::new(self.error_buffer))
        }
    }

    /// Serialize the outcomes as pretty-printed JSON
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Result aggregator for collecting check outcomes during a run
#[derive(Debug, Default)]
pub struct ResultAggregator {
    outcomes: Vec<CheckOutcome>,
    error_buffer: String,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a completed outcome, buffering its error lines in order
    pub fn add_outcome(&mut self, outcome: CheckOutcome) {
        for message in &outcome.errors {
            self.error_buffer.push_str(&error_line(&outcome.name, message));
        }
        self.outcomes.push(outcome);
    }

    pub fn has_failures(&self) -> bool {
        !self.error_buffer.is_empty()
    }

    pub fn get_summary(&self) -> ResultSummary {
        summarize(&self.outcomes)
    }

    /// Create final run report
    pub fn into_report(self) -> RunReport {
        RunReport {
            outcomes: self.outcomes,
            error_buffer: self.error_buffer,
        }
    }
}
