//! node-preflight library
//!
//! Pre-flight validation for cluster bootstrap operations.
//!
//! This library provides the check orchestration and severity-aggregation engine:
//! - The `Check` capability contract every validation implements
//! - Ignore-list driven downgrade of a check's errors to warnings
//! - Sequential execution with live warning output and one aggregate failure
//! - Collaborator-driven checks (container runtime, image pull, services,
//!   executables, version skew, system verification)
//!
//! # Example
//!
//! ```no_run
//! use node_preflight::{run_preflight, Check, Findings, PreflightConfig};
//!
//! struct AlwaysFine;
//!
//! impl Check for AlwaysFine {
//!     fn name(&self) -> String {
//!         "AlwaysFine".to_string()
//!     }
//!
//!     fn execute(&self) -> Findings {
//!         Findings::new()
//!     }
//! }
//!
//! let checks: Vec<Box<dyn Check>> = vec![Box::new(AlwaysFine)];
//! let config = PreflightConfig::default();
//! let mut stderr = std::io::stderr();
//! if let Err(failure) = run_preflight(&checks, &mut stderr, &config) {
//!     eprintln!("{}", failure);
//! }
//! ```

pub mod checks;
pub mod engine;
pub mod platform;

use engine::ignore::IgnoreSet;
use engine::orchestrator::{CheckOrchestrator, OrchestratorConfig, PanicPolicy};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Re-exports for public API
pub use engine::orchestrator::run_checks;
pub use engine::result::{CheckOutcome, ResultSummary, RunReport};

/// Trailing guidance appended to every aggregate failure.
pub const IGNORE_HINT: &str = "[preflight] If you know what you are doing, you can make a check non-fatal with `--ignore-preflight-errors=...`";

/// Environment variable holding extra comma-separated ignore tokens.
pub const IGNORE_ERRORS_ENV: &str = "PREFLIGHT_IGNORE_ERRORS";

/// One finding reported by a check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Diagnostic {
    message: String,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
        }
    }

    /// Wrap an underlying error with context, rendered as
    /// `"<context>: <err>: <cause>..."` down the whole source chain.
    pub fn wrap(context: impl std::fmt::Display, err: &dyn std::error::Error) -> Self {
        Diagnostic {
            message: format!("{}: {}", context, error_chain(err)),
        }
    }

    /// An error and its causes, rendered as `"<err>: <cause>..."`.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        Diagnostic {
            message: error_chain(err),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(e) = cause {
        message.push_str(": ");
        message.push_str(&e.to_string());
        cause = e.source();
    }
    message
}

impl From<String> for Diagnostic {
    fn from(message: String) -> Self {
        Diagnostic::new(message)
    }
}

impl From<&str> for Diagnostic {
    fn from(message: &str) -> Self {
        Diagnostic::new(message)
    }
}

/// Warnings and errors produced by one execution of a check.
///
/// Both sequences keep the order in which the check detected them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    /// Advisory findings, never blocking
    pub warnings: Vec<Diagnostic>,
    /// Blocking findings unless the check is ignored
    pub errors: Vec<Diagnostic>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, diagnostic: impl Into<Diagnostic>) {
        self.warnings.push(diagnostic.into());
    }

    pub fn error(&mut self, diagnostic: impl Into<Diagnostic>) {
        self.errors.push(diagnostic.into());
    }

    pub fn with_warning(mut self, diagnostic: impl Into<Diagnostic>) -> Self {
        self.warn(diagnostic);
        self
    }

    pub fn with_error(mut self, diagnostic: impl Into<Diagnostic>) -> Self {
        self.error(diagnostic);
        self
    }

    /// True when the check found nothing at all.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Append another set of findings, warnings after warnings and errors after errors.
    pub fn extend(&mut self, other: Findings) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    /// Demote every error to a warning, keeping order after existing warnings.
    pub fn downgrade(&mut self) {
        let errors = std::mem::take(&mut self.errors);
        self.warnings.extend(errors);
    }
}

/// A named, independently executable validation unit.
///
/// `execute` may touch external state (binding sockets, pulling images), so
/// running checks is not purely observational. Calling it more than once must
/// be safe.
pub trait Check {
    /// Stable label used for output and, case-insensitively, for ignore matching.
    ///
    /// If this panics under `PanicPolicy::Isolate`, the check is reported as
    /// `Check-<position>` and not executed.
    fn name(&self) -> String;

    /// Run the validation.
    fn execute(&self) -> Findings;
}

/// Marker for errors that originate from a preflight run.
pub trait Preflight {
    fn preflight(&self) -> bool;
}

/// Terminal error of a run: every error that survived downgrade, attributed per check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[preflight] Some fatal errors occurred:\n{messages}{hint}", hint = IGNORE_HINT)]
pub struct AggregateFailure {
    messages: String,
}

impl AggregateFailure {
    pub(crate) fn new(messages: String) -> Self {
        AggregateFailure { messages }
    }

    /// The buffered body, one `\t[ERROR <name>]: <message>\n` line per error.
    pub fn messages(&self) -> &str {
        &self.messages
    }

    /// Individual error lines without the trailing newline.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.messages.lines()
    }
}

impl Preflight for AggregateFailure {
    fn preflight(&self) -> bool {
        true
    }
}

/// Whether `err`, or anything in its source chain, is a preflight failure.
pub fn is_preflight_error(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(failure) = e.downcast_ref::<AggregateFailure>() {
            return failure.preflight();
        }
        current = e.source();
    }
    false
}

/// Error types for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for a preflight run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PreflightConfig {
    /// Check names (or `all`) whose errors become warnings
    pub ignore_preflight_errors: Vec<String>,
    /// What to do when a check panics
    pub on_panic: PanicPolicy,
}

impl PreflightConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Append ignore tokens from `PREFLIGHT_IGNORE_ERRORS`, if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(IGNORE_ERRORS_ENV) {
            self.ignore_preflight_errors.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string),
            );
        }
        self
    }

    pub fn ignore_set(&self) -> IgnoreSet {
        self.ignore_preflight_errors.iter().collect()
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            on_panic: self.on_panic,
        }
    }
}

/// Run preflight checks.
///
/// Warnings are written to `sink` as each check completes. Returns an
/// `AggregateFailure` if any check has an error left after applying the
/// configured ignore list.
pub fn run_preflight<W: Write + ?Sized>(
    checks: &[Box<dyn Check>],
    sink: &mut W,
    config: &PreflightConfig,
) -> Result<(), AggregateFailure> {
    let orchestrator = CheckOrchestrator::new(config.orchestrator_config());
    orchestrator
        .run(checks, sink, &config.ignore_set())
        .into_result()
}
