//! Executable presence checks.

use crate::platform::exec::ExecutableLookup;
use crate::{Check, Findings};
use std::sync::Arc;
use tracing::debug;

/// Verifies an executable can be found on the system search path.
///
/// A missing mandatory executable is an error; a missing optional one is a
/// warning that carries the suggestion, if any.
pub struct InPathCheck {
    executable: String,
    mandatory: bool,
    label: Option<String>,
    suggestion: Option<String>,
    lookup: Arc<dyn ExecutableLookup>,
}

impl InPathCheck {
    pub fn new(
        executable: impl Into<String>,
        mandatory: bool,
        lookup: Arc<dyn ExecutableLookup>,
    ) -> Self {
        InPathCheck {
            executable: executable.into(),
            mandatory,
            label: None,
            suggestion: None,
            lookup,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl Check for InPathCheck {
    fn name(&self) -> String {
        match &self.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => format!("FileExisting-{}", self.executable.replace('/', "-")),
        }
    }

    fn execute(&self) -> Findings {
        debug!(executable = %self.executable, "validating the presence of executable");
        let mut findings = Findings::new();

        if self.lookup.look_path(&self.executable).is_ok() {
            return findings;
        }

        let mut message = format!("{} not found in system path", self.executable);
        if self.mandatory {
            findings.error(message);
        } else {
            if let Some(suggestion) = self.suggestion.as_deref().filter(|s| !s.is_empty()) {
                message.push_str(&format!("\nSuggestion: {}", suggestion));
            }
            findings.warn(message);
        }

        findings
    }
}
