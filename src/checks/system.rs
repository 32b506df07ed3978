//! System verification check.
//!
//! A composite check: it runs several system validators and flattens their
//! findings into one result. Which validators run is decided once from the OS
//! family and whether the node uses a Docker-flavored runtime:
//! - kernel: always
//! - docker: only with a Docker-flavored runtime
//! - os, cgroups: only on Linux
//!
//! Validator logs are buffered and only printed when verification fails.

use crate::platform::system::{OsFamily, ValidatorKind, ValidatorSuite};
use crate::{Check, Findings};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Banner written ahead of the buffered validator logs on failure.
pub const VERIFICATION_FAILED_BANNER: &str =
    "[preflight] The system verification failed. Printing the output from the verification:\n";

/// Validators to run for the given platform, in execution order.
pub fn select_validators(os: OsFamily, is_docker: bool) -> Vec<ValidatorKind> {
    let mut kinds = vec![ValidatorKind::Kernel];

    if is_docker {
        kinds.push(ValidatorKind::Docker);
    }

    if os == OsFamily::Linux {
        kinds.push(ValidatorKind::Os);
        kinds.push(ValidatorKind::Cgroups);
    }

    kinds
}

/// Runs the system validators selected for this platform.
pub struct SystemVerificationCheck {
    suite: Arc<dyn ValidatorSuite>,
    is_docker: bool,
    os: OsFamily,
    report: Mutex<Box<dyn Write + Send>>,
}

impl SystemVerificationCheck {
    /// Create a check for the current OS that reports failures on stdout
    pub fn new(suite: Arc<dyn ValidatorSuite>, is_docker: bool) -> Self {
        SystemVerificationCheck {
            suite,
            is_docker,
            os: OsFamily::current(),
            report: Mutex::new(Box::new(io::stdout())),
        }
    }

    pub fn with_os_family(mut self, os: OsFamily) -> Self {
        self.os = os;
        self
    }

    /// Stream that receives the validator logs when verification fails
    pub fn with_report_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.report = Mutex::new(Box::new(writer));
        self
    }

    fn print_report(&self, buffer: &[u8]) {
        // Recover the writer even if a previous holder panicked
        let mut writer = match self.report.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };

        let result = writer
            .write_all(VERIFICATION_FAILED_BANNER.as_bytes())
            .and_then(|_| writer.write_all(buffer))
            .and_then(|_| writer.flush());

        if let Err(e) = result {
            warn!(error = %e, "failed to write system verification output");
        }
    }
}

impl Check for SystemVerificationCheck {
    fn name(&self) -> String {
        "SystemVerification".to_string()
    }

    fn execute(&self) -> Findings {
        debug!(os = %self.os, docker = self.is_docker, "running all system validators");
        let mut buffer = Vec::new();
        let mut findings = Findings::new();

        for kind in select_validators(self.os, self.is_docker) {
            let validator = self.suite.validator(kind);
            debug!(%kind, validator = validator.name(), "running system validator");
            findings.extend(validator.validate(&mut buffer));
        }

        if !findings.errors.is_empty() {
            self.print_report(&buffer);
        }

        findings
    }
}
