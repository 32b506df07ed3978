//! Init system service checks.

use crate::platform::initsystem::InitSystemDetector;
use crate::{Check, Diagnostic, Findings};
use std::sync::Arc;
use tracing::debug;

/// Verifies a service exists, is enabled and, optionally, is active.
///
/// Failing to detect an init system at all is an error for this check.
pub struct ServiceCheck {
    service: String,
    check_if_active: bool,
    label: Option<String>,
    init: Arc<dyn InitSystemDetector>,
}

impl ServiceCheck {
    pub fn new(service: impl Into<String>, init: Arc<dyn InitSystemDetector>) -> Self {
        ServiceCheck {
            service: service.into(),
            check_if_active: false,
            label: None,
            init,
        }
    }

    /// Also require the service to be running
    pub fn check_if_active(mut self, check_if_active: bool) -> Self {
        self.check_if_active = check_if_active;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Check for ServiceCheck {
    fn name(&self) -> String {
        match &self.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => format!("Service-{}", title_case(&self.service)),
        }
    }

    fn execute(&self) -> Findings {
        debug!(service = %self.service, "validating if the service is enabled and active");
        let mut findings = Findings::new();

        let init = match self.init.detect() {
            Ok(init) => init,
            Err(e) => {
                findings.error(Diagnostic::wrap("unable to detect the init system", &e));
                return findings;
            }
        };

        if !init.service_exists(&self.service) {
            findings.warn(format!("{} service does not exist", self.service));
            return findings;
        }

        if !init.service_is_enabled(&self.service) {
            findings.warn(format!(
                "{} service is not enabled, please run '{}'",
                self.service,
                init.enable_command(&self.service)
            ));
        }

        if self.check_if_active && !init.service_is_active(&self.service) {
            findings.error(format!(
                "{} service is not active, please run 'systemctl start {}.service'",
                self.service, self.service
            ));
        }

        findings
    }
}

/// Warns when firewalld is running, since it may block the cluster ports.
pub struct FirewalldCheck {
    ports: Vec<u16>,
    init: Arc<dyn InitSystemDetector>,
}

impl FirewalldCheck {
    pub fn new(ports: Vec<u16>, init: Arc<dyn InitSystemDetector>) -> Self {
        FirewalldCheck { ports, init }
    }
}

impl Check for FirewalldCheck {
    fn name(&self) -> String {
        "Firewalld".to_string()
    }

    fn execute(&self) -> Findings {
        debug!("validating if the firewall is enabled and active");
        let mut findings = Findings::new();

        let init = match self.init.detect() {
            Ok(init) => init,
            Err(e) => {
                findings.error(Diagnostic::wrap("unable to detect the init system", &e));
                return findings;
            }
        };

        if init.service_exists("firewalld") && init.service_is_active("firewalld") {
            findings.warn(format!(
                "firewalld is active, please ensure ports {} are open or your cluster may not function correctly",
                format_ports(&self.ports)
            ));
        }

        findings
    }
}

/// Uppercase the first letter of every word; words are split on anything
/// that is not alphanumeric or `_`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

fn format_ports(ports: &[u16]) -> String {
    let ports: Vec<String> = ports.iter().map(|p| p.to_string()).collect();
    format!("[{}]", ports.join(" "))
}
