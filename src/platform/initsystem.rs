//! Init system interface.

use crate::platform::ProbeError;
use std::sync::Arc;

/// Service manager of the host (systemd, OpenRC, ...).
pub trait InitSystem {
    fn service_exists(&self, service: &str) -> bool;

    fn service_is_enabled(&self, service: &str) -> bool;

    fn service_is_active(&self, service: &str) -> bool;

    /// Command an operator runs to enable `service`
    fn enable_command(&self, service: &str) -> String;
}

/// Locates the init system of the host.
///
/// Detection fails on hosts without a supported service manager.
pub trait InitSystemDetector {
    fn detect(&self) -> Result<Arc<dyn InitSystem>, ProbeError>;
}
