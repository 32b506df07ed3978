//! System validator interface.
//!
//! Validators inspect kernel, OS, cgroup and docker configuration against a
//! system spec and write a human-readable log of what they looked at.

use crate::Findings;
use std::fmt;
use std::io::Write;

/// Operating system family the process runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    Windows,
    MacOs,
    Other,
}

impl OsFamily {
    /// Family of the running process
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to its family
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => OsFamily::Linux,
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::MacOs,
            _ => OsFamily::Other,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Linux => write!(f, "linux"),
            OsFamily::Windows => write!(f, "windows"),
            OsFamily::MacOs => write!(f, "macos"),
            OsFamily::Other => write!(f, "other"),
        }
    }
}

/// Kinds of system validator a suite provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    Kernel,
    Docker,
    Os,
    Cgroups,
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorKind::Kernel => write!(f, "kernel"),
            ValidatorKind::Docker => write!(f, "docker"),
            ValidatorKind::Os => write!(f, "os"),
            ValidatorKind::Cgroups => write!(f, "cgroups"),
        }
    }
}

/// One system validator.
pub trait SystemValidator {
    fn name(&self) -> &str;

    /// Validate, logging progress to `reporter`.
    fn validate(&self, reporter: &mut dyn Write) -> Findings;
}

/// Factory for the validators a composite check selects.
pub trait ValidatorSuite {
    fn validator(&self, kind: ValidatorKind) -> Box<dyn SystemValidator>;
}
