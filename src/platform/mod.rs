//! Platform collaborator contracts.
//!
//! Checks never reach for process-wide state. Everything they probe is passed
//! in at construction time through these traits:
//! - Container runtime (running state, image existence, image pull)
//! - Init system (service existence, enablement, activity)
//! - Executable lookup and installed component versions
//! - System validators (kernel, OS, cgroups, docker)
//!
//! Implementations live with the embedding application.

pub mod exec;
pub mod initsystem;
pub mod runtime;
pub mod system;

use std::error::Error;
use thiserror::Error;

/// Error returned by any platform collaborator.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProbeError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ProbeError {
    pub fn new(message: impl Into<String>) -> Self {
        ProbeError {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        ProbeError {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}
