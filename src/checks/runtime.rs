//! Container runtime checks.
//!
//! `ContainerRuntimeCheck` verifies the runtime is up. `ImagePullCheck`
//! pre-pulls the images the bootstrap needs and is the one mutating check:
//! running it changes the runtime's local image cache.

use crate::platform::runtime::ContainerRuntime;
use crate::{Check, Diagnostic, Findings};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Verifies the container runtime is running.
pub struct ContainerRuntimeCheck {
    runtime: Arc<dyn ContainerRuntime>,
}

impl ContainerRuntimeCheck {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        ContainerRuntimeCheck { runtime }
    }
}

impl Check for ContainerRuntimeCheck {
    fn name(&self) -> String {
        "CRI".to_string()
    }

    fn execute(&self) -> Findings {
        debug!("validating the container runtime");
        let mut findings = Findings::new();
        if let Err(e) = self.runtime.is_running() {
            findings.error(Diagnostic::from_error(&e));
        }
        findings
    }
}

/// When images are pulled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullPolicy {
    Never,
    IfNotPresent,
    Always,
}

impl FromStr for PullPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Never" => Ok(PullPolicy::Never),
            "IfNotPresent" => Ok(PullPolicy::IfNotPresent),
            "Always" => Ok(PullPolicy::Always),
            _ => Err(format!("unsupported pull policy {:?}", s)),
        }
    }
}

impl fmt::Display for PullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullPolicy::Never => write!(f, "Never"),
            PullPolicy::IfNotPresent => write!(f, "IfNotPresent"),
            PullPolicy::Always => write!(f, "Always"),
        }
    }
}

/// Pulls the listed images according to a pull policy.
///
/// The policy is kept as given by the operator and parsed when the check
/// runs, so an unknown value surfaces as a finding instead of a
/// construction error.
pub struct ImagePullCheck {
    runtime: Arc<dyn ContainerRuntime>,
    images: Vec<String>,
    policy: String,
}

impl ImagePullCheck {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        images: Vec<String>,
        policy: impl Into<String>,
    ) -> Self {
        ImagePullCheck {
            runtime,
            images,
            policy: policy.into(),
        }
    }

    pub fn with_policy(
        runtime: Arc<dyn ContainerRuntime>,
        images: Vec<String>,
        policy: PullPolicy,
    ) -> Self {
        Self::new(runtime, images, policy.to_string())
    }

    /// Decide whether `image` has to be pulled under `policy`.
    fn pull_needed(&self, policy: PullPolicy, image: &str, findings: &mut Findings) -> bool {
        match policy {
            PullPolicy::Never => {
                debug!(image, "skipping pull of image");
                false
            }
            PullPolicy::Always => true,
            PullPolicy::IfNotPresent => match self.runtime.image_exists(image) {
                Ok(true) => {
                    debug!(image, "image exists");
                    false
                }
                Ok(false) => true,
                Err(e) => {
                    findings.error(Diagnostic::wrap(
                        format!("failed to check if image {} exists", image),
                        &e,
                    ));
                    true
                }
            },
        }
    }

    fn pull(&self, image: &str, findings: &mut Findings) {
        debug!(image, "pulling image");
        if let Err(e) = self.runtime.pull_image(image) {
            findings.error(Diagnostic::wrap(format!("failed to pull image {}", image), &e));
        }
    }
}

impl Check for ImagePullCheck {
    fn name(&self) -> String {
        "ImagePull".to_string()
    }

    fn execute(&self) -> Findings {
        debug!(policy = %self.policy, "using image pull policy");
        let mut findings = Findings::new();

        if self.images.is_empty() {
            return findings;
        }

        let policy = match self.policy.parse::<PullPolicy>() {
            Ok(policy) => policy,
            Err(message) => {
                findings.error(message);
                return findings;
            }
        };

        for image in &self.images {
            if self.pull_needed(policy, image, &mut findings) {
                self.pull(image, &mut findings);
            }
        }

        findings
    }
}
