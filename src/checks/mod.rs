//! Preflight checks driven by platform collaborators.
//!
//! Every check implements `Check` and takes its collaborators at
//! construction, so none of them touches process-wide state:
//! - Runtime: container runtime health and image pre-pull
//! - Service: init system services and firewalld
//! - Path: executables on the search path
//! - Version: tool/cluster and kubelet version skew
//! - System: composite kernel/OS/cgroup/docker verification
//!
//! A check that cannot determine its result (no init system, unparsable
//! version, unreachable runtime) reports an error, never a silent pass.

pub mod path;
pub mod runtime;
pub mod service;
pub mod system;
pub mod version;

pub use path::InPathCheck;
pub use runtime::{ContainerRuntimeCheck, ImagePullCheck, PullPolicy};
pub use service::{FirewalldCheck, ServiceCheck};
pub use system::SystemVerificationCheck;
pub use version::{KubeletVersionCheck, VersionSkewCheck};
