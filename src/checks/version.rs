//! Version skew checks.
//!
//! Versions are parsed as strict semantic versions; a leading `v` is accepted.

use crate::platform::exec::VersionProbe;
use crate::{Check, Diagnostic, Findings};
use semver::Version;
use std::sync::Arc;
use tracing::debug;

/// Tool versions with this prefix are unversioned custom builds and skip the skew check.
pub const DEV_BUILD_VERSION_PREFIX: &str = "v0.0.0";

/// Parse a semantic version such as `v1.30.2` or `1.31.0-rc.1`.
pub fn parse_semantic(version: &str) -> Result<Version, semver::Error> {
    let version = version.trim();
    Version::parse(version.strip_prefix('v').unwrap_or(version))
}

/// Whether a tool at `tool` can still handle a cluster at `cluster`.
///
/// The first unsupported version is `major.(minor+1).0-0`: every patch and
/// pre-release of the tool's own minor is fine, nothing from the next minor on.
/// Comparing `(major, minor)` pairs is equivalent and cannot overflow.
pub fn tool_supports(tool: &Version, cluster: &Version) -> bool {
    (cluster.major, cluster.minor) <= (tool.major, tool.minor)
}

/// Warns when the cluster version is newer than the bootstrap tool supports.
pub struct VersionSkewCheck {
    tool_version: String,
    cluster_version: String,
}

impl VersionSkewCheck {
    pub fn new(tool_version: impl Into<String>, cluster_version: impl Into<String>) -> Self {
        VersionSkewCheck {
            tool_version: tool_version.into(),
            cluster_version: cluster_version.into(),
        }
    }
}

impl Check for VersionSkewCheck {
    fn name(&self) -> String {
        "KubernetesVersion".to_string()
    }

    fn execute(&self) -> Findings {
        debug!(
            tool = %self.tool_version,
            cluster = %self.cluster_version,
            "validating Kubernetes and tool version"
        );
        let mut findings = Findings::new();

        if self.tool_version.starts_with(DEV_BUILD_VERSION_PREFIX) {
            return findings;
        }

        let tool = match parse_semantic(&self.tool_version) {
            Ok(v) => v,
            Err(e) => {
                findings.error(Diagnostic::wrap(
                    format!("couldn't parse tool version {:?}", self.tool_version),
                    &e,
                ));
                return findings;
            }
        };

        let cluster = match parse_semantic(&self.cluster_version) {
            Ok(v) => v,
            Err(e) => {
                findings.error(Diagnostic::wrap(
                    format!("couldn't parse Kubernetes version {:?}", self.cluster_version),
                    &e,
                ));
                return findings;
            }
        };

        if !tool_supports(&tool, &cluster) {
            findings.warn(format!(
                "Kubernetes version is greater than the bootstrap tool version. Please consider upgrading the tool. Kubernetes version: {}. Tool version: {}.{}.x",
                cluster, tool.major, tool.minor
            ));
        }

        findings
    }
}

/// Verifies the installed kubelet is recent enough and not ahead of the control plane.
pub struct KubeletVersionCheck {
    kubernetes_version: Option<String>,
    minimum: Version,
    probe: Arc<dyn VersionProbe>,
}

impl KubeletVersionCheck {
    pub fn new(minimum: Version, probe: Arc<dyn VersionProbe>) -> Self {
        KubeletVersionCheck {
            kubernetes_version: None,
            minimum,
            probe,
        }
    }

    /// Control plane version to compare the kubelet against
    pub fn with_kubernetes_version(mut self, version: impl Into<String>) -> Self {
        self.kubernetes_version = Some(version.into());
        self
    }
}

impl Check for KubeletVersionCheck {
    fn name(&self) -> String {
        "KubeletVersion".to_string()
    }

    fn execute(&self) -> Findings {
        debug!("validating kubelet version");
        let mut findings = Findings::new();

        let raw = match self.probe.version() {
            Ok(raw) => raw,
            Err(e) => {
                findings.error(Diagnostic::wrap("couldn't get kubelet version", &e));
                return findings;
            }
        };

        let kubelet = match parse_semantic(&raw) {
            Ok(v) => v,
            Err(e) => {
                findings.error(Diagnostic::wrap(
                    format!("couldn't parse kubelet version {:?}", raw),
                    &e,
                ));
                return findings;
            }
        };

        if kubelet < self.minimum {
            findings.error(format!(
                "Kubelet version \"{}\" is lower than the minimum supported version {}. Please upgrade kubelet",
                kubelet, self.minimum
            ));
            return findings;
        }

        let Some(kubernetes_version) = self.kubernetes_version.as_deref().filter(|v| !v.is_empty()) else {
            return findings;
        };

        match parse_semantic(kubernetes_version) {
            Ok(control_plane) => {
                if kubelet.major > control_plane.major || kubelet.minor > control_plane.minor {
                    findings.error(format!(
                        "the kubelet version is higher than the control plane version. This is not a supported version skew and may lead to a malfunctional cluster. Kubelet version: \"{}\" Control plane version: \"{}\"",
                        kubelet, control_plane
                    ));
                }
            }
            Err(e) => {
                findings.error(Diagnostic::wrap(
                    format!("couldn't parse Kubernetes version {:?}", kubernetes_version),
                    &e,
                ));
            }
        }

        findings
    }
}
