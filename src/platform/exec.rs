//! Executable lookup and component version interfaces.

use crate::platform::ProbeError;
use std::path::PathBuf;

/// Resolves executables against the system search path.
pub trait ExecutableLookup {
    fn look_path(&self, executable: &str) -> Result<PathBuf, ProbeError>;
}

/// Reports the version string of an installed component, e.g. `"v1.30.2"`.
pub trait VersionProbe {
    fn version(&self) -> Result<String, ProbeError>;
}
