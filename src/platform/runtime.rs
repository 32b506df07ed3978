//! Container runtime interface.

use crate::platform::ProbeError;

/// Client for the node's container runtime.
///
/// `pull_image` mutates the runtime's local image cache.
pub trait ContainerRuntime {
    /// Succeeds when the runtime is up and answering
    fn is_running(&self) -> Result<(), ProbeError>;

    /// Whether `image` is already present locally
    fn image_exists(&self, image: &str) -> Result<bool, ProbeError>;

    fn pull_image(&self, image: &str) -> Result<(), ProbeError>;
}
