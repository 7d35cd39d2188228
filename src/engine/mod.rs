//! Container control: the narrow interface the orchestrator drives, and the
//! docker CLI adapter that implements it.

pub mod docker;
pub mod models;

use std::path::Path;

use crate::error::AppResult;

pub use docker::DockerCli;
pub use models::{ContainerInfo, ContainerState, RunSpec, VolumeMount};

/// Named isolated runtime instances, keyed by a deterministic container name.
///
/// Implementations report "no such container" as `Ok(None)` from
/// [`ContainerEngine::inspect`] and as [`crate::error::AppError::NotFound`]
/// from the mutating calls; creating a name that is already taken fails with
/// [`crate::error::AppError::AlreadyExists`].
#[allow(async_fn_in_trait)]
pub trait ContainerEngine {
    async fn image_exists(&self, image: &str) -> AppResult<bool>;
    async fn build_image(&self, image: &str, context_dir: &Path) -> AppResult<()>;
    async fn inspect(&self, name: &str) -> AppResult<Option<ContainerInfo>>;
    /// Creates and starts a detached container, returning its id.
    async fn run(&self, spec: &RunSpec) -> AppResult<String>;
    async fn start(&self, name: &str) -> AppResult<()>;
    async fn stop(&self, name: &str) -> AppResult<()>;
    /// Force-removes the container, stopping it first if needed.
    async fn remove(&self, name: &str) -> AppResult<()>;
}
