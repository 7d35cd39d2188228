//! Host environment discovery: display, audio, GPU groups and DNS.
//!
//! Every capability here is optional. A probe that finds nothing reports a
//! warning and the container simply starts without that passthrough.

pub mod system;

use std::path::PathBuf;

use crate::error::AppResult;

pub use system::SystemHostProbe;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct HostIntegration {
    pub display: String,
    pub x11_socket_dir: Option<PathBuf>,
    pub pulse_dir: Option<PathBuf>,
    pub audio_cookie: Option<PathBuf>,
    pub device_group_ids: Vec<u32>,
    pub dns_servers: Vec<String>,
    pub warnings: Vec<String>,
}

#[allow(async_fn_in_trait)]
pub trait HostProbe {
    /// Collects host integration points. Never fails; gaps become warnings.
    async fn discover(&self) -> HostIntegration;
    /// Allows local containers to talk to the display server.
    async fn grant_display_access(&self) -> AppResult<()>;
}
