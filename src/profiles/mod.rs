//! Profile lifecycle orchestration.

pub mod launch;
pub mod locks;
pub mod models;
pub mod orchestrator;
pub mod store;

pub use locks::ProfileLocks;
pub use models::*;
pub use orchestrator::{Orchestrator, RuntimeConfig};
pub use store::{DOWNLOADS_DIR, ProfileStore, dir_size};
