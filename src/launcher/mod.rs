//! Desktop launcher entries. Purely cosmetic state: a profile works without
//! one, so every caller treats failures here as warnings.

pub mod desktop;

use std::path::PathBuf;

use crate::error::AppResult;
use crate::outcome::Outcome;

pub use desktop::{DesktopLauncherRegistry, IconSource};

#[allow(async_fn_in_trait)]
pub trait LauncherRegistry {
    /// Writes (or rewrites) the launcher entry for `profile`.
    async fn install(&self, profile: &str) -> AppResult<Outcome<PathBuf>>;
    /// Removes the entry; `Ok(false)` when there was none.
    async fn remove(&self, profile: &str) -> AppResult<bool>;
    fn exists(&self, profile: &str) -> bool;
}
