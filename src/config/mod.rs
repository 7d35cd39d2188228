pub mod paths;
pub mod profile;
pub mod settings;

pub use paths::AppPaths;
pub use profile::{is_valid_profile_name, validate_profile_name};
pub use settings::Settings;

use crate::error::AppResult;

pub fn load_settings(paths: &AppPaths) -> AppResult<Settings> {
    settings::load(paths.settings_file())
}
