use serde::Serialize;

use crate::context::AppContext;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
struct PathsView {
    config_file: String,
    profiles_dir: String,
    desktop_entries_dir: String,
}

pub async fn run(ctx: &AppContext) -> AppResult<()> {
    let view = PathsView {
        config_file: ctx.paths.settings_file().display().to_string(),
        profiles_dir: ctx.paths.profiles_dir().display().to_string(),
        desktop_entries_dir: ctx.paths.desktop_entries_dir().display().to_string(),
    };

    let text = format!(
        "config: {}\nprofiles: {}\nlaunchers: {}",
        view.config_file, view.profiles_dir, view.desktop_entries_dir
    );
    ctx.output.emit(&text, &view)
}
