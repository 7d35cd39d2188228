use std::path::PathBuf;

use crate::config::{self, AppPaths, Settings};
use crate::engine::DockerCli;
use crate::error::AppResult;
use crate::host::SystemHostProbe;
use crate::launcher::{DesktopLauncherRegistry, IconSource};
use crate::output::Output;
use crate::profiles::{Orchestrator, ProfileStore, RuntimeConfig};

pub type ProfileOrchestrator = Orchestrator<DockerCli, DesktopLauncherRegistry, SystemHostProbe>;

#[derive(Debug)]
pub struct AppContext {
    pub verbose: u8,
    pub paths: AppPaths,
    pub settings: Settings,
    pub orchestrator: ProfileOrchestrator,
    pub output: Output,
}

impl AppContext {
    pub fn bootstrap(json: bool, verbose: u8, profiles_dir: Option<PathBuf>) -> AppResult<Self> {
        let paths = AppPaths::discover()?;
        let settings = config::load_settings(&paths)?;
        let paths = paths.resolve(&settings, profiles_dir)?;

        let icon = IconSource {
            path: settings
                .icon_path
                .clone()
                .unwrap_or_else(|| paths.default_icon_file()),
            url: settings.icon_url()?,
            fallback: settings.icon_fallback().to_string(),
        };
        let launcher = DesktopLauncherRegistry::new(
            paths.desktop_entries_dir().to_path_buf(),
            settings.launch_command()?,
            icon,
        );
        let runtime = RuntimeConfig {
            image: settings.image().to_string(),
            container_prefix: settings.container_prefix().to_string(),
            build_context: settings.build_context.clone(),
        };
        let orchestrator = Orchestrator::new(
            ProfileStore::new(paths.profiles_dir().to_path_buf()),
            DockerCli::new(settings.docker_binary()),
            launcher,
            SystemHostProbe::new(settings.dns_servers()),
            runtime,
        );
        let output = Output::new(json);

        Ok(Self {
            verbose,
            paths,
            settings,
            orchestrator,
            output,
        })
    }
}
