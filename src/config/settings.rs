use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, AppResult};

const DEFAULT_IMAGE: &str = "isolated-chrome";
const DEFAULT_CONTAINER_PREFIX: &str = "chrome-";
const DEFAULT_DOCKER_BINARY: &str = "docker";
const DEFAULT_ICON_FALLBACK: &str = "google-chrome";
const DEFAULT_ICON_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/e/e1/Google_Chrome_icon_%28February_2022%29.svg";
const DEFAULT_DNS_SERVERS: [&str; 3] = ["172.17.0.1", "8.8.8.8", "8.8.4.4"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub profiles_dir: Option<String>,
    #[serde(default)]
    pub desktop_entries_dir: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub container_prefix: Option<String>,
    #[serde(default)]
    pub build_context: Option<PathBuf>,
    #[serde(default)]
    pub launch_command: Option<String>,
    #[serde(default)]
    pub icon_path: Option<PathBuf>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub icon_fallback: Option<String>,
    #[serde(default)]
    pub dns_servers: Option<Vec<String>>,
    #[serde(default)]
    pub docker_binary: Option<String>,
}

impl Settings {
    pub fn image(&self) -> &str {
        self.image.as_deref().unwrap_or(DEFAULT_IMAGE)
    }

    pub fn container_prefix(&self) -> &str {
        self.container_prefix
            .as_deref()
            .unwrap_or(DEFAULT_CONTAINER_PREFIX)
    }

    pub fn docker_binary(&self) -> &str {
        self.docker_binary
            .as_deref()
            .unwrap_or(DEFAULT_DOCKER_BINARY)
    }

    pub fn icon_fallback(&self) -> &str {
        self.icon_fallback
            .as_deref()
            .unwrap_or(DEFAULT_ICON_FALLBACK)
    }

    pub fn icon_url(&self) -> AppResult<Url> {
        let raw = self.icon_url.as_deref().unwrap_or(DEFAULT_ICON_URL);
        Ok(Url::parse(raw)?)
    }

    pub fn dns_servers(&self) -> Vec<String> {
        self.dns_servers.clone().unwrap_or_else(|| {
            DEFAULT_DNS_SERVERS
                .iter()
                .map(|server| server.to_string())
                .collect()
        })
    }

    /// Command the launcher entry executes, without the trailing profile name.
    pub fn launch_command(&self) -> AppResult<String> {
        if let Some(command) = self.launch_command.as_deref().map(str::trim) {
            if !command.is_empty() {
                return Ok(command.to_string());
            }
        }

        let exe = std::env::current_exe()?;
        Ok(format!("{} start", exe.display()))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.image().trim().is_empty() {
            return Err(AppError::Config("image must not be empty".to_string()));
        }
        if self.container_prefix().trim().is_empty() {
            return Err(AppError::Config(
                "container_prefix must not be empty".to_string(),
            ));
        }
        self.icon_url()
            .map_err(|err| AppError::Config(format!("invalid icon_url: {err}")))?;
        Ok(())
    }
}

pub fn load(path: PathBuf) -> AppResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(&path)?;
    let settings: Settings = serde_json::from_str(&raw).map_err(|err| {
        AppError::Config(format!("failed to parse {}: {err}", path.display()))
    })?;
    settings.validate()?;
    Ok(settings)
}
