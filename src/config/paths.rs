use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

use super::settings::Settings;

const APP_DIR: &str = "chromebox";
const SETTINGS_FILE: &str = "settings.json";
const DEFAULT_PROFILES_DIR: &str = "Chrome";
const ICON_FILE: &str = "chrome-icon.svg";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
    profiles_dir: PathBuf,
    desktop_entries_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> AppResult<Self> {
        let config_root = dirs::config_dir()
            .ok_or_else(|| AppError::Config("unable to resolve config directory".to_string()))?;
        let data_root = dirs::data_dir()
            .ok_or_else(|| AppError::Config("unable to resolve data directory".to_string()))?;
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Config("unable to resolve home directory".to_string()))?;

        Ok(Self {
            config_dir: config_root.join(APP_DIR),
            data_dir: data_root.join(APP_DIR),
            profiles_dir: home.join(DEFAULT_PROFILES_DIR),
            desktop_entries_dir: data_root.join("applications"),
        })
    }

    /// Applies settings overrides and an optional command line override for
    /// the profiles root, then makes sure both managed roots exist.
    pub fn resolve(
        mut self,
        settings: &Settings,
        profiles_override: Option<PathBuf>,
    ) -> AppResult<Self> {
        if let Some(dir) = settings.profiles_dir.as_deref() {
            self.profiles_dir = absolutize(&expand_home(dir))?;
        }
        if let Some(dir) = settings.desktop_entries_dir.as_deref() {
            self.desktop_entries_dir = absolutize(&expand_home(dir))?;
        }
        if let Some(dir) = profiles_override {
            self.profiles_dir = absolutize(&dir)?;
        }

        fs::create_dir_all(&self.profiles_dir)?;
        fs::create_dir_all(&self.desktop_entries_dir)?;
        Ok(self)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    pub fn default_icon_file(&self) -> PathBuf {
        self.data_dir.join(ICON_FILE)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn profiles_dir(&self) -> &Path {
        &self.profiles_dir
    }

    pub fn desktop_entries_dir(&self) -> &Path {
        &self.desktop_entries_dir
    }
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    if trimmed == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    PathBuf::from(trimmed)
}

pub fn absolutize(path: &Path) -> AppResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    Ok(std::env::current_dir()?.join(path))
}
