use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use reqwest::Client;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::AppResult;
use crate::outcome::Outcome;

use super::LauncherRegistry;

const ENTRY_PREFIX: &str = "chrome-";
const ICON_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct IconSource {
    pub path: PathBuf,
    pub url: Url,
    /// Theme icon name used when the icon file cannot be fetched.
    pub fallback: String,
}

/// Freedesktop `.desktop` files in a single applications directory.
#[derive(Debug, Clone)]
pub struct DesktopLauncherRegistry {
    entries_dir: PathBuf,
    launch_command: String,
    icon: IconSource,
    http: Client,
    download_timeout: Duration,
}

impl DesktopLauncherRegistry {
    pub fn new(entries_dir: PathBuf, launch_command: String, icon: IconSource) -> Self {
        Self {
            entries_dir,
            launch_command,
            icon,
            http: Client::new(),
            download_timeout: ICON_DOWNLOAD_TIMEOUT,
        }
    }

    /// Upper bound on the one-off icon download.
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn entry_path(&self, profile: &str) -> PathBuf {
        self.entries_dir
            .join(format!("{ENTRY_PREFIX}{profile}.desktop"))
    }

    /// Returns the icon reference to embed, downloading the icon on first use.
    async fn resolve_icon(&self, warnings: &mut Vec<String>) -> String {
        if self.icon.path.is_file() {
            return self.icon.path.display().to_string();
        }

        let failure = match time::timeout(self.download_timeout, self.download_icon()).await {
            Ok(Ok(())) => return self.icon.path.display().to_string(),
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!("timed out after {}s", self.download_timeout.as_secs_f32()),
        };

        let message = format!("failed to download launcher icon: {failure}");
        warn!("{message}");
        warnings.push(message);
        self.icon.fallback.clone()
    }

    async fn download_icon(&self) -> AppResult<()> {
        info!(url = %self.icon.url, "downloading launcher icon");
        let bytes = self
            .http
            .get(self.icon.url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        if let Some(parent) = self.icon.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.icon.path, &bytes)?;
        Ok(())
    }

    async fn refresh_database(&self) {
        let result = Command::new("update-desktop-database")
            .arg(&self.entries_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match result {
            Ok(status) if status.success() => {}
            Ok(status) => debug!(%status, "update-desktop-database exited unsuccessfully"),
            Err(err) => debug!(%err, "update-desktop-database unavailable"),
        }
    }
}

impl LauncherRegistry for DesktopLauncherRegistry {
    async fn install(&self, profile: &str) -> AppResult<Outcome<PathBuf>> {
        let mut warnings = Vec::new();
        let icon = self.resolve_icon(&mut warnings).await;
        let path = self.entry_path(profile);
        let content = render_desktop_entry(profile, &self.launch_command, &icon);

        fs::create_dir_all(&self.entries_dir)?;
        fs::write(&path, content)?;
        make_executable(&path)?;
        self.refresh_database().await;

        debug!(profile, path = %path.display(), "launcher entry written");
        Ok(Outcome::with_warnings(path, warnings))
    }

    async fn remove(&self, profile: &str) -> AppResult<bool> {
        let path = self.entry_path(profile);
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)?;
        self.refresh_database().await;
        Ok(true)
    }

    fn exists(&self, profile: &str) -> bool {
        self.entry_path(profile).exists()
    }
}

pub fn render_desktop_entry(profile: &str, launch_command: &str, icon: &str) -> String {
    format!(
        "[Desktop Entry]
Version=1.0
Type=Application
Name=Chrome ({profile})
Comment=Isolated Chrome Profile: {profile}
Exec={launch_command} {profile}
Icon={icon}
Terminal=false
Categories=Network;WebBrowser;
StartupWMClass={ENTRY_PREFIX}{profile}
"
    )
}

#[cfg(unix)]
fn make_executable(path: &Path) -> AppResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> AppResult<()> {
    Ok(())
}
