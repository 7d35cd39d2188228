use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::AppResult;

use super::{HostIntegration, HostProbe};

const X11_SOCKET_DIR: &str = "/tmp/.X11-unix";
const GROUP_FILE: &str = "/etc/group";
const DEVICE_GROUPS: [&str; 2] = ["video", "render"];
const DEFAULT_DISPLAY: &str = ":0";

/// [`HostProbe`] that inspects the local machine.
#[derive(Debug, Clone)]
pub struct SystemHostProbe {
    dns_servers: Vec<String>,
    home_dir: Option<PathBuf>,
    runtime_dir: Option<PathBuf>,
    group_file: PathBuf,
}

impl SystemHostProbe {
    pub fn new(dns_servers: Vec<String>) -> Self {
        Self {
            dns_servers,
            home_dir: dirs::home_dir(),
            runtime_dir: dirs::runtime_dir(),
            group_file: PathBuf::from(GROUP_FILE),
        }
    }

    fn audio_cookie(&self) -> Option<PathBuf> {
        let home = self.home_dir.as_ref()?;
        [home.join(".config/pulse/cookie"), home.join(".pulse-cookie")]
            .into_iter()
            .find(|candidate| candidate.is_file())
    }

    fn device_group_ids(&self) -> io::Result<Vec<u32>> {
        let raw = fs::read_to_string(&self.group_file)?;
        Ok(parse_group_ids(&raw, &DEVICE_GROUPS))
    }
}

impl HostProbe for SystemHostProbe {
    async fn discover(&self) -> HostIntegration {
        let mut warnings = Vec::new();

        let display = env::var("DISPLAY")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY.to_string());

        let x11_socket_dir = Some(PathBuf::from(X11_SOCKET_DIR)).filter(|dir| dir.is_dir());
        if x11_socket_dir.is_none() {
            warnings.push(format!("{X11_SOCKET_DIR} not found; display passthrough disabled"));
        }

        let pulse_dir = self
            .runtime_dir
            .as_ref()
            .map(|dir| dir.join("pulse"))
            .filter(|dir| dir.is_dir());
        if pulse_dir.is_none() {
            warnings.push("pulseaudio runtime directory not found; audio disabled".to_string());
        }

        let audio_cookie = self.audio_cookie();
        if audio_cookie.is_none() {
            warnings.push("pulseaudio cookie not found; audio authentication skipped".to_string());
        }

        let device_group_ids = match self.device_group_ids() {
            Ok(ids) => ids,
            Err(err) => {
                warnings.push(format!("failed to read device groups: {err}"));
                Vec::new()
            }
        };
        debug!(?device_group_ids, "resolved gpu device groups");

        if is_wayland_session() {
            info!("wayland session detected; relying on xwayland for display access");
        }

        for warning in &warnings {
            warn!("{warning}");
        }

        HostIntegration {
            display,
            x11_socket_dir,
            pulse_dir,
            audio_cookie,
            device_group_ids,
            dns_servers: self.dns_servers.clone(),
            warnings,
        }
    }

    async fn grant_display_access(&self) -> AppResult<()> {
        let output = Command::new("xhost")
            .arg("+local:docker")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| {
                if err.kind() == io::ErrorKind::NotFound {
                    io::Error::new(err.kind(), "xhost not found; x11 access may not work")
                } else {
                    err
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(io::Error::other(format!(
                "failed to configure x11 access: {}",
                stderr.trim()
            ))
            .into());
        }

        debug!("x11 access configured for local containers");
        Ok(())
    }
}

fn is_wayland_session() -> bool {
    env::var_os("WAYLAND_DISPLAY").is_some()
        || env::var("XDG_SESSION_TYPE").is_ok_and(|kind| kind.eq_ignore_ascii_case("wayland"))
}

/// Looks up the gids of `wanted` groups in `/etc/group` formatted text,
/// preserving the order of `wanted` and skipping groups that do not exist.
pub fn parse_group_ids(raw: &str, wanted: &[&str]) -> Vec<u32> {
    wanted
        .iter()
        .filter_map(|group| {
            raw.lines().find_map(|line| {
                let mut fields = line.split(':');
                let name = fields.next()?;
                if name != *group {
                    return None;
                }
                fields.nth(1)?.trim().parse().ok()
            })
        })
        .collect()
}
