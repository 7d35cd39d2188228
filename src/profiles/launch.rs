use std::collections::BTreeMap;
use std::path::Path;

use crate::engine::{RunSpec, VolumeMount};
use crate::host::HostIntegration;

const CONTAINER_HOME: &str = "/home/chrome";
const CONTAINER_PULSE_DIR: &str = "/run/user/1000/pulse";
const CONTAINER_X11_DIR: &str = "/tmp/.X11-unix";
const CAPABILITIES: [&str; 3] = ["SYS_ADMIN", "SYS_PTRACE", "NET_ADMIN"];
const GPU_DEVICE: &str = "/dev/dri";
const BROWSER_FLAGS: [&str; 3] = [
    "--enable-features=VulkanFromANGLE,DefaultANGLEVulkan",
    "--use-gl=angle",
    "--use-angle=vulkan",
];

/// Inputs for a brand new profile container.
#[derive(Debug, Clone, Copy)]
pub struct LaunchTarget<'a> {
    pub profile: &'a str,
    pub container_name: &'a str,
    pub image: &'a str,
    pub profile_dir: &'a Path,
    pub downloads_dir: &'a Path,
}

/// Builds the container configuration for a profile. Optional host
/// capabilities that were not discovered are simply left out.
pub fn build_run_spec(target: LaunchTarget<'_>, host: &HostIntegration) -> RunSpec {
    let mut volumes = Vec::new();
    if let Some(x11) = host.x11_socket_dir.as_ref() {
        volumes.push(VolumeMount::rw(x11, CONTAINER_X11_DIR));
    }
    if let Some(pulse) = host.pulse_dir.as_ref() {
        volumes.push(VolumeMount::rw(pulse, CONTAINER_PULSE_DIR));
    }
    if let Some(cookie) = host.audio_cookie.as_ref() {
        volumes.push(VolumeMount::ro(
            cookie,
            format!("{CONTAINER_HOME}/.config/pulse/cookie"),
        ));
    }
    volumes.push(VolumeMount::rw(
        target.profile_dir,
        format!("{CONTAINER_HOME}/.config/chromium"),
    ));
    volumes.push(VolumeMount::rw(
        target.downloads_dir,
        format!("{CONTAINER_HOME}/Downloads"),
    ));

    let mut env = BTreeMap::new();
    env.insert("DISPLAY".to_string(), host.display.clone());
    env.insert("CHROME_PROFILE".to_string(), target.profile.to_string());
    env.insert("TZ".to_string(), "UTC".to_string());
    env.insert("LANG".to_string(), "en_US.UTF-8".to_string());
    env.insert("LC_ALL".to_string(), "en_US.UTF-8".to_string());
    if host.pulse_dir.is_some() {
        env.insert(
            "PULSE_SERVER".to_string(),
            format!("unix:{CONTAINER_PULSE_DIR}/native"),
        );
    }
    if host.audio_cookie.is_some() {
        env.insert(
            "PULSE_COOKIE".to_string(),
            format!("{CONTAINER_HOME}/.config/pulse/cookie"),
        );
    }

    let mut groups = vec!["audio".to_string()];
    groups.extend(host.device_group_ids.iter().map(u32::to_string));

    let mut args = vec![format!("--class=chrome-{}", target.profile)];
    args.extend(BROWSER_FLAGS.iter().map(|flag| flag.to_string()));

    RunSpec {
        image: target.image.to_string(),
        name: target.container_name.to_string(),
        ipc_mode: Some("host".to_string()),
        capabilities: CAPABILITIES.iter().map(|cap| cap.to_string()).collect(),
        security_opts: vec!["seccomp=unconfined".to_string()],
        volumes,
        env,
        devices: vec![GPU_DEVICE.to_string()],
        groups,
        dns_servers: host.dns_servers.clone(),
        dns_options: vec!["ndots:0".to_string()],
        args,
    }
}
