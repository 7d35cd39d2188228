use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

use super::ContainerEngine;
use super::models::{ContainerInfo, ContainerState, RunSpec};

/// [`ContainerEngine`] backed by the `docker` command line client.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
}

#[derive(Debug)]
struct CommandOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn exec(&self, args: &[String], envs: &[(&str, &str)]) -> AppResult<CommandOutput> {
        debug!(binary = %self.binary, ?args, "running container engine command");
        let output = Command::new(&self.binary)
            .args(args)
            .envs(envs.iter().copied())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| AppError::Engine(format!("failed to run `{}`: {err}", self.binary)))?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    async fn container_command(&self, verb: &[&str], name: &str) -> AppResult<()> {
        let mut args = owned(verb);
        args.push(name.to_string());
        let output = self.exec(&args, &[]).await?;
        if output.success {
            return Ok(());
        }

        if is_missing_object(&output.stderr) {
            return Err(AppError::NotFound(name.to_string()));
        }

        Err(AppError::Engine(format!(
            "docker {} {name} failed: {}",
            verb.join(" "),
            output.stderr
        )))
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerEngine for DockerCli {
    async fn image_exists(&self, image: &str) -> AppResult<bool> {
        let output = self.exec(&owned(&["image", "inspect", image]), &[]).await?;
        if output.success {
            return Ok(true);
        }
        if is_missing_object(&output.stderr) {
            return Ok(false);
        }

        Err(AppError::Engine(format!(
            "failed to inspect image {image}: {}",
            output.stderr
        )))
    }

    async fn build_image(&self, image: &str, context_dir: &Path) -> AppResult<()> {
        info!(%image, context = %context_dir.display(), "building container image");
        let args = vec![
            "build".to_string(),
            "-t".to_string(),
            image.to_string(),
            context_dir.display().to_string(),
        ];
        let output = self.exec(&args, &[("DOCKER_BUILDKIT", "1")]).await?;
        if !output.success {
            return Err(AppError::Engine(format!(
                "docker build failed: {}",
                output.stderr
            )));
        }

        info!(%image, "container image built");
        Ok(())
    }

    async fn inspect(&self, name: &str) -> AppResult<Option<ContainerInfo>> {
        let output = self
            .exec(&owned(&["container", "inspect", name]), &[])
            .await?;
        if !output.success {
            if is_missing_object(&output.stderr) {
                return Ok(None);
            }
            return Err(AppError::Engine(format!(
                "failed to inspect container {name}: {}",
                output.stderr
            )));
        }

        parse_inspect(&output.stdout)
    }

    async fn run(&self, spec: &RunSpec) -> AppResult<String> {
        let output = self.exec(&run_args(spec), &[]).await?;
        if output.success {
            return Ok(output.stdout);
        }

        if is_name_conflict(&output.stderr) {
            return Err(AppError::AlreadyExists(spec.name.clone()));
        }

        Err(AppError::Engine(format!(
            "failed to run container {}: {}",
            spec.name, output.stderr
        )))
    }

    async fn start(&self, name: &str) -> AppResult<()> {
        self.container_command(&["start"], name).await
    }

    async fn stop(&self, name: &str) -> AppResult<()> {
        self.container_command(&["stop"], name).await
    }

    async fn remove(&self, name: &str) -> AppResult<()> {
        self.container_command(&["rm", "--force"], name).await
    }
}

#[derive(Debug, Deserialize)]
struct InspectResource {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "State")]
    state: InspectState,
}

#[derive(Debug, Deserialize)]
struct InspectState {
    #[serde(rename = "Status")]
    status: String,
}

fn parse_inspect(stdout: &str) -> AppResult<Option<ContainerInfo>> {
    let resources: Vec<InspectResource> = serde_json::from_str(stdout)?;
    Ok(resources.into_iter().next().map(|resource| ContainerInfo {
        id: resource.id,
        name: resource.name.trim_start_matches('/').to_string(),
        state: ContainerState::parse(&resource.state.status),
    }))
}

fn run_args(spec: &RunSpec) -> Vec<String> {
    let mut args = owned(&["run", "--detach", "--name", spec.name.as_str()]);

    if let Some(ipc) = spec.ipc_mode.as_deref() {
        args.extend(owned(&["--ipc", ipc]));
    }
    for capability in &spec.capabilities {
        args.extend(owned(&["--cap-add", capability.as_str()]));
    }
    for option in &spec.security_opts {
        args.extend(owned(&["--security-opt", option.as_str()]));
    }
    for volume in &spec.volumes {
        let mode = if volume.read_only { "ro" } else { "rw" };
        args.push("--volume".to_string());
        args.push(format!(
            "{}:{}:{mode}",
            volume.host.display(),
            volume.container
        ));
    }
    for (key, value) in &spec.env {
        args.push("--env".to_string());
        args.push(format!("{key}={value}"));
    }
    for device in &spec.devices {
        args.extend(owned(&["--device", device.as_str()]));
    }
    for group in &spec.groups {
        args.extend(owned(&["--group-add", group.as_str()]));
    }
    for server in &spec.dns_servers {
        args.extend(owned(&["--dns", server.as_str()]));
    }
    for option in &spec.dns_options {
        args.extend(owned(&["--dns-option", option.as_str()]));
    }

    args.push(spec.image.clone());
    args.extend(spec.args.iter().cloned());
    args
}

fn is_missing_object(stderr: &str) -> bool {
    let lowered = stderr.to_ascii_lowercase();
    lowered.contains("no such container")
        || lowered.contains("no such object")
        || lowered.contains("no such image")
}

fn is_name_conflict(stderr: &str) -> bool {
    let lowered = stderr.to_ascii_lowercase();
    lowered.contains("is already in use") || lowered.contains("conflict")
}

fn owned(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}
