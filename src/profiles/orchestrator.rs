use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archive::{self, ArchiveFormat, ExtractPlan};
use crate::config::validate_profile_name;
use crate::engine::{ContainerEngine, ContainerState};
use crate::error::{AppError, AppResult};
use crate::host::HostProbe;
use crate::launcher::LauncherRegistry;
use crate::outcome::Outcome;

use super::launch::{LaunchTarget, build_run_spec};
use super::locks::ProfileLocks;
use super::models::{
    CreateStatus, CreatedProfile, DeleteReport, DeleteStatus, ExportReport, ExportStatus,
    ImageReport, ImageStatus, ImportStatus, ImportedProfile, ProfileList, ProfileStatus,
    ProfileSummary, StartReport, StartStatus, StopReport, StopStatus, size_mb,
};
use super::store::{DOWNLOADS_DIR, ProfileStore, dir_size};

const STAGING_PREFIX: &str = ".import-";

/// Engine-facing settings the orchestrator needs.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub image: String,
    pub container_prefix: String,
    pub build_context: Option<PathBuf>,
}

/// Owns the mapping from a profile name to its directory, container and
/// launcher entry, and sequences every multi-step lifecycle operation.
///
/// The directory is authoritative. Container and launcher state are looked
/// up on demand and never cached.
#[derive(Debug)]
pub struct Orchestrator<E, L, H> {
    store: ProfileStore,
    engine: E,
    launcher: L,
    host: H,
    runtime: RuntimeConfig,
    locks: ProfileLocks,
}

impl<E, L, H> Orchestrator<E, L, H>
where
    E: ContainerEngine,
    L: LauncherRegistry,
    H: HostProbe,
{
    pub fn new(
        store: ProfileStore,
        engine: E,
        launcher: L,
        host: H,
        runtime: RuntimeConfig,
    ) -> Self {
        Self {
            store,
            engine,
            launcher,
            host,
            runtime,
            locks: ProfileLocks::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn container_name(&self, profile: &str) -> String {
        format!("{}{profile}", self.runtime.container_prefix)
    }

    pub async fn list(&self) -> AppResult<ProfileList> {
        let mut profiles = Vec::new();
        for name in self.store.list_names()? {
            let status = self.container_state(&name).await?;
            let size_bytes = self.store.resolve(&name).map_or(0, |dir| dir_size(&dir));
            profiles.push(ProfileSummary {
                has_desktop_entry: self.launcher.exists(&name),
                status,
                size_mb: size_mb(size_bytes),
                size_bytes,
                name,
            });
        }

        Ok(ProfileList { profiles })
    }

    pub async fn status(&self, name: &str) -> AppResult<ProfileStatus> {
        let name = validate_profile_name(name)?;
        let status = self.container_state(name).await?;
        let size_bytes = self.store.resolve(name).map_or(0, |dir| dir_size(&dir));

        Ok(ProfileStatus {
            name: name.to_string(),
            status,
            size_mb: size_mb(size_bytes),
            size_bytes,
        })
    }

    /// Creates the profile directory (default or custom location), its
    /// Downloads folder and a launcher entry.
    ///
    /// The directory claim is the durability boundary: a launcher failure
    /// after it only produces a warning.
    pub async fn create(
        &self,
        name: &str,
        location: Option<&Path>,
    ) -> AppResult<Outcome<CreatedProfile>> {
        let name = validate_profile_name(name)?;
        let _guard = self.locks.acquire(name).await;

        if self.store.is_occupied(name) {
            return Err(AppError::AlreadyExists(name.to_string()));
        }

        let default_dir = self.store.entry_path(name);
        let path = match location {
            Some(location) if location != default_dir => {
                if self.store.contains(location) {
                    return Err(AppError::InvalidInput(format!(
                        "custom location {} is inside the profiles root",
                        location.display()
                    )));
                }
                self.store.claim_dir(location, name)?;
                if let Err(err) = self.store.link_location(name, location) {
                    let _ = fs::remove_dir(location);
                    return Err(err);
                }
                location.to_path_buf()
            }
            _ => {
                self.store.claim_dir(&default_dir, name)?;
                default_dir
            }
        };
        fs::create_dir_all(path.join(DOWNLOADS_DIR))?;
        info!(profile = name, path = %path.display(), "profile created");

        let mut warnings = Vec::new();
        self.install_launcher(name, &mut warnings).await;

        Ok(Outcome::with_warnings(
            CreatedProfile {
                status: CreateStatus::Created,
                name: name.to_string(),
                path,
            },
            warnings,
        ))
    }

    /// Tears down container, launcher entry and directory, in that order.
    ///
    /// Absence of any resource counts as success. Container and launcher
    /// failures become warnings; only a directory that exists but cannot be
    /// removed fails the call.
    pub async fn delete(&self, name: &str) -> AppResult<Outcome<DeleteReport>> {
        let name = validate_profile_name(name)?;
        let _guard = self.locks.acquire(name).await;
        let container = self.container_name(name);
        let mut warnings = Vec::new();
        let mut removed_any = false;

        match self.engine.inspect(&container).await {
            Ok(Some(info)) => {
                removed_any = true;
                if info.state.is_running() {
                    if let Err(err) = self.engine.stop(&container).await {
                        if !matches!(err, AppError::NotFound(_)) {
                            warnings.push(format!("failed to stop container {container}: {err}"));
                        }
                    }
                }
                if let Err(err) = self.engine.remove(&container).await {
                    if !matches!(err, AppError::NotFound(_)) {
                        warnings.push(format!("failed to remove container {container}: {err}"));
                    }
                }
            }
            Ok(None) => {}
            Err(err) => warnings.push(format!("failed to query container {container}: {err}")),
        }

        match self.launcher.remove(name).await {
            Ok(existed) => removed_any |= existed,
            Err(err) => warnings.push(format!("failed to remove launcher entry: {err}")),
        }

        removed_any |= self.store.remove(name)?;

        for warning in &warnings {
            warn!(profile = name, "{warning}");
        }
        let status = if removed_any {
            info!(profile = name, "profile deleted");
            DeleteStatus::Deleted
        } else {
            DeleteStatus::NotFound
        };

        Ok(Outcome::with_warnings(
            DeleteReport {
                status,
                name: name.to_string(),
            },
            warnings,
        ))
    }

    /// Starts the profile's container, creating the profile directory and the
    /// container on first use.
    pub async fn start(&self, name: &str) -> AppResult<Outcome<StartReport>> {
        let name = validate_profile_name(name)?;
        let _guard = self.locks.acquire(name).await;
        let container = self.container_name(name);

        if let Some(info) = self.engine.inspect(&container).await? {
            if info.state.is_running() {
                debug!(profile = name, "container already running");
                return Ok(Outcome::new(StartReport {
                    status: StartStatus::AlreadyRunning,
                    container_id: None,
                }));
            }

            self.store.materialize(name)?;
            self.engine.start(&container).await?;
            info!(profile = name, %container, "container started");
            return Ok(Outcome::new(StartReport {
                status: StartStatus::Started,
                container_id: Some(info.id),
            }));
        }

        let profile_dir = self.store.materialize(name)?;
        let downloads_dir = profile_dir.join(DOWNLOADS_DIR);
        self.ensure_image().await?;

        let host = self.host.discover().await;
        let mut warnings = host.warnings.clone();
        if let Err(err) = self.host.grant_display_access().await {
            let message = format!("display access not configured: {err}");
            warn!(profile = name, "{message}");
            warnings.push(message);
        }

        if !self.launcher.exists(name) {
            self.install_launcher(name, &mut warnings).await;
        }

        let spec = build_run_spec(
            LaunchTarget {
                profile: name,
                container_name: &container,
                image: &self.runtime.image,
                profile_dir: &profile_dir,
                downloads_dir: &downloads_dir,
            },
            &host,
        );
        let container_id = self.engine.run(&spec).await?;
        info!(profile = name, %container, id = %container_id, "container created");

        Ok(Outcome::with_warnings(
            StartReport {
                status: StartStatus::Created,
                container_id: Some(container_id),
            },
            warnings,
        ))
    }

    pub async fn stop(&self, name: &str) -> AppResult<StopReport> {
        let name = validate_profile_name(name)?;
        let _guard = self.locks.acquire(name).await;
        let container = self.container_name(name);

        if self.engine.inspect(&container).await?.is_none() {
            return Ok(StopReport {
                status: StopStatus::NotFound,
            });
        }

        match self.engine.stop(&container).await {
            Ok(()) => {
                info!(profile = name, %container, "container stopped");
                Ok(StopReport {
                    status: StopStatus::Stopped,
                })
            }
            Err(AppError::NotFound(_)) => Ok(StopReport {
                status: StopStatus::NotFound,
            }),
            Err(err) => Err(err),
        }
    }

    /// Writes the profile as a single archive at `dest`, rooted at a folder
    /// named after the profile.
    pub async fn export(
        &self,
        name: &str,
        format: ArchiveFormat,
        dest: &Path,
    ) -> AppResult<ExportReport> {
        let name = validate_profile_name(name)?;
        let _guard = self.locks.acquire(name).await;
        let profile_dir = self
            .store
            .resolve(name)
            .ok_or_else(|| AppError::NotFound(name.to_string()))?;

        let parent = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(parent)?;
        let summary = archive::write_archive(&profile_dir, name, format, staged.as_file_mut())?;
        staged.as_file_mut().flush()?;
        staged.persist(dest).map_err(|err| AppError::Io(err.error))?;

        info!(
            profile = name,
            path = %dest.display(),
            entries = summary.entries,
            skipped = summary.skipped.len(),
            "profile exported"
        );
        Ok(ExportReport {
            status: ExportStatus::Exported,
            name: name.to_string(),
            path: dest.to_path_buf(),
            format,
            entries: summary.entries,
            skipped: summary.skipped.len(),
        })
    }

    /// Restores a profile from a zip or tar(.gz) archive.
    ///
    /// The profile name comes from the archive's top-level directory, or from
    /// `declared_filename` without its extension for flat archives. Entries are
    /// staged in a hidden directory under the profiles root and moved into
    /// place only after the final directory has been claimed.
    pub async fn import(
        &self,
        archive_path: &Path,
        declared_filename: &str,
    ) -> AppResult<Outcome<ImportedProfile>> {
        let format = archive::detect_format(archive_path)?.ok_or(AppError::UnsupportedFormat)?;
        let listing = archive::inspect(archive_path, format)?;
        let (name, flat) = match listing.namespace()? {
            Some(namespace) => (namespace, false),
            None => (archive::strip_archive_extension(declared_filename), true),
        };
        let name = validate_profile_name(&name)?.to_string();
        let _guard = self.locks.acquire(&name).await;

        if self.store.is_occupied(&name) {
            return Err(AppError::AlreadyExists(name));
        }

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(self.store.root())?;
        let report = archive::extract(
            archive_path,
            format,
            ExtractPlan {
                dest: staging.path(),
                profile: &name,
                flat,
            },
        )?;

        let extracted = staging.path().join(&name);
        if !extracted.is_dir() {
            return Err(AppError::ExtractionFailed(format!(
                "archive did not produce a `{name}` directory"
            )));
        }

        let profile_dir = self.store.entry_path(&name);
        self.store.claim_dir(&profile_dir, &name)?;
        if let Err(err) = fs::rename(&extracted, &profile_dir) {
            let _ = fs::remove_dir(&profile_dir);
            return Err(err.into());
        }
        fs::create_dir_all(profile_dir.join(DOWNLOADS_DIR))?;
        info!(
            profile = %name,
            format = format.extension(),
            entries = report.extracted,
            "profile imported"
        );

        let mut warnings: Vec<String> = report
            .ignored
            .iter()
            .map(|entry| format!("ignored archive entry outside the profile: {entry}"))
            .collect();
        self.install_launcher(&name, &mut warnings).await;

        Ok(Outcome::with_warnings(
            ImportedProfile {
                status: ImportStatus::Imported,
                path: profile_dir,
                name,
            },
            warnings,
        ))
    }

    /// Builds the container image if the engine does not have it yet.
    pub async fn ensure_image(&self) -> AppResult<ImageReport> {
        let image = self.runtime.image.clone();
        if self.engine.image_exists(&image).await? {
            return Ok(ImageReport {
                image,
                status: ImageStatus::Present,
            });
        }

        warn!(%image, "container image not found; building");
        let context = self.runtime.build_context.as_deref().ok_or_else(|| {
            AppError::Config(format!(
                "image {image} is missing and no build_context is configured"
            ))
        })?;
        self.engine.build_image(&image, context).await?;

        Ok(ImageReport {
            image,
            status: ImageStatus::Built,
        })
    }

    async fn container_state(&self, name: &str) -> AppResult<ContainerState> {
        let info = self.engine.inspect(&self.container_name(name)).await?;
        Ok(info.map_or(ContainerState::NotFound, |info| info.state))
    }

    async fn install_launcher(&self, name: &str, warnings: &mut Vec<String>) {
        match self.launcher.install(name).await {
            Ok(installed) => warnings.extend(installed.warnings),
            Err(err) => {
                let message = format!("failed to install launcher entry: {err}");
                warn!(profile = name, "{message}");
                warnings.push(message);
            }
        }
    }
}
