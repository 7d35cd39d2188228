#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chromebox::engine::{ContainerEngine, ContainerInfo, ContainerState, RunSpec};
use chromebox::error::{AppError, AppResult};
use chromebox::host::{HostIntegration, HostProbe};
use chromebox::launcher::LauncherRegistry;
use chromebox::outcome::Outcome;
use chromebox::profiles::{Orchestrator, ProfileStore, RuntimeConfig};

pub const IMAGE: &str = "isolated-chrome";
pub const PREFIX: &str = "chrome-";

pub type TestOrchestrator = Orchestrator<FakeEngine, FakeLauncher, FakeHost>;

pub fn orchestrator(root: &Path) -> TestOrchestrator {
    orchestrator_with(root, FakeEngine::with_image(IMAGE), FakeLauncher::default())
}

pub fn orchestrator_with(
    root: &Path,
    engine: FakeEngine,
    launcher: FakeLauncher,
) -> TestOrchestrator {
    Orchestrator::new(
        ProfileStore::new(root.to_path_buf()),
        engine,
        launcher,
        FakeHost::default(),
        RuntimeConfig {
            image: IMAGE.to_string(),
            container_prefix: PREFIX.to_string(),
            build_context: None,
        },
    )
}

/// In-memory container engine. Every call yields once so concurrent callers
/// interleave the way they would against a real daemon.
#[derive(Debug, Default)]
pub struct FakeEngine {
    containers: Mutex<BTreeMap<String, ContainerInfo>>,
    images: Mutex<BTreeSet<String>>,
    runs: AtomicUsize,
    builds: AtomicUsize,
    last_spec: Mutex<Option<RunSpec>>,
    pub fail_remove: AtomicBool,
    pub fail_inspect: AtomicBool,
}

impl FakeEngine {
    pub fn with_image(image: &str) -> Self {
        let engine = Self::default();
        engine.images.lock().unwrap().insert(image.to_string());
        engine
    }

    pub fn insert(&self, name: &str, state: ContainerState) {
        self.containers.lock().unwrap().insert(
            name.to_string(),
            ContainerInfo {
                id: format!("id-{name}"),
                name: name.to_string(),
                state,
            },
        );
    }

    pub fn state_of(&self, name: &str) -> Option<ContainerState> {
        self.containers
            .lock()
            .unwrap()
            .get(name)
            .map(|info| info.state.clone())
    }

    pub fn container_count(&self) -> usize {
        self.containers.lock().unwrap().len()
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn last_spec(&self) -> Option<RunSpec> {
        self.last_spec.lock().unwrap().clone()
    }

    fn set_state(&self, name: &str, state: ContainerState) -> AppResult<()> {
        let mut containers = self.containers.lock().unwrap();
        let info = containers
            .get_mut(name)
            .ok_or_else(|| AppError::NotFound(name.to_string()))?;
        info.state = state;
        Ok(())
    }
}

impl ContainerEngine for FakeEngine {
    async fn image_exists(&self, image: &str) -> AppResult<bool> {
        tokio::task::yield_now().await;
        Ok(self.images.lock().unwrap().contains(image))
    }

    async fn build_image(&self, image: &str, _context_dir: &Path) -> AppResult<()> {
        tokio::task::yield_now().await;
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.images.lock().unwrap().insert(image.to_string());
        Ok(())
    }

    async fn inspect(&self, name: &str) -> AppResult<Option<ContainerInfo>> {
        tokio::task::yield_now().await;
        if self.fail_inspect.load(Ordering::SeqCst) {
            return Err(AppError::Engine("daemon unreachable".to_string()));
        }
        Ok(self.containers.lock().unwrap().get(name).cloned())
    }

    async fn run(&self, spec: &RunSpec) -> AppResult<String> {
        tokio::task::yield_now().await;
        let mut containers = self.containers.lock().unwrap();
        if containers.contains_key(&spec.name) {
            return Err(AppError::AlreadyExists(spec.name.clone()));
        }

        let id = format!("id-{}", spec.name);
        containers.insert(
            spec.name.clone(),
            ContainerInfo {
                id: id.clone(),
                name: spec.name.clone(),
                state: ContainerState::Running,
            },
        );
        self.runs.fetch_add(1, Ordering::SeqCst);
        *self.last_spec.lock().unwrap() = Some(spec.clone());
        Ok(id)
    }

    async fn start(&self, name: &str) -> AppResult<()> {
        tokio::task::yield_now().await;
        self.set_state(name, ContainerState::Running)
    }

    async fn stop(&self, name: &str) -> AppResult<()> {
        tokio::task::yield_now().await;
        self.set_state(name, ContainerState::Exited)
    }

    async fn remove(&self, name: &str) -> AppResult<()> {
        tokio::task::yield_now().await;
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(AppError::Engine("removal refused".to_string()));
        }
        self.containers
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(name.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct FakeLauncher {
    entries: Mutex<BTreeSet<String>>,
    pub fail_install: AtomicBool,
}

impl FakeLauncher {
    pub fn failing() -> Self {
        let launcher = Self::default();
        launcher.fail_install.store(true, Ordering::SeqCst);
        launcher
    }

    pub fn installed(&self) -> Vec<String> {
        self.entries.lock().unwrap().iter().cloned().collect()
    }
}

impl LauncherRegistry for FakeLauncher {
    async fn install(&self, profile: &str) -> AppResult<Outcome<PathBuf>> {
        if self.fail_install.load(Ordering::SeqCst) {
            let err = std::io::Error::other("read-only applications dir");
            return Err(AppError::Io(err));
        }
        self.entries.lock().unwrap().insert(profile.to_string());
        Ok(Outcome::new(PathBuf::from(format!("chrome-{profile}.desktop"))))
    }

    async fn remove(&self, profile: &str) -> AppResult<bool> {
        Ok(self.entries.lock().unwrap().remove(profile))
    }

    fn exists(&self, profile: &str) -> bool {
        self.entries.lock().unwrap().contains(profile)
    }
}

/// A host with a display but no audio.
#[derive(Debug, Default)]
pub struct FakeHost;

impl HostProbe for FakeHost {
    async fn discover(&self) -> HostIntegration {
        HostIntegration {
            display: ":0".to_string(),
            x11_socket_dir: None,
            pulse_dir: None,
            audio_cookie: None,
            device_group_ids: vec![44],
            dns_servers: vec!["8.8.8.8".to_string()],
            warnings: vec!["audio cookie not found".to_string()],
        }
    }

    async fn grant_display_access(&self) -> AppResult<()> {
        Err(AppError::Engine("xhost not installed".to_string()))
    }
}

/// Relative path -> contents (`None` for directories) for every entry under
/// `dir`, reading through symlinks.
pub fn snapshot(dir: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let relative = entry
                .path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            let contents = if entry.path().is_dir() {
                None
            } else {
                Some(std::fs::read(entry.path()).unwrap())
            };
            (relative, contents)
        })
        .collect()
}
