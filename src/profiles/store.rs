use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::is_valid_profile_name;
use crate::error::{AppError, AppResult};

pub const DOWNLOADS_DIR: &str = "Downloads";

/// The profiles root on disk: the single source of truth for which profiles
/// exist.
///
/// Each profile is `root/<name>`, either a real directory or a symbolic link
/// ("location pointer") to a directory created elsewhere.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `root/<name>`, without following a location pointer.
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// True when `path` lies under the root, where it would be listed as a
    /// profile of its own.
    pub fn contains(&self, path: &Path) -> bool {
        if path.starts_with(&self.root) {
            return true;
        }
        let real_path = path
            .parent()
            .and_then(|parent| fs::canonicalize(parent).ok())
            .zip(path.file_name())
            .map(|(parent, name)| parent.join(name));
        match (fs::canonicalize(&self.root), real_path) {
            (Ok(root), Some(real_path)) => real_path.starts_with(root),
            _ => false,
        }
    }

    /// True when anything (directory, pointer, or stray file) occupies the
    /// profile's slot in the root.
    pub fn is_occupied(&self, name: &str) -> bool {
        fs::symlink_metadata(self.entry_path(name)).is_ok()
    }

    /// Directory holding the profile's data, following a location pointer.
    /// `None` when the profile does not exist.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let entry = self.entry_path(name);
        if !entry.is_dir() {
            return None;
        }
        Some(fs::canonicalize(&entry).unwrap_or(entry))
    }

    /// Atomically claims an empty directory at `path`.
    ///
    /// Parents are created as needed; the final component must not exist.
    pub fn claim_dir(&self, path: &Path, name: &str) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        match fs::create_dir(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                Err(AppError::AlreadyExists(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Records a custom-location profile as `root/<name> -> target`.
    #[cfg(unix)]
    pub fn link_location(&self, name: &str, target: &Path) -> AppResult<()> {
        match std::os::unix::fs::symlink(target, self.entry_path(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                Err(AppError::AlreadyExists(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    #[cfg(not(unix))]
    pub fn link_location(&self, _name: &str, _target: &Path) -> AppResult<()> {
        Err(AppError::InvalidInput(
            "custom profile locations require a unix host".to_string(),
        ))
    }

    /// Creates the profile directory and its Downloads folder if missing and
    /// returns the resolved profile directory.
    pub fn materialize(&self, name: &str) -> AppResult<PathBuf> {
        let entry = self.entry_path(name);
        fs::create_dir_all(&entry)?;
        let dir = fs::canonicalize(&entry)?;
        fs::create_dir_all(dir.join(DOWNLOADS_DIR))?;
        Ok(dir)
    }

    /// Removes the profile tree and, for custom locations, the pointer.
    /// Returns `false` when nothing was there.
    pub fn remove(&self, name: &str) -> AppResult<bool> {
        let entry = self.entry_path(name);
        let meta = match fs::symlink_metadata(&entry) {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        if meta.file_type().is_symlink() {
            if let Ok(target) = fs::canonicalize(&entry) {
                if target.is_dir() {
                    remove_tree(&target)?;
                }
            }
            fs::remove_file(&entry)?;
        } else if meta.is_dir() {
            remove_tree(&entry)?;
        } else {
            fs::remove_file(&entry)?;
        }

        debug!(profile = name, "profile directory removed");
        Ok(true)
    }

    /// Valid profile names present in the root, sorted.
    pub fn list_names(&self) -> AppResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_valid_profile_name(&name) {
                continue;
            }
            if entry.path().is_dir() {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}

/// Recursive sum of regular file sizes. Symlinks are not followed and
/// unreadable entries are ignored.
pub fn dir_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

fn remove_tree(path: &Path) -> AppResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
