use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::error::{AppError, AppResult};

use super::ArchiveFormat;
use super::entry::{entry_components, is_root_entry, join_components, resolve_link_target};

/// What [`inspect`] learned about an archive before anything is written.
#[derive(Debug, Clone)]
pub struct ArchiveListing {
    pub format: ArchiveFormat,
    pub entries: usize,
    pub first_entry: String,
    pub first_is_dir: bool,
}

impl ArchiveListing {
    /// Top-level directory shared by the entries, judged from the first entry
    /// the way the archive was written. `None` means a flat archive.
    pub fn namespace(&self) -> AppResult<Option<String>> {
        let components = entry_components(&self.first_entry)?;
        if components.len() > 1 || self.first_is_dir {
            return Ok(components.into_iter().next());
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractPlan<'a> {
    /// Directory the archive tree is materialised under.
    pub dest: &'a Path,
    /// Name of the single top-level directory that is kept.
    pub profile: &'a str,
    /// Entries are not namespaced and get placed under `profile/`.
    pub flat: bool,
}

impl ExtractPlan<'_> {
    fn target(&self, raw: &str) -> AppResult<Option<Vec<String>>> {
        let components = entry_components(raw)?;
        if self.flat {
            let mut rooted = Vec::with_capacity(components.len() + 1);
            rooted.push(self.profile.to_string());
            rooted.extend(components);
            return Ok(Some(rooted));
        }

        if components.first().map(String::as_str) != Some(self.profile) {
            return Ok(None);
        }
        Ok(Some(components))
    }

    fn profile_root(&self) -> PathBuf {
        self.dest.join(self.profile)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    pub extracted: usize,
    pub ignored: Vec<String>,
}

/// Counts entries, records the first one and validates every entry name.
///
/// Fails with `EmptyArchive` for an archive without entries and with
/// `ExtractionFailed` when any entry name would escape its root.
pub fn inspect(path: &Path, format: ArchiveFormat) -> AppResult<ArchiveListing> {
    match format {
        ArchiveFormat::Zip => inspect_zip(path),
        ArchiveFormat::Tar | ArchiveFormat::TarGz => inspect_tar(path, format),
    }
}

pub fn extract(
    path: &Path,
    format: ArchiveFormat,
    plan: ExtractPlan<'_>,
) -> AppResult<ExtractReport> {
    fs::create_dir_all(plan.profile_root())?;
    match format {
        ArchiveFormat::Zip => extract_zip(path, plan),
        ArchiveFormat::Tar | ArchiveFormat::TarGz => extract_tar(path, format, plan),
    }
}

fn inspect_zip(path: &Path) -> AppResult<ArchiveListing> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut entries = 0;
    let mut first = None;

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if is_root_entry(entry.name()) {
            continue;
        }
        entry_components(entry.name())?;
        if first.is_none() {
            first = Some((entry.name().to_string(), entry.is_dir()));
        }
        entries += 1;
    }

    listing(ArchiveFormat::Zip, entries, first)
}

fn inspect_tar(path: &Path, format: ArchiveFormat) -> AppResult<ArchiveListing> {
    let mut archive = open_tar(path, format)?;
    let mut entries = 0;
    let mut first = None;

    for entry in archive.entries().map_err(corrupt)? {
        let entry = entry.map_err(corrupt)?;
        let name = entry.path().map_err(corrupt)?.to_string_lossy().into_owned();
        if is_root_entry(&name) {
            continue;
        }
        entry_components(&name)?;
        if first.is_none() {
            first = Some((name, entry.header().entry_type().is_dir()));
        }
        entries += 1;
    }

    listing(format, entries, first)
}

fn listing(
    format: ArchiveFormat,
    entries: usize,
    first: Option<(String, bool)>,
) -> AppResult<ArchiveListing> {
    let Some((first_entry, first_is_dir)) = first else {
        return Err(AppError::EmptyArchive);
    };

    Ok(ArchiveListing {
        format,
        entries,
        first_entry,
        first_is_dir,
    })
}

fn extract_zip(path: &Path, plan: ExtractPlan<'_>) -> AppResult<ExtractReport> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut report = ExtractReport::default();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let raw = entry.name().to_string();
        if is_root_entry(&raw) {
            continue;
        }
        let Some(components) = plan.target(&raw)? else {
            report.ignored.push(raw);
            continue;
        };

        let target = join_components(plan.dest, &components);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;

            fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o7777))?;
        }

        report.extracted += 1;
    }

    Ok(report)
}

fn extract_tar(
    path: &Path,
    format: ArchiveFormat,
    plan: ExtractPlan<'_>,
) -> AppResult<ExtractReport> {
    let mut archive = open_tar(path, format)?;
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);

    let unpack_root = if plan.flat {
        plan.profile_root()
    } else {
        plan.dest.to_path_buf()
    };
    let mut report = ExtractReport::default();

    for entry in archive.entries().map_err(corrupt)? {
        let mut entry = entry.map_err(corrupt)?;
        let raw = entry.path().map_err(corrupt)?.to_string_lossy().into_owned();
        if is_root_entry(&raw) {
            continue;
        }
        let Some(components) = plan.target(&raw)? else {
            report.ignored.push(raw);
            continue;
        };

        if !link_stays_inside(&plan, &components, &entry)? {
            warn!(entry = %raw, "skipping link that points outside the profile");
            report.ignored.push(raw);
            continue;
        }

        if !entry.unpack_in(&unpack_root).map_err(corrupt)? {
            return Err(AppError::ExtractionFailed(format!(
                "archive entry `{raw}` escapes the extraction root"
            )));
        }
        debug!(entry = %raw, "extracted");
        report.extracted += 1;
    }

    prune_escaping_links(&plan, &mut report)?;
    Ok(report)
}

/// Removes unpacked symlinks whose target, resolved through the links now on
/// disk, leaves the profile. Repeats until stable, since removing one link
/// can leave another dangling through it.
fn prune_escaping_links(plan: &ExtractPlan<'_>, report: &mut ExtractReport) -> AppResult<()> {
    let root = plan.profile_root();
    let real_root = fs::canonicalize(&root)?;

    loop {
        let mut escaping = Vec::new();
        for entry in WalkDir::new(&root).min_depth(1).follow_links(false) {
            let entry = entry.map_err(io::Error::from)?;
            if entry.path_is_symlink() && !link_resolves_inside(entry.path(), &real_root) {
                escaping.push(entry.into_path());
            }
        }

        if escaping.is_empty() {
            return Ok(());
        }

        for link in escaping {
            fs::remove_file(&link)?;
            let name = link
                .strip_prefix(plan.dest)
                .unwrap_or(&link)
                .to_string_lossy()
                .replace('\\', "/");
            warn!(entry = %name, "removed link that resolves outside the profile");
            report.extracted = report.extracted.saturating_sub(1);
            report.ignored.push(name);
        }
    }
}

fn link_resolves_inside(link: &Path, real_root: &Path) -> bool {
    let (Ok(target), Some(parent)) = (fs::read_link(link), link.parent()) else {
        return false;
    };
    resolve_on_disk(&parent.join(target)).is_some_and(|real| real.starts_with(real_root))
}

/// Canonicalises the deepest existing ancestor of `path`, following every
/// symlink on the way, then applies the remaining components lexically.
fn resolve_on_disk(path: &Path) -> Option<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut rest = Vec::new();

    loop {
        if let Ok(real) = fs::canonicalize(&existing) {
            let tail: PathBuf = rest.iter().rev().collect();
            return resolve_link_target(&real, &tail);
        }
        rest.push(existing.file_name()?.to_os_string());
        if !existing.pop() {
            return None;
        }
    }
}

fn link_stays_inside<R: Read>(
    plan: &ExtractPlan<'_>,
    components: &[String],
    entry: &tar::Entry<'_, R>,
) -> AppResult<bool> {
    let kind = entry.header().entry_type();
    if !kind.is_symlink() && !kind.is_hard_link() {
        return Ok(true);
    }

    let Some(link) = entry.link_name().map_err(corrupt)? else {
        return Ok(false);
    };

    if kind.is_hard_link() {
        let raw = link.to_string_lossy();
        return Ok(matches!(plan.target(&raw), Ok(Some(_))));
    }

    let target = join_components(plan.dest, components);
    let Some(parent) = target.parent() else {
        return Ok(false);
    };
    let resolved = resolve_link_target(parent, &link);
    Ok(resolved.is_some_and(|resolved| resolved.starts_with(plan.profile_root())))
}

fn open_tar(path: &Path, format: ArchiveFormat) -> AppResult<tar::Archive<Box<dyn Read>>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = match format {
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(file)),
        _ => Box::new(file),
    };
    Ok(tar::Archive::new(reader))
}

fn corrupt(err: io::Error) -> AppError {
    AppError::ExtractionFailed(format!("corrupt archive: {err}"))
}
