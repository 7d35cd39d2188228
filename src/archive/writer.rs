use std::fs::{self, File};
use std::io::{self, ErrorKind, Seek, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::error::AppResult;

use super::ArchiveFormat;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSummary {
    pub entries: usize,
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug)]
enum PlannedEntry {
    Dir { name: String },
    File { name: String, source: PathBuf, mode: u32 },
}

/// Packs `profile_dir` into `out`, rooted at a folder named `root_name`.
///
/// Hidden files are included. Symlinks are stored as the file they point to,
/// but only when the target resolves inside `profile_dir`; anything else,
/// including unreadable files, is skipped and listed in the summary.
pub fn write_archive<W: Write + Seek>(
    profile_dir: &Path,
    root_name: &str,
    format: ArchiveFormat,
    out: W,
) -> AppResult<ExportSummary> {
    let (plan, mut skipped) = plan_entries(profile_dir, root_name);
    let entries = match format {
        ArchiveFormat::Zip => write_zip(&plan, out, &mut skipped)?,
        ArchiveFormat::TarGz => {
            let encoder = GzEncoder::new(out, Compression::default());
            let (encoder, written) = write_tar(&plan, encoder, &mut skipped)?;
            encoder.finish()?;
            written
        }
        ArchiveFormat::Tar => write_tar(&plan, out, &mut skipped)?.1,
    };

    Ok(ExportSummary { entries, skipped })
}

fn plan_entries(profile_dir: &Path, root_name: &str) -> (Vec<PlannedEntry>, Vec<PathBuf>) {
    let mut plan = vec![PlannedEntry::Dir {
        name: format!("{root_name}/"),
    }];
    let mut skipped = Vec::new();
    let real_root = fs::canonicalize(profile_dir).unwrap_or_else(|_| profile_dir.to_path_buf());

    let walker = WalkDir::new(profile_dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(%err, "skipping path during export walk");
                if let Some(path) = err.path() {
                    skipped.push(path.to_path_buf());
                }
                continue;
            }
        };

        let path = entry.path();
        let Some(name) = archive_name(profile_dir, root_name, path) else {
            debug!(path = %path.display(), "skipping non utf-8 path");
            skipped.push(path.to_path_buf());
            continue;
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            plan.push(PlannedEntry::Dir {
                name: format!("{name}/"),
            });
        } else if file_type.is_file() {
            let mode = entry.metadata().map(|meta| file_mode(&meta)).unwrap_or(0o644);
            plan.push(PlannedEntry::File {
                name,
                source: path.to_path_buf(),
                mode,
            });
        } else if file_type.is_symlink() {
            match internal_link_mode(&real_root, path) {
                Some(mode) => plan.push(PlannedEntry::File {
                    name,
                    source: path.to_path_buf(),
                    mode,
                }),
                None => {
                    debug!(path = %path.display(), "skipping symlink outside the profile");
                    skipped.push(path.to_path_buf());
                }
            }
        } else {
            skipped.push(path.to_path_buf());
        }
    }

    (plan, skipped)
}

/// Returns the target's mode when `link`, followed through every symlink on
/// the way, ends at a regular file inside `real_root`.
fn internal_link_mode(real_root: &Path, link: &Path) -> Option<u32> {
    let target = fs::canonicalize(link).ok()?;
    if !target.starts_with(real_root) {
        return None;
    }

    let meta = fs::metadata(&target).ok()?;
    meta.is_file().then(|| file_mode(&meta))
}

fn archive_name(profile_dir: &Path, root_name: &str, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(profile_dir).ok()?;
    let mut name = root_name.to_string();
    for component in relative.components() {
        name.push('/');
        name.push_str(component.as_os_str().to_str()?);
    }
    Some(name)
}

fn open_source(source: &Path, skipped: &mut Vec<PathBuf>) -> io::Result<Option<File>> {
    match File::open(source) {
        Ok(file) => Ok(Some(file)),
        Err(err) if matches!(err.kind(), ErrorKind::PermissionDenied | ErrorKind::NotFound) => {
            debug!(path = %source.display(), %err, "skipping unreadable file during export");
            skipped.push(source.to_path_buf());
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn write_zip<W: Write + Seek>(
    plan: &[PlannedEntry],
    out: W,
    skipped: &mut Vec<PathBuf>,
) -> AppResult<usize> {
    let mut zip = zip::ZipWriter::new(out);
    let mut written = 0;

    for entry in plan {
        match entry {
            PlannedEntry::Dir { name } => {
                zip.add_directory(name.as_str(), zip_options(0o755))
                    .map_err(io::Error::from)?;
            }
            PlannedEntry::File { name, source, mode } => {
                let Some(mut file) = open_source(source, skipped)? else {
                    continue;
                };
                let large = file.metadata().map(|meta| meta.len() >= u64::from(u32::MAX))?;
                let options = zip_options(*mode).large_file(large);
                zip.start_file(name.as_str(), options)
                    .map_err(io::Error::from)?;
                io::copy(&mut file, &mut zip)?;
            }
        }
        written += 1;
    }

    zip.finish().map_err(io::Error::from)?;
    Ok(written)
}

fn zip_options(mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(mode)
}

fn write_tar<W: Write>(
    plan: &[PlannedEntry],
    out: W,
    skipped: &mut Vec<PathBuf>,
) -> AppResult<(W, usize)> {
    let mut builder = tar::Builder::new(out);
    let mut written = 0;

    for entry in plan {
        match entry {
            PlannedEntry::Dir { name } => {
                let mut header = tar::Header::new_gnu();
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                builder.append_data(&mut header, name.trim_end_matches('/'), io::empty())?;
            }
            PlannedEntry::File { name, source, mode } => {
                let Some(mut file) = open_source(source, skipped)? else {
                    continue;
                };
                let mut header = tar::Header::new_gnu();
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(*mode);
                header.set_size(file.metadata()?.len());
                builder.append_data(&mut header, name, &mut file)?;
            }
        }
        written += 1;
    }

    Ok((builder.into_inner()?, written))
}

#[cfg(unix)]
fn file_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
