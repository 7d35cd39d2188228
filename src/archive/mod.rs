//! Single-file archive codecs for profile directories.
//!
//! Two codecs are supported: zip (deflate) and tar, optionally gzip
//! compressed. Reading picks the codec by sniffing content, never by file
//! extension. Every entry path is normalised before it touches disk and any
//! entry that would land outside the destination is rejected.

mod detect;
mod entry;
mod reader;
mod writer;

use serde::Serialize;

pub use detect::{detect_format, looks_like_tar};
pub use entry::{entry_components, join_components, resolve_link_target};
pub use reader::{ArchiveListing, ExtractPlan, ExtractReport, extract, inspect};
pub use writer::{ExportSummary, write_archive};

/// Codec selected by [`detect_format`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

const KNOWN_SUFFIXES: [&str; 4] = [".tar.gz", ".tgz", ".tar", ".zip"];

/// Strips a known archive suffix (or the last extension) from an uploaded
/// file name, keeping only the final path component.
pub fn strip_archive_extension(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    let lowered = base.to_ascii_lowercase();
    for suffix in KNOWN_SUFFIXES {
        if lowered.ends_with(suffix) && lowered.len() > suffix.len() {
            return base[..base.len() - suffix.len()].to_string();
        }
    }

    match base.rfind('.') {
        Some(index) if index > 0 => base[..index].to_string(),
        _ => base.to_string(),
    }
}
