use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::AppResult;

use super::ArchiveFormat;

const TAR_BLOCK: usize = 512;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZIP_MAGICS: [&[u8; 4]; 3] = [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];
const USTAR_MAGIC: &[u8; 5] = b"ustar";
const CHECKSUM_FIELD: std::ops::Range<usize> = 148..156;

/// Runs the format probes in order: zip, gzip-wrapped tar, plain tar.
///
/// Returns `Ok(None)` when no probe recognises the content.
pub fn detect_format(path: &Path) -> AppResult<Option<ArchiveFormat>> {
    let head = read_block(&mut File::open(path)?)?;

    if ZIP_MAGICS.iter().any(|magic| head.starts_with(*magic)) {
        return Ok(Some(ArchiveFormat::Zip));
    }

    if head.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(File::open(path)?);
        // A corrupt stream is simply "not a tar.gz".
        let inner = read_block(&mut decoder).unwrap_or_default();
        return Ok(looks_like_tar(&inner).then_some(ArchiveFormat::TarGz));
    }

    if looks_like_tar(&head) {
        return Ok(Some(ArchiveFormat::Tar));
    }

    Ok(None)
}

/// Structural check of a first tar block: an end-of-archive zero block, a
/// POSIX `ustar` magic, or a legacy header with a valid checksum.
pub fn looks_like_tar(block: &[u8]) -> bool {
    if block.len() < TAR_BLOCK {
        return false;
    }

    if block[..TAR_BLOCK].iter().all(|byte| *byte == 0) {
        return true;
    }

    if &block[257..262] == USTAR_MAGIC {
        return true;
    }

    header_checksum_matches(&block[..TAR_BLOCK])
}

fn read_block<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(TAR_BLOCK);
    reader.take(TAR_BLOCK as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

fn header_checksum_matches(header: &[u8]) -> bool {
    let Some(expected) = parse_octal(&header[CHECKSUM_FIELD]) else {
        return false;
    };

    let actual: u64 = header
        .iter()
        .enumerate()
        .map(|(index, byte)| {
            if CHECKSUM_FIELD.contains(&index) {
                u64::from(b' ')
            } else {
                u64::from(*byte)
            }
        })
        .sum();

    actual == expected
}

fn parse_octal(field: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(field).ok()?;
    let trimmed = text.trim_matches(|c: char| c == '\0' || c == ' ');
    if trimmed.is_empty() {
        return None;
    }

    u64::from_str_radix(trimmed, 8).ok()
}
