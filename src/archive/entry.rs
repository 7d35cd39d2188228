use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Splits an archive entry name into safe path components.
///
/// Both `/` and `\` separate components. `.` and empty components are
/// dropped. Absolute names, a leading drive prefix and `..` are rejected
/// outright so that no entry can resolve outside the extraction root.
pub fn entry_components(raw: &str) -> AppResult<Vec<String>> {
    if raw.starts_with('/') || raw.starts_with('\\') {
        return Err(escape_error(raw));
    }

    let mut components = Vec::new();
    for part in raw.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => return Err(escape_error(raw)),
            _ if part.contains('\0') => return Err(escape_error(raw)),
            _ if components.is_empty() && is_drive_prefix(part) => {
                return Err(escape_error(raw));
            }
            _ => components.push(part.to_string()),
        }
    }

    if components.is_empty() {
        return Err(AppError::ExtractionFailed(format!(
            "archive entry `{raw}` has an empty path"
        )));
    }

    Ok(components)
}

/// The archive's own root (`.`, `./`), which carries no path of its own.
pub fn is_root_entry(raw: &str) -> bool {
    !raw.is_empty()
        && !raw.starts_with(['/', '\\'])
        && raw.split(['/', '\\']).all(|part| part.is_empty() || part == ".")
}

/// `C:` or `C:rest`, which Windows treats as drive-relative.
fn is_drive_prefix(part: &str) -> bool {
    let bytes = part.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

pub fn join_components(base: &Path, components: &[String]) -> PathBuf {
    let mut path = base.to_path_buf();
    for component in components {
        path.push(component);
    }
    path
}

/// Lexically resolves `target` as seen from `link_dir`, without touching the
/// filesystem. Returns `None` if the result climbs above the filesystem root.
pub fn resolve_link_target(link_dir: &Path, target: &Path) -> Option<PathBuf> {
    let joined = if target.is_absolute() {
        target.to_path_buf()
    } else {
        link_dir.join(target)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                if !resolved.pop() {
                    return None;
                }
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Some(resolved)
}

fn escape_error(raw: &str) -> AppError {
    AppError::ExtractionFailed(format!(
        "archive entry `{raw}` escapes the extraction root"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_nested_names() {
        assert_eq!(
            entry_components("work/Default/Cookies").expect("safe"),
            ["work", "Default", "Cookies"]
        );
        assert_eq!(entry_components("work/").expect("safe"), ["work"]);
        assert_eq!(entry_components("./work/./a").expect("safe"), ["work", "a"]);
        assert_eq!(entry_components("work\\b").expect("safe"), ["work", "b"]);
    }

    #[test]
    fn keeps_hidden_names() {
        assert_eq!(
            entry_components("work/.config/.lock").expect("safe"),
            ["work", ".config", ".lock"]
        );
    }

    #[test]
    fn rejects_escaping_names() {
        for raw in [
            "evil/../../etc/passwd",
            "../outside",
            "/etc/passwd",
            "\\windows",
            "C:/boot.ini",
            "C:boot.ini",
            "a/..",
            "work/nul\0byte",
        ] {
            let err = entry_components(raw).expect_err("escape should be rejected");
            assert!(matches!(err, AppError::ExtractionFailed(_)), "{raw}");
        }
    }

    #[test]
    fn rejects_empty_names() {
        assert!(entry_components("").is_err());
        assert!(entry_components("./").is_err());
    }

    #[test]
    fn allows_colons_past_the_first_component() {
        assert_eq!(
            entry_components("work/state:1").expect("safe"),
            ["work", "state:1"]
        );
        assert_eq!(
            entry_components("work/Default/a:b:c").expect("safe"),
            ["work", "Default", "a:b:c"]
        );
    }

    #[test]
    fn recognises_root_entries() {
        for raw in [".", "./", "./.", ".\\"] {
            assert!(is_root_entry(raw), "{raw}");
        }
        for raw in ["", "/", "./work", "work/"] {
            assert!(!is_root_entry(raw), "{raw}");
        }
    }

    #[test]
    fn resolves_relative_link_targets() {
        let dir = Path::new("/home/me/Chrome/work/Default");
        assert_eq!(
            resolve_link_target(dir, Path::new("../Local State")),
            Some(PathBuf::from("/home/me/Chrome/work/Local State"))
        );
        assert_eq!(
            resolve_link_target(dir, Path::new("/etc/passwd")),
            Some(PathBuf::from("/etc/passwd"))
        );
    }
}
