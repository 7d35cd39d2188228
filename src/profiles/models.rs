use std::path::PathBuf;

use serde::Serialize;

use crate::archive::ArchiveFormat;
use crate::engine::ContainerState;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Size in megabytes rounded to two decimals.
pub fn size_mb(bytes: u64) -> f64 {
    ((bytes as f64 / BYTES_PER_MB) * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub status: ContainerState,
    pub size_mb: f64,
    #[serde(skip)]
    pub size_bytes: u64,
    pub has_desktop_entry: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileList {
    pub profiles: Vec<ProfileSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileStatus {
    pub name: String,
    pub status: ContainerState,
    pub size_mb: f64,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateStatus {
    Created,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedProfile {
    pub status: CreateStatus,
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteStatus {
    Deleted,
    NotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteReport {
    pub status: DeleteStatus,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartStatus {
    AlreadyRunning,
    Started,
    Created,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartReport {
    pub status: StartStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    Stopped,
    NotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct StopReport {
    pub status: StopStatus,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    Exported,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub status: ExportStatus,
    pub name: String,
    pub path: PathBuf,
    pub format: ArchiveFormat,
    pub entries: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Imported,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportedProfile {
    pub status: ImportStatus,
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    Present,
    Built,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub image: String,
    pub status: ImageStatus,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rounds_sizes_to_two_decimals() {
        assert_eq!(size_mb(0), 0.0);
        assert_eq!(size_mb(1024 * 1024), 1.0);
        assert_eq!(size_mb(1_572_864), 1.5);
        assert_eq!(size_mb(10_000), 0.01);
    }

    #[test]
    fn start_report_omits_missing_container_id() {
        let report = StartReport {
            status: StartStatus::AlreadyRunning,
            container_id: None,
        };
        assert_eq!(
            serde_json::to_value(&report).expect("serialise"),
            json!({"status": "already_running"})
        );
    }

    #[test]
    fn summary_matches_list_contract() {
        let summary = ProfileSummary {
            name: "work".to_string(),
            status: ContainerState::NotFound,
            size_mb: 0.0,
            size_bytes: 0,
            has_desktop_entry: true,
        };
        assert_eq!(
            serde_json::to_value(&summary).expect("serialise"),
            json!({"name": "work", "status": "not_found", "size_mb": 0.0, "has_desktop_entry": true})
        );
    }
}
