use std::io;

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid profile name `{0}`. use only letters, numbers, dash, and underscore")]
    InvalidName(String),
    #[error("profile `{0}` already exists")]
    AlreadyExists(String),
    #[error("profile `{0}` not found")]
    NotFound(String),
    #[error("archive contains no entries")]
    EmptyArchive,
    #[error("unsupported archive format. use .zip or .tar.gz")]
    UnsupportedFormat,
    #[error("failed to extract profile: {0}")]
    ExtractionFailed(String),
    #[error("container engine error: {0}")]
    Engine(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// Stable snake_case identifier used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidName(_) => "invalid_name",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::NotFound(_) => "not_found",
            AppError::EmptyArchive => "empty_archive",
            AppError::UnsupportedFormat => "unsupported_format",
            AppError::ExtractionFailed(_) | AppError::Archive(_) => "extraction_failed",
            AppError::Engine(_) => "engine_error",
            AppError::Config(_) => "config_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Io(_) => "io_error",
            AppError::Http(_) => "http_error",
            AppError::Json(_) => "json_error",
            AppError::Url(_) => "url_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(AppError::InvalidName("a b".into()).kind(), "invalid_name");
        assert_eq!(AppError::EmptyArchive.kind(), "empty_archive");
        assert_eq!(AppError::UnsupportedFormat.kind(), "unsupported_format");
        assert_eq!(
            AppError::Io(io::Error::other("disk gone")).kind(),
            "io_error"
        );
    }
}
