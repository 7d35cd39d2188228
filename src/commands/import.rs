use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::cli::ImportArgs;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

const STDIN_MARKER: &str = "-";

pub async fn run(ctx: &AppContext, args: ImportArgs) -> AppResult<()> {
    let from_stdin = args.archive.as_os_str() == STDIN_MARKER;
    let declared = declared_filename(&args.archive, args.filename.as_deref(), from_stdin)?;

    // The upload copy lives only as long as this handle, on every path.
    let upload = if from_stdin {
        Some(buffer_stdin()?)
    } else {
        None
    };
    let archive = upload
        .as_ref()
        .map_or(args.archive.as_path(), NamedTempFile::path);

    let imported = ctx.orchestrator.import(archive, &declared).await?;

    let text = format!(
        "imported profile {} at {}",
        imported.value.name,
        imported.value.path.display()
    );
    ctx.output.emit_outcome(&text, &imported)
}

fn declared_filename(
    archive: &Path,
    explicit: Option<&str>,
    from_stdin: bool,
) -> AppResult<String> {
    if let Some(name) = explicit.map(str::trim).filter(|name| !name.is_empty()) {
        return Ok(name.to_string());
    }
    if from_stdin {
        return Err(AppError::InvalidInput(
            "--filename is required when reading the archive from stdin".to_string(),
        ));
    }

    archive
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::InvalidInput(format!("{} is not a file", archive.display())))
}

fn buffer_stdin() -> AppResult<NamedTempFile> {
    let mut upload = NamedTempFile::new()?;
    io::copy(&mut io::stdin().lock(), upload.as_file_mut())?;
    upload.as_file_mut().flush()?;
    ensure_not_empty(upload.as_file())?;
    Ok(upload)
}

fn ensure_not_empty(file: &File) -> AppResult<()> {
    if file.metadata()?.len() == 0 {
        return Err(AppError::InvalidInput("no archive data on stdin".to_string()));
    }
    Ok(())
}
