use std::path::PathBuf;

use crate::archive::ArchiveFormat;
use crate::cli::ExportArgs;
use crate::context::AppContext;
use crate::error::AppResult;

pub async fn run(ctx: &AppContext, args: ExportArgs) -> AppResult<()> {
    let format = ArchiveFormat::from(args.format);
    let dest = args
        .output
        .unwrap_or_else(|| default_destination(&args.name, format));

    let report = ctx.orchestrator.export(&args.name, format, &dest).await?;

    let mut text = format!(
        "exported {} to {} ({} entries)",
        report.name,
        report.path.display(),
        report.entries
    );
    if report.skipped > 0 {
        text.push_str(&format!(", skipped {}", report.skipped));
    }
    ctx.output.emit(&text, &report)
}

fn default_destination(name: &str, format: ArchiveFormat) -> PathBuf {
    PathBuf::from(format!("{name}.{}", format.extension()))
}
