use crate::cli::ImageCommand;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::profiles::ImageStatus;

pub async fn run(ctx: &AppContext, command: ImageCommand) -> AppResult<()> {
    match command {
        ImageCommand::Ensure => {
            let report = ctx.orchestrator.ensure_image().await?;
            let text = match report.status {
                ImageStatus::Present => format!("image {} is present", report.image),
                ImageStatus::Built => format!("built image {}", report.image),
            };
            ctx.output.emit(&text, &report)
        }
    }
}
