use crate::cli::NameArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::output::text::human_size;

pub async fn run(ctx: &AppContext, args: NameArgs) -> AppResult<()> {
    let status = ctx.orchestrator.status(&args.name).await?;

    let text = format!(
        "{}: {} ({})",
        status.name,
        status.status,
        human_size(status.size_bytes)
    );
    ctx.output.emit(&text, &status)
}
