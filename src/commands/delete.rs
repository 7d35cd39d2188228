use crate::cli::NameArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::profiles::DeleteStatus;

pub async fn run(ctx: &AppContext, args: NameArgs) -> AppResult<()> {
    let deleted = ctx.orchestrator.delete(&args.name).await?;

    let text = match deleted.value.status {
        DeleteStatus::Deleted => format!("deleted profile {}", deleted.value.name),
        DeleteStatus::NotFound => format!("profile {} not found", deleted.value.name),
    };
    ctx.output.emit_outcome(&text, &deleted)
}
