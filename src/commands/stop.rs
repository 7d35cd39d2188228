use crate::cli::NameArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::profiles::StopStatus;

pub async fn run(ctx: &AppContext, args: NameArgs) -> AppResult<()> {
    let stopped = ctx.orchestrator.stop(&args.name).await?;

    let text = match stopped.status {
        StopStatus::Stopped => format!("stopped {}", args.name),
        StopStatus::NotFound => format!("no container for {}", args.name),
    };
    ctx.output.emit(&text, &stopped)
}
