use crate::cli::NameArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::profiles::StartStatus;

pub async fn run(ctx: &AppContext, args: NameArgs) -> AppResult<()> {
    let started = ctx.orchestrator.start(&args.name).await?;

    let text = match (started.value.status, started.value.container_id.as_deref()) {
        (StartStatus::AlreadyRunning, _) => format!("{} is already running", args.name),
        (StartStatus::Started, _) => format!("started {}", args.name),
        (StartStatus::Created, Some(id)) => format!("created {} ({})", args.name, short_id(id)),
        (StartStatus::Created, None) => format!("created {}", args.name),
    };
    ctx.output.emit_outcome(&text, &started)
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
