use crate::cli::{Cli, Command};
use crate::commands;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::telemetry;

pub async fn run(cli: Cli) -> AppResult<()> {
    let Cli {
        json,
        verbose,
        profiles_dir,
        command,
    } = cli;

    telemetry::initialise(verbose);
    let ctx = AppContext::bootstrap(json, verbose, profiles_dir)?;

    match command {
        Command::List => commands::list::run(&ctx).await,
        Command::Create(args) => commands::create::run(&ctx, args).await,
        Command::Delete(args) => commands::delete::run(&ctx, args).await,
        Command::Start(args) => commands::start::run(&ctx, args).await,
        Command::Stop(args) => commands::stop::run(&ctx, args).await,
        Command::Status(args) => commands::status::run(&ctx, args).await,
        Command::Export(args) => commands::export::run(&ctx, args).await,
        Command::Import(args) => commands::import::run(&ctx, args).await,
        Command::Image(args) => commands::image::run(&ctx, args.command).await,
        Command::Paths => commands::paths::run(&ctx).await,
    }
}
