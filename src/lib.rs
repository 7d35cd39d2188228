pub mod app;
pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod host;
pub mod launcher;
pub mod outcome;
pub mod output;
pub mod profiles;
pub mod telemetry;

use cli::Cli;
use error::AppResult;

pub async fn run(cli: Cli) -> AppResult<()> {
    app::run(cli).await
}
