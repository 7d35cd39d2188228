use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::archive::ArchiveFormat;

#[derive(Debug, Parser)]
#[command(
    name = "chromebox",
    version,
    about = "Isolated browser profiles, one container each"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Emit JSON output")]
    pub json: bool,
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Verbose logging")]
    pub verbose: u8,
    #[arg(long, global = true, help = "Override the profiles root directory")]
    pub profiles_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List profiles with container state and disk usage
    List,
    /// Create a new profile directory and launcher entry
    Create(CreateArgs),
    /// Remove a profile's container, launcher entry and directory
    Delete(NameArgs),
    /// Start (or create) the profile's container
    Start(NameArgs),
    /// Stop the profile's container
    Stop(NameArgs),
    /// Show container state and disk usage for one profile
    Status(NameArgs),
    /// Write a profile to a zip or tar.gz archive
    Export(ExportArgs),
    /// Restore a profile from an archive
    Import(ImportArgs),
    /// Manage the browser container image
    Image(ImageArgs),
    /// Show the resolved configuration paths
    Paths,
}

#[derive(Debug, Args)]
pub struct NameArgs {
    #[arg(help = "Profile name")]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(help = "Profile name")]
    pub name: String,
    #[arg(long, help = "Store the profile at this path instead of the profiles root")]
    pub location: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(help = "Profile name")]
    pub name: String,
    #[arg(short, long, help = "Archive path (defaults to ./<name>.<ext>)")]
    pub output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ExportFormat::Zip, help = "Archive format")]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Zip,
    TarGz,
}

impl From<ExportFormat> for ArchiveFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Zip => ArchiveFormat::Zip,
            ExportFormat::TarGz => ArchiveFormat::TarGz,
        }
    }
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(help = "Archive to import, or - to read from stdin")]
    pub archive: PathBuf,
    #[arg(long, help = "Filename used to name flat archives")]
    pub filename: Option<String>,
}

#[derive(Debug, Args)]
pub struct ImageArgs {
    #[command(subcommand)]
    pub command: ImageCommand,
}

#[derive(Debug, Subcommand)]
pub enum ImageCommand {
    /// Build the image unless the engine already has it
    Ensure,
}
