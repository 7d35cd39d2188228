use std::path::PathBuf;

use clap::Parser;
use chromebox::cli::{Cli, Command, ExportFormat, ImageCommand};

#[test]
fn parses_create_with_location() {
    let cli = Cli::try_parse_from([
        "chromebox",
        "create",
        "work",
        "--location",
        "~/Profiles/work",
    ])
    .expect("cli parse should work");
    match cli.command {
        Command::Create(create) => {
            assert_eq!(create.name, "work");
            assert_eq!(create.location.as_deref(), Some("~/Profiles/work"));
        }
        _ => panic!("expected create command"),
    }
}

#[test]
fn parses_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "chromebox",
        "start",
        "work",
        "--json",
        "-vv",
        "--profiles-dir",
        "/srv/chrome",
    ])
    .expect("cli parse should work");
    assert!(cli.json);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.profiles_dir, Some(PathBuf::from("/srv/chrome")));
    assert!(matches!(cli.command, Command::Start(ref args) if args.name == "work"));
}

#[test]
fn export_defaults_to_zip() {
    let cli = Cli::try_parse_from(["chromebox", "export", "work"]).expect("cli parse should work");
    match cli.command {
        Command::Export(export) => {
            assert_eq!(export.format, ExportFormat::Zip);
            assert_eq!(export.output, None);
        }
        _ => panic!("expected export command"),
    }
}

#[test]
fn parses_tar_gz_export() {
    let cli = Cli::try_parse_from([
        "chromebox",
        "export",
        "work",
        "--format",
        "tar-gz",
        "-o",
        "backup.tgz",
    ])
    .expect("cli parse should work");
    match cli.command {
        Command::Export(export) => {
            assert_eq!(export.format, ExportFormat::TarGz);
            assert_eq!(export.output, Some(PathBuf::from("backup.tgz")));
        }
        _ => panic!("expected export command"),
    }
}

#[test]
fn parses_stdin_import() {
    let cli = Cli::try_parse_from(["chromebox", "import", "-", "--filename", "work.zip"])
        .expect("cli parse should work");
    match cli.command {
        Command::Import(import) => {
            assert_eq!(import.archive, PathBuf::from("-"));
            assert_eq!(import.filename.as_deref(), Some("work.zip"));
        }
        _ => panic!("expected import command"),
    }
}

#[test]
fn parses_image_ensure() {
    let cli = Cli::try_parse_from(["chromebox", "image", "ensure"]).expect("cli parse should work");
    match cli.command {
        Command::Image(image) => assert!(matches!(image.command, ImageCommand::Ensure)),
        _ => panic!("expected image command"),
    }
}

#[test]
fn rejects_unknown_export_format() {
    let result = Cli::try_parse_from(["chromebox", "export", "work", "--format", "rar"]);
    assert!(result.is_err());
}

#[test]
fn requires_a_profile_name() {
    assert!(Cli::try_parse_from(["chromebox", "delete"]).is_err());
}
