use std::path::PathBuf;

use crate::cli::CreateArgs;
use crate::config::paths::{absolutize, expand_home};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

pub async fn run(ctx: &AppContext, args: CreateArgs) -> AppResult<()> {
    if args.name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "profile name is required".to_string(),
        ));
    }

    let location = resolve_location(args.location.as_deref())?;
    let created = ctx
        .orchestrator
        .create(&args.name, location.as_deref())
        .await?;

    let text = format!(
        "created profile {} at {}",
        created.value.name,
        created.value.path.display()
    );
    ctx.output.emit_outcome(&text, &created)
}

fn resolve_location(raw: Option<&str>) -> AppResult<Option<PathBuf>> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    Ok(Some(absolutize(&expand_home(raw))?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_location_means_default() {
        assert_eq!(resolve_location(None).expect("none"), None);
        assert_eq!(resolve_location(Some("  ")).expect("blank"), None);
    }

    #[test]
    fn relative_location_becomes_absolute() {
        let resolved = resolve_location(Some("profiles/work"))
            .expect("resolve")
            .expect("some");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("profiles/work"));
    }
}
