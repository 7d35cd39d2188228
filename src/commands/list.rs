use crate::context::AppContext;
use crate::error::AppResult;
use crate::output::OutputMode;
use crate::output::text::human_size;
use crate::profiles::ProfileSummary;

pub async fn run(ctx: &AppContext) -> AppResult<()> {
    let listing = ctx.orchestrator.list().await?;

    if ctx.output.mode() == OutputMode::Text {
        if listing.profiles.is_empty() {
            println!("0 profiles");
            return Ok(());
        }

        for profile in &listing.profiles {
            println!("{}", format_row(profile));
        }
        return Ok(());
    }

    let text = format!("{} profiles", listing.profiles.len());
    ctx.output.emit(&text, &listing)
}

fn format_row(profile: &ProfileSummary) -> String {
    let launcher = if profile.has_desktop_entry {
        ""
    } else {
        " (no launcher)"
    };
    format!(
        "{:<24} {:<10} {:>10}{launcher}",
        profile.name,
        profile.status,
        human_size(profile.size_bytes)
    )
}
