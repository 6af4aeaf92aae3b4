use crate::cmd::{load_config, require_active};
use crate::launch;
use crate::output::print_json;
use anyhow::Context;
use campaign_core::milestone::Focus;
use campaign_core::note;
use chrono::{Local, NaiveDate};
use std::path::Path;

/// Create today's note for the current milestone and open it.
pub fn run(root: &Path, today: NaiveDate, no_open: bool, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let active = require_active(root, &config, today)?;
    let campaign = &active.campaign;

    let (milestone, position) = match campaign.milestones.find_current() {
        Focus::Item(item) => (Some(item.parent), item.position),
        Focus::AllComplete => (None, 0),
    };

    let now = today.and_time(Local::now().time());
    let (path, created) = note::create(
        root,
        &campaign.display_name(),
        milestone.as_deref(),
        position,
        now,
    )
    .context("failed to create note")?;

    if json {
        print_json(&serde_json::json!({
            "path": path,
            "created": created,
        }))?;
    } else if created {
        println!("Created {}", path.display());
    } else {
        println!("Opening existing note {}", path.display());
    }

    if !no_open {
        let editor = config.programs.editor();
        launch::run(&editor, &path).with_context(|| format!("failed to open {}", path.display()))?;
    }
    Ok(())
}
