use crate::cmd::{load_config, require_active};
use crate::launch;
use crate::output::print_json;
use anyhow::Context;
use campaign_core::milestone::CheckState;
use campaign_core::mutate;
use campaign_core::store::CampaignFile;
use chrono::NaiveDate;
use std::path::Path;

/// Mark the current focus, or with `task` the Nth pending main task (1-based).
pub fn run(
    root: &Path,
    today: NaiveDate,
    state: CheckState,
    task: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let active = require_active(root, &config, today)?;
    let number = active.campaign.number.clone();

    if task == Some(0) {
        anyhow::bail!("--task counts from 1");
    }

    let file = CampaignFile::in_vault(root);
    let applied = file
        .update(|content| {
            let applied = match task {
                Some(n) => mutate::toggle(content, &config, &number, n - 1, state)?,
                None => mutate::mark_current(content, &config, &number, state)?,
            };
            Ok((applied.content.clone(), applied))
        })
        .with_context(|| format!("failed to update {}", file.path().display()))?;

    if config.notify {
        let title = match state {
            CheckState::Done => "Milestone completed",
            CheckState::Skipped => "Milestone skipped",
            CheckState::Pending => "Milestone reopened",
        };
        launch::notify(&config.programs.notifier, title, &applied.text);
    }

    if json {
        print_json(&serde_json::json!({
            "campaign": number,
            "milestone": applied.text,
            "state": applied.state,
            "line": applied.line + 1,
        }))?;
    } else {
        let verb = match state {
            CheckState::Done => "Done",
            CheckState::Skipped => "Skipped",
            CheckState::Pending => "Reopened",
        };
        println!("{verb}: {}", applied.text);
    }
    Ok(())
}
