use crate::cmd::load_config;
use crate::output::{print_json, print_table};
use anyhow::Context;
use campaign_core::campaign::{Campaign, RecordOutcome};
use campaign_core::resolve::{classify, is_eligible, Phase, Window};
use campaign_core::store::CampaignFile;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Entry<'a> {
    record: &'a RecordOutcome,
    state: String,
}

/// Where a usable campaign stands on `today`.
fn campaign_state(campaign: &Campaign, today: NaiveDate, max_week: u32) -> String {
    if !is_eligible(campaign) {
        return format!(
            "inactive (status: {})",
            campaign.status.as_deref().unwrap_or_default()
        );
    }
    match classify(campaign, today, Window::WithRecovery, max_week) {
        Some(Phase::Campaign { week, days_left }) => {
            format!("active, week {week}, {days_left}d left")
        }
        Some(Phase::Recovery { recovery_end, .. }) => format!("recovery until {recovery_end}"),
        None if today < campaign.start => "upcoming".to_string(),
        None => "finished".to_string(),
    }
}

pub fn run(root: &Path, today: NaiveDate, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let file = CampaignFile::in_vault(root);
    let outcomes = file
        .assess(&config)
        .with_context(|| format!("failed to read {}", file.path().display()))?;

    let entries: Vec<Entry<'_>> = outcomes
        .iter()
        .map(|record| Entry {
            record,
            state: match record {
                RecordOutcome::Ready(c) => campaign_state(c, today, config.max_week),
                RecordOutcome::Skipped { line, reason, .. } => {
                    format!("skipped (line {line}): {reason}")
                }
            },
        })
        .collect();

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No campaigns in {}.", file.path().display());
        return Ok(());
    }

    let rows = entries
        .iter()
        .map(|e| match e.record {
            RecordOutcome::Ready(c) => vec![
                c.number.clone(),
                c.display_name(),
                c.start.to_string(),
                c.end.to_string(),
                c.milestones.progress().to_string(),
                e.state.clone(),
            ],
            RecordOutcome::Skipped { number, .. } => vec![
                number.clone(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                e.state.clone(),
            ],
        })
        .collect();
    print_table(&["#", "NAME", "START", "END", "DONE", "STATE"], rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::campaign::assess;
    use campaign_core::config::Config;

    fn state(content: &str, today: &str) -> String {
        let outcomes = assess(content, &Config::default());
        let campaign = outcomes[0].campaign().unwrap();
        campaign_state(campaign, today.parse().unwrap(), 6)
    }

    #[test]
    fn states_across_the_cycle() {
        let c = "number: 1\nstart: 2025-01-01\nend: 2025-02-11\n";
        assert_eq!(state(c, "2024-12-01"), "upcoming");
        assert_eq!(state(c, "2025-01-15"), "active, week 3, 27d left");
        assert_eq!(state(c, "2025-02-20"), "recovery until 2025-02-25");
        assert_eq!(state(c, "2025-03-01"), "finished");
    }

    #[test]
    fn ineligible_status_is_shown() {
        let c = "number: 1\nstart: 2025-01-01\nend: 2025-02-11\nstatus: done\n";
        assert_eq!(state(c, "2025-01-15"), "inactive (status: done)");
    }
}
