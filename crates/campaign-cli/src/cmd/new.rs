use crate::cmd::{load_config, resolve};
use crate::output::print_json;
use anyhow::Context;
use campaign_core::campaign::add_days;
use campaign_core::resolve::Resolution;
use campaign_core::store::CampaignFile;
use campaign_core::vault;
use chrono::NaiveDate;
use std::path::Path;

pub fn run(root: &Path, name: &str, today: NaiveDate, json: bool) -> anyhow::Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("campaign name cannot be empty");
    }

    let config = load_config(root)?;
    let start = today;
    let end = add_days(today, config.campaign_days)?;

    let file = CampaignFile::in_vault(root);
    let number = file
        .update(|content| {
            let number = vault::next_number(content, &config);
            let record = vault::campaign_record(&config.keys, number, name, start, end);
            Ok((vault::append_record(content, &record), number))
        })
        .with_context(|| format!("failed to update {}", file.path().display()))?;

    let created = number.to_string();
    let overlapping: Vec<String> = match resolve(root, &config, today)? {
        Resolution::Conflict(active) => active
            .into_iter()
            .map(|a| a.campaign.number)
            .filter(|n| *n != created)
            .collect(),
        _ => Vec::new(),
    };

    if json {
        print_json(&serde_json::json!({
            "number": number,
            "name": name,
            "start": start,
            "end": end,
            "overlaps": overlapping,
        }))?;
    } else {
        println!("Created campaign {number}: {name} ({start} → {end})");
        if !overlapping.is_empty() {
            println!(
                "warning: overlaps with active campaign {}; close it by editing its dates",
                overlapping.join(", ")
            );
        }
    }
    Ok(())
}
