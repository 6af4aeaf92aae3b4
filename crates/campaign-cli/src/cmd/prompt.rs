use crate::cmd::load_config;
use campaign_core::resolve::{ActiveCampaign, Phase, Resolver, Window};
use campaign_core::store::CampaignFile;
use chrono::NaiveDate;
use std::path::Path;

/// ` [C<number>•W<week>•<days>d]` or ` [R→<Mon DD>]`.
pub fn segment(active: &ActiveCampaign) -> String {
    match active.phase {
        Phase::Campaign { week, days_left } => {
            format!(" [C{}•W{week}•{days_left}d]", active.campaign.number)
        }
        Phase::Recovery { recovery_end, .. } => {
            format!(" [R→{}]", recovery_end.format("%b %d"))
        }
    }
}

/// Print the prompt segment without a trailing newline. Prints nothing when
/// no campaign is active. Overlaps are not reported here; the first active
/// campaign in file order is shown.
pub fn run(root: &Path, today: NaiveDate) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let outcomes = CampaignFile::in_vault(root).assess(&config)?;
    let resolver = Resolver::new(today, Window::WithRecovery, &config);
    if let Some(active) = resolver.first_active(&outcomes) {
        print!("{}", segment(&active));
    }
    Ok(())
}
