use crate::cmd::current::focus_line;
use crate::cmd::{load_config, resolve, NO_ACTIVE};
use crate::output::print_json;
use campaign_core::milestone::MilestoneTree;
use campaign_core::resolve::{ActiveCampaign, Phase, Resolution};
use chrono::NaiveDate;
use std::path::Path;

pub fn run(root: &Path, today: NaiveDate, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let resolution = resolve(root, &config, today)?;

    if json {
        print_json(&resolution)?;
    }

    match &resolution {
        Resolution::None => {
            if !json {
                println!("{NO_ACTIVE}");
            }
            Ok(())
        }
        Resolution::Active(active) => {
            if !json {
                print_active(active, config.max_week);
            }
            Ok(())
        }
        Resolution::Conflict(active) => {
            if !json {
                println!("Multiple campaigns are active on {today}:");
                for a in active {
                    println!(
                        "  #{} {} ({} → {}, recovery until {})",
                        a.campaign.number,
                        a.campaign.display_name(),
                        a.campaign.start,
                        a.campaign.end,
                        a.campaign.recovery_end,
                    );
                }
            }
            let numbers: Vec<&str> = active.iter().map(|a| a.campaign.number.as_str()).collect();
            anyhow::bail!(
                "campaigns {} overlap; fix their dates in campaigns.md",
                numbers.join(", ")
            )
        }
    }
}

fn print_active(active: &ActiveCampaign, max_week: u32) {
    let campaign = &active.campaign;
    println!("Campaign {}: {}", campaign.number, campaign.display_name());
    match active.phase {
        Phase::Campaign { week, days_left } => {
            println!("Phase:    campaign, week {week}/{max_week}, {days_left} days left");
        }
        Phase::Recovery {
            recovery_end,
            days_left,
        } => {
            println!("Phase:    recovery until {recovery_end}, {days_left} days left");
        }
    }

    let milestones = &campaign.milestones;
    println!(
        "Focus:    {}",
        focus_line(&milestones.find_current(), milestones.progress())
    );

    if !milestones.is_empty() {
        println!();
        print_milestones(milestones);
    }
}

fn print_milestones(milestones: &MilestoneTree) {
    for (index, main) in milestones.main_tasks() {
        let marker = main.state.map(|s| s.marker()).unwrap_or("[?]");
        println!("  {marker} {}", main.text);
        for sub in milestones.subtasks_of(index) {
            let marker = sub.state.map(|s| s.marker()).unwrap_or("[?]");
            println!("      {marker} {}", sub.text);
        }
    }
}
