use crate::cmd::{active, load_config, NO_ACTIVE};
use crate::output::print_json;
use chrono::NaiveDate;
use std::path::Path;

pub fn run(root: &Path, today: NaiveDate, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let active = active(root, &config, today)?;

    if json {
        return match &active {
            Some(a) => print_json(a),
            None => print_json(&serde_json::Value::Null),
        };
    }

    let Some(active) = active else {
        println!("{NO_ACTIVE}");
        return Ok(());
    };
    let campaign = &active.campaign;
    println!("Name: {}", campaign.display_name());
    println!("Start date: {}", campaign.start.format("%d %B %Y"));
    if let Some(description) = &campaign.description {
        println!("Description: {description}");
    }
    Ok(())
}
