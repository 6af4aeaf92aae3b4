use crate::output::print_json;
use anyhow::Context;
use campaign_core::config::Config;
use campaign_core::vault;
use chrono::NaiveDate;
use std::path::Path;

pub fn run(root: &Path, today: NaiveDate, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let created = vault::init(root, &config, today)
        .with_context(|| format!("failed to initialize vault at {}", root.display()))?;

    if json {
        print_json(&serde_json::json!({
            "root": root,
            "created": created,
        }))?;
        return Ok(());
    }

    if created.is_empty() {
        println!("Vault already initialized: {}", root.display());
    } else {
        println!("Initialized vault in: {}", root.display());
        for path in &created {
            let shown = path.strip_prefix(root).unwrap_or(path);
            println!("  created {}", shown.display());
        }
    }
    Ok(())
}
