pub mod config;
pub mod current;
pub mod edit;
pub mod info;
pub mod init;
pub mod list;
pub mod mark;
pub mod motivate;
pub mod new;
pub mod note;
pub mod prompt;
pub mod show;
pub mod status;

use anyhow::Context;
use campaign_core::config::Config;
use campaign_core::resolve::{ActiveCampaign, Resolution, Resolver, Window};
use campaign_core::store::CampaignFile;
use chrono::NaiveDate;
use std::path::Path;

pub const NO_ACTIVE: &str = "No active campaign. Start one with `campaign new <name>`.";

/// Load `config.yaml`, refusing to run on error-level findings.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    let config = Config::load(root).context("failed to load config")?;
    config
        .ensure_valid()
        .context("run `campaign config validate` for details")?;
    Ok(config)
}

/// Resolve today's campaign, recovery periods included.
pub fn resolve(root: &Path, config: &Config, today: NaiveDate) -> anyhow::Result<Resolution> {
    let file = CampaignFile::in_vault(root);
    let outcomes = file
        .assess(config)
        .with_context(|| format!("failed to read {}", file.path().display()))?;
    Ok(Resolver::new(today, Window::WithRecovery, config).resolve(&outcomes))
}

/// The single active campaign. Overlapping campaigns are an error.
pub fn active(
    root: &Path,
    config: &Config,
    today: NaiveDate,
) -> anyhow::Result<Option<ActiveCampaign>> {
    let active = resolve(root, config, today)?
        .into_active()
        .context("fix the overlapping dates in campaigns.md")?;
    Ok(active)
}

/// Like [`active`], but having no active campaign is an error too.
pub fn require_active(
    root: &Path,
    config: &Config,
    today: NaiveDate,
) -> anyhow::Result<ActiveCampaign> {
    active(root, config, today)?.ok_or_else(|| anyhow::anyhow!("{NO_ACTIVE}"))
}
