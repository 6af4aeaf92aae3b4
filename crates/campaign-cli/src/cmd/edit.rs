use crate::cmd::load_config;
use crate::launch;
use anyhow::Context;
use campaign_core::{io, paths, vault};
use chrono::NaiveDate;
use std::path::Path;

pub fn run(root: &Path, today: NaiveDate) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let path = paths::campaigns_path(root);

    let initial = vault::initial_campaigns(&config, today)?;
    if io::write_if_missing(&path, initial.as_bytes())
        .with_context(|| format!("failed to create {}", path.display()))?
    {
        println!("Created {}", path.display());
    }

    let editor = config.programs.editor();
    launch::run(&editor, &path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(())
}
