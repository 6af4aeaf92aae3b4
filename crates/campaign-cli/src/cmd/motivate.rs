use crate::output::print_json;
use anyhow::Context;
use campaign_core::paths;
use rand::seq::SliceRandom;
use std::path::Path;

/// Quote lines: non-blank and not a `#` comment.
fn quotes(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let path = paths::quotes_path(root);
    let content = std::fs::read_to_string(&path).with_context(|| {
        format!(
            "failed to read {}; add one quote per line to it",
            path.display()
        )
    })?;

    let lines = quotes(&content);
    let Some(quote) = lines.choose(&mut rand::thread_rng()) else {
        anyhow::bail!("{} has no quotes", path.display());
    };

    if json {
        print_json(&serde_json::json!({ "quote": quote }))?;
    } else {
        println!("{quote}");
    }
    Ok(())
}
