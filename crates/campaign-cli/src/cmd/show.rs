use crate::cmd::load_config;
use crate::launch;
use anyhow::Context;
use campaign_core::paths;
use std::path::Path;

/// The vault's reference documents.
#[derive(Debug, Clone, Copy)]
pub enum Document {
    Wiki,
    History,
    Yourself,
}

impl Document {
    fn path(self, root: &Path) -> std::path::PathBuf {
        match self {
            Document::Wiki => paths::wiki_path(root),
            Document::History => paths::history_path(root),
            Document::Yourself => paths::yourself_path(root),
        }
    }
}

/// Open a document: the wiki in the configured viewer (or the desktop
/// default), the others in the pager.
pub fn run(root: &Path, document: Document) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let path = document.path(root);
    if !path.exists() {
        anyhow::bail!(
            "{} not found; run `campaign init` to create it",
            path.display()
        );
    }

    let result = match document {
        Document::Wiki => match &config.programs.viewer {
            Some(viewer) => launch::spawn(viewer, &path),
            None => launch::open_default(&path),
        },
        Document::History | Document::Yourself => launch::run(&config.programs.pager(), &path),
    };
    result.with_context(|| format!("failed to open {}", path.display()))?;
    Ok(())
}
