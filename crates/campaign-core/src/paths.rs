use crate::error::{CampaignError, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Vault layout
// ---------------------------------------------------------------------------

/// Default vault location, relative to the home directory.
pub const DEFAULT_VAULT_DIR: &str = "Documents/campaigno";

pub const CAMPAIGNS_FILE: &str = "campaigns.md";
pub const CONFIG_FILE: &str = "config.yaml";
pub const WIKI_FILE: &str = "wiki.md";
pub const HISTORY_FILE: &str = "history.md";
pub const QUOTES_FILE: &str = "quotes.md";
pub const YOURSELF_FILE: &str = "yourself.md";
pub const NOTES_DIR: &str = "notes";

/// Suffix of the advisory lock taken while the campaigns file is rewritten.
pub const LOCK_SUFFIX: &str = "lock";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn default_root() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(CampaignError::HomeNotFound)?;
    Ok(home.join(DEFAULT_VAULT_DIR))
}

pub fn campaigns_path(root: &Path) -> PathBuf {
    root.join(CAMPAIGNS_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn wiki_path(root: &Path) -> PathBuf {
    root.join(WIKI_FILE)
}

pub fn history_path(root: &Path) -> PathBuf {
    root.join(HISTORY_FILE)
}

pub fn quotes_path(root: &Path) -> PathBuf {
    root.join(QUOTES_FILE)
}

pub fn yourself_path(root: &Path) -> PathBuf {
    root.join(YOURSELF_FILE)
}

pub fn notes_dir(root: &Path) -> PathBuf {
    root.join(NOTES_DIR)
}

/// `notes/<date>-milestone-<position>.md`
pub fn note_path(root: &Path, date: NaiveDate, position: usize) -> PathBuf {
    notes_dir(root).join(format!("{}-milestone-{position}.md", date.format("%Y-%m-%d")))
}

/// `<file>.lock`, next to the file it guards.
pub fn lock_path(file: &Path) -> PathBuf {
    let mut name = file.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(LOCK_SUFFIX);
    file.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/vault");
        assert_eq!(
            campaigns_path(root),
            PathBuf::from("/tmp/vault/campaigns.md")
        );
        assert_eq!(config_path(root), PathBuf::from("/tmp/vault/config.yaml"));
        assert_eq!(
            lock_path(&campaigns_path(root)),
            PathBuf::from("/tmp/vault/campaigns.md.lock")
        );
    }

    #[test]
    fn note_path_is_dated() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(
            note_path(Path::new("/v"), date, 2),
            PathBuf::from("/v/notes/2025-01-15-milestone-2.md")
        );
    }
}
