use crate::campaign::{assess, RecordOutcome};
use crate::config::Config;
use crate::error::Result;
use crate::io::{self, FileLock};
use crate::paths;
use std::path::{Path, PathBuf};

/// The campaigns file of a vault.
///
/// Reads are fresh on every call. Writes go through [`CampaignFile::update`],
/// which holds `<file>.lock` for the whole read-modify-write and replaces the
/// file atomically.
#[derive(Debug, Clone)]
pub struct CampaignFile {
    path: PathBuf,
}

impl CampaignFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The campaigns file inside the vault at `root`.
    pub fn in_vault(root: &Path) -> Self {
        Self::new(paths::campaigns_path(root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// The file content; a missing file reads as empty.
    pub fn read(&self) -> Result<String> {
        io::read_or_empty(&self.path)
    }

    pub fn assess(&self, config: &Config) -> Result<Vec<RecordOutcome>> {
        Ok(assess(&self.read()?, config))
    }

    /// Apply `edit` to the current content under the lock and write the
    /// result back. Returns whatever `edit` returned alongside the new text.
    /// Nothing is written when the content is unchanged.
    pub fn update<T, F>(&self, edit: F) -> Result<T>
    where
        F: FnOnce(&str) -> Result<(String, T)>,
    {
        let _lock = FileLock::acquire(&paths::lock_path(&self.path))?;
        let before = self.read()?;
        let (after, value) = edit(&before)?;
        if after != before {
            io::atomic_write(&self.path, after.as_bytes())?;
            tracing::info!(
                file = %self.path.display(),
                bytes = after.len(),
                "campaigns file updated"
            );
        }
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CampaignError;
    use crate::milestone::CheckState;
    use crate::mutate;
    use std::fs;
    use tempfile::TempDir;

    const FILE: &str = "number: 1\nstart: 2025-01-01\nend: 2025-02-11\nmilestones:\n - [ ] A\n";

    #[test]
    fn missing_file_has_no_records() {
        let dir = TempDir::new().unwrap();
        let file = CampaignFile::in_vault(dir.path());
        assert!(!file.exists());
        assert_eq!(file.read().unwrap(), "");
        assert!(file.assess(&Config::default()).unwrap().is_empty());
    }

    #[test]
    fn update_rewrites_and_releases_lock() {
        let dir = TempDir::new().unwrap();
        let file = CampaignFile::in_vault(dir.path());
        fs::write(file.path(), FILE).unwrap();

        let config = Config::default();
        let text = file
            .update(|content| {
                let applied = mutate::toggle(content, &config, "1", 0, CheckState::Done)?;
                Ok((applied.content, applied.text))
            })
            .unwrap();

        assert_eq!(text, "A");
        assert!(fs::read_to_string(file.path()).unwrap().contains(" - [x] A"));
        assert!(!paths::lock_path(file.path()).exists());
    }

    #[test]
    fn failed_edit_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let file = CampaignFile::in_vault(dir.path());
        fs::write(file.path(), FILE).unwrap();

        let config = Config::default();
        let result = file.update(|content| {
            let applied = mutate::toggle(content, &config, "1", 3, CheckState::Done)?;
            Ok((applied.content, ()))
        });

        assert!(matches!(
            result,
            Err(CampaignError::MilestoneNotFound { .. })
        ));
        assert_eq!(fs::read_to_string(file.path()).unwrap(), FILE);
        assert!(!paths::lock_path(file.path()).exists());
    }

    #[test]
    fn unchanged_content_is_not_written() {
        let dir = TempDir::new().unwrap();
        let file = CampaignFile::in_vault(dir.path());
        file.update(|content| Ok((content.to_string(), ()))).unwrap();
        assert!(!file.exists());
    }
}
