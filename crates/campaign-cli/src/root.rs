use campaign_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the vault directory.
///
/// Priority:
/// 1. `--root` flag / `CAMPAIGN_ROOT` env var (passed in as `explicit`)
/// 2. `~/Documents/campaigno`
/// 3. Fall back to `cwd` when no home directory is known
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    match paths::default_root() {
        Ok(root) => root,
        Err(e) => {
            tracing::warn!("{e}; using the current directory as the vault");
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn default_root_is_under_documents() {
        if std::env::var_os("HOME").is_some() {
            assert!(resolve_root(None).ends_with("Documents/campaigno"));
        }
    }
}
