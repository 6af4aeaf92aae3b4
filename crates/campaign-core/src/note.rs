use crate::error::Result;
use crate::io;
use crate::paths;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Heading used when no milestone is pending.
pub const GENERAL_NOTE: &str = "General";

/// Body of a new milestone note.
pub fn render(campaign: &str, milestone: &str, now: NaiveDateTime) -> String {
    format!(
        "# {campaign} - {milestone}\nDate: {}\nTime: {}\n\n## Notes\n\n",
        now.format("%Y-%m-%d"),
        now.format("%H:%M:%S"),
    )
}

/// Create `notes/<date>-milestone-<position>.md` for the milestone at
/// 1-based `position`. An existing note for the same day is kept as is.
/// Returns the note path and whether it was created.
pub fn create(
    root: &Path,
    campaign: &str,
    milestone: Option<&str>,
    position: usize,
    now: NaiveDateTime,
) -> Result<(PathBuf, bool)> {
    let path = paths::note_path(root, now.date(), position);
    let body = render(campaign, milestone.unwrap_or(GENERAL_NOTE), now);
    let created = io::write_if_missing(&path, body.as_bytes())?;
    if created {
        tracing::info!(note = %path.display(), "note created");
    }
    Ok((path, created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn creates_dated_note() {
        let dir = TempDir::new().unwrap();
        let (path, created) = create(dir.path(), "Deep Work", Some("Draft"), 2, at(9, 30)).unwrap();
        assert!(created);
        assert!(path.ends_with("notes/2025-01-15-milestone-2.md"));
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("# Deep Work - Draft\nDate: 2025-01-15\nTime: 09:30:00\n"));
    }

    #[test]
    fn existing_note_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let (path, _) = create(dir.path(), "C", None, 1, at(9, 0)).unwrap();
        fs::write(&path, "my thoughts").unwrap();

        let (again, created) = create(dir.path(), "C", None, 1, at(18, 0)).unwrap();
        assert_eq!(again, path);
        assert!(!created);
        assert_eq!(fs::read_to_string(&path).unwrap(), "my thoughts");
    }

    #[test]
    fn general_heading_without_milestone() {
        assert!(render("C", GENERAL_NOTE, at(8, 0)).starts_with("# C - General\n"));
    }
}
