//! Vault scaffolding and new campaign records.

use crate::campaign::{add_days, assess};
use crate::config::Config;
use crate::error::Result;
use crate::io;
use crate::paths;
use crate::record::{FieldKeys, SEPARATOR, TEMPLATE_MARKER};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

const WIKI_CONTENT: &str = r#"# Campaign System Wiki

## The system

Split the year into eight campaigns. Each campaign is six weeks of focused
work followed by two weeks of full recovery.

### Why six weeks?
- Long enough for real, visible progress
- Short enough to keep the urgency

### Why two weeks of rest?
- One week is not enough to recover
- Three weeks loses the momentum

## Rules

1. **One clear, measurable goal**
2. **A real deadline with consequences**
3. **At most 4-6 hours of deep work a day**
4. **A clear point of accountability**
"#;

const HISTORY_CONTENT: &str = r#"# Campaign History

## Template for each campaign

### Campaign X: [Name] (Date - Date)
**Status:** Completed/Abandoned
**Milestones completed:** X/Y
**Rating:**

#### What went well
-

#### What didn't go well
-

#### Lessons learned
-

---

"#;

const QUOTES_CONTENT: &str = r#"# One quote per line. Lines starting with '#' are ignored.
The secret of getting ahead is getting started.
Small steps every day.
Discipline is choosing what you want most over what you want now.
You do not rise to the level of your goals. You fall to the level of your systems.
Rest is part of the work.
"#;

const YOURSELF_CONTENT: &str = r#"# Yourself

## Why this campaign matters

## Who you are becoming

## What you will not compromise on
"#;

// ---------------------------------------------------------------------------
// Record text
// ---------------------------------------------------------------------------

/// A new campaign record, without separators.
pub fn campaign_record(
    keys: &FieldKeys,
    number: u64,
    name: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    format!(
        "{number_key}: {number}
{name_key}: {name}
{description}:
{start_key}: {start}
{end_key}: {end}
{recovery_end}:
{milestones}:
   - [ ] Milestone 1
   - [ ] Milestone 2
       - [ ] Subtask 2.1
   - [ ] Milestone 3
{status}: active
{rate}:
{links}:
   -
",
        number_key = keys.number,
        name_key = keys.name,
        description = keys.description,
        start_key = keys.start,
        start = start.format("%Y-%m-%d"),
        end_key = keys.end,
        end = end.format("%Y-%m-%d"),
        recovery_end = keys.recovery_end,
        milestones = keys.milestones,
        status = keys.status,
        rate = keys.rate,
        links = keys.links,
    )
}

/// The example block kept at the end of a fresh campaigns file. It carries
/// the template marker and is never parsed as a record.
pub fn template_block(keys: &FieldKeys) -> String {
    format!(
        "{TEMPLATE_MARKER}
{number}:
{name}:
{description}:
{start}: YYYY-MM-DD
{end}: YYYY-MM-DD
{recovery_end}:
{milestones}:
   - [x] finished example
       - [x] finished subtask
       - [ ] pending subtask
   - [-] skipped example
   - [ ] pending example
{status}:
{rate}:
{links}:
   -
",
        number = keys.number,
        name = keys.name,
        description = keys.description,
        start = keys.start,
        end = keys.end,
        recovery_end = keys.recovery_end,
        milestones = keys.milestones,
        status = keys.status,
        rate = keys.rate,
        links = keys.links,
    )
}

/// Content of a fresh campaigns file: one campaign starting `today`, then the
/// template block.
pub fn initial_campaigns(config: &Config, today: NaiveDate) -> Result<String> {
    let end = add_days(today, config.campaign_days)?;
    Ok(format!(
        "{SEPARATOR}\n{}{SEPARATOR}\n\n{SEPARATOR}\n{}{SEPARATOR}\n",
        campaign_record(&config.keys, 1, "My first campaign", today, end),
        template_block(&config.keys),
    ))
}

/// One more than the highest numeric campaign number; 1 for an empty file.
pub fn next_number(content: &str, config: &Config) -> u64 {
    assess(content, config)
        .iter()
        .filter_map(|o| o.number().trim().parse::<u64>().ok())
        .max()
        .map_or(1, |n| n + 1)
}

/// Append `record` to `content` as a new block.
pub fn append_record(content: &str, record: &str) -> String {
    let mut out = String::with_capacity(content.len() + record.len() + 8);
    out.push_str(content);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    let last = out.lines().rev().find(|l| !l.trim().is_empty());
    if last != Some(SEPARATOR) {
        out.push_str(SEPARATOR);
        out.push('\n');
    }
    out.push_str(record);
    if !record.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(SEPARATOR);
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// Create the vault at `root`. Existing files are never overwritten.
/// Returns the paths that were created.
pub fn init(root: &Path, config: &Config, today: NaiveDate) -> Result<Vec<PathBuf>> {
    let campaigns = initial_campaigns(config, today)?;
    io::ensure_dir(root)?;
    let mut created = Vec::new();

    let notes = paths::notes_dir(root);
    if !notes.exists() {
        io::ensure_dir(&notes)?;
        created.push(notes);
    }

    let config_yaml = serde_yaml::to_string(config)?;
    let files = [
        (paths::campaigns_path(root), campaigns.as_str()),
        (paths::config_path(root), config_yaml.as_str()),
        (paths::wiki_path(root), WIKI_CONTENT),
        (paths::history_path(root), HISTORY_CONTENT),
        (paths::quotes_path(root), QUOTES_CONTENT),
        (paths::yourself_path(root), YOURSELF_CONTENT),
    ];
    for (path, content) in files {
        if io::write_if_missing(&path, content.as_bytes())? {
            tracing::info!(file = %path.display(), "created");
            created.push(path);
        }
    }
    Ok(created)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::parse_date;
    use crate::error::CampaignError;
    use crate::milestone::{Focus, Progress};
    use crate::resolve::{Resolution, Resolver, Window};
    use std::fs;
    use tempfile::TempDir;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn fresh_file_has_one_active_campaign() {
        let config = Config::default();
        let content = initial_campaigns(&config, d("2025-01-01")).unwrap();
        let outcomes = assess(&content, &config);
        assert_eq!(outcomes.len(), 1);

        let campaign = outcomes[0].campaign().unwrap();
        assert_eq!(campaign.number, "1");
        assert_eq!(campaign.end, d("2025-02-12"));
        assert_eq!(campaign.description, None);
        assert!(!campaign.recovery_declared);
        assert_eq!(
            campaign.milestones.progress(),
            Progress {
                completed: 0,
                total: 3
            }
        );
        match campaign.milestones.find_current() {
            Focus::Item(item) => assert_eq!(item.parent, "Milestone 1"),
            Focus::AllComplete => panic!("expected an item"),
        }

        let resolution = Resolver::new(d("2025-01-10"), Window::WithRecovery, &config)
            .resolve(&outcomes);
        assert!(matches!(resolution, Resolution::Active(_)));
    }

    #[test]
    fn oversized_campaign_length_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.campaign_days = i64::MAX;
        assert!(matches!(
            initial_campaigns(&config, d("2025-01-01")),
            Err(CampaignError::DateOutOfRange { .. })
        ));
        let root = dir.path().join("vault");
        assert!(init(&root, &config, d("2025-01-01")).is_err());
        assert!(!root.exists());
    }

    #[test]
    fn next_number_follows_highest() {
        let config = Config::default();
        assert_eq!(next_number("", &config), 1);
        assert_eq!(
            next_number("number: 3\n---\nnumber: x\n---\nnumber: 7\n", &config),
            8
        );
    }

    #[test]
    fn append_adds_separated_block() {
        let config = Config::default();
        let record = campaign_record(&config.keys, 2, "Two", d("2025-03-01"), d("2025-04-12"));

        let appended = append_record("number: 1\nstart: 2025-01-01\nend: 2025-02-11", &record);
        assert!(appended
            .starts_with("number: 1\nstart: 2025-01-01\nend: 2025-02-11\n---\nnumber: 2\n"));
        assert!(appended.ends_with("---\n"));
        assert_eq!(assess(&appended, &config).len(), 2);

        let fresh = initial_campaigns(&config, d("2025-01-01")).unwrap();
        let appended = append_record(&fresh, &record);
        assert!(appended.starts_with(&fresh));
        assert!(!appended.contains("---\n---\n"));
        assert_eq!(next_number(&appended, &config), 3);
    }

    #[test]
    fn append_to_empty_file() {
        let appended = append_record("", "number: 1\n");
        assert_eq!(appended, "---\nnumber: 1\n---\n");
    }

    #[test]
    fn init_creates_missing_files_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("vault");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("wiki.md"), "mine").unwrap();

        let created = init(&root, &Config::default(), d("2025-01-01")).unwrap();
        assert!(created.contains(&root.join("campaigns.md")));
        assert!(created.contains(&root.join("notes")));
        assert!(!created.contains(&root.join("wiki.md")));
        assert_eq!(fs::read_to_string(root.join("wiki.md")).unwrap(), "mine");

        let loaded = Config::load(&root).unwrap();
        assert_eq!(loaded.recovery_days, 14);

        let again = init(&root, &Config::default(), d("2025-06-01")).unwrap();
        assert!(again.is_empty());
    }
}
