use crate::cmd::{active, load_config, NO_ACTIVE};
use crate::output::print_json;
use campaign_core::milestone::{Focus, Progress};
use chrono::NaiveDate;
use std::path::Path;

/// `[c/t] parent → subtask`, or the all-complete line.
pub fn focus_line(focus: &Focus, progress: Progress) -> String {
    match focus {
        Focus::Item(item) => match &item.subtask {
            Some(sub) => format!("[{progress}] {} → {sub}", item.parent),
            None => format!("[{progress}] {}", item.parent),
        },
        Focus::AllComplete => format!("[{progress}] All milestones complete!"),
    }
}

pub fn run(root: &Path, today: NaiveDate, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let Some(active) = active(root, &config, today)? else {
        if json {
            print_json(&serde_json::Value::Null)?;
        } else {
            println!("{NO_ACTIVE}");
        }
        return Ok(());
    };

    let milestones = &active.campaign.milestones;
    let focus = milestones.find_current();
    let progress = milestones.progress();

    if json {
        print_json(&serde_json::json!({
            "campaign": active.campaign.number,
            "focus": focus,
            "progress": progress,
        }))?;
    } else {
        println!("{}", focus_line(&focus, progress));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::milestone::ActionableItem;

    #[test]
    fn renders_parent_and_subtask() {
        let focus = Focus::Item(ActionableItem {
            parent: "B".to_string(),
            subtask: Some("B1".to_string()),
            ordinal: 0,
            subtask_ordinal: Some(0),
            position: 2,
        });
        let progress = Progress {
            completed: 1,
            total: 3,
        };
        assert_eq!(focus_line(&focus, progress), "[1/3] B → B1");
        assert_eq!(
            focus_line(&Focus::AllComplete, progress),
            "[1/3] All milestones complete!"
        );
    }
}
