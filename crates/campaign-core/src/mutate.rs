//! In-place checkbox rewriting.
//!
//! Only the three bytes of the targeted checkbox change; every other byte of
//! the file, line endings included, is written back untouched.

use crate::campaign::find_record;
use crate::config::Config;
use crate::error::{CampaignError, Result};
use crate::milestone::{CheckState, Focus, MilestoneNode, MilestoneTree};
use crate::record::parse_records;

/// A rewritten milestone, returned alongside the new file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub content: String,
    /// 0-based line of the rewritten milestone.
    pub line: usize,
    pub text: String,
    pub state: CheckState,
}

fn tree_for(content: &str, config: &Config, number: &str) -> Result<MilestoneTree> {
    let records = parse_records(content, &config.keys.number);
    let record = find_record(&records, config, number)?;
    Ok(MilestoneTree::parse(
        record.fields.list(&config.keys.milestones),
    ))
}

/// Mark the `ordinal`-th pending main task (0-based) of campaign `number`.
pub fn toggle(
    content: &str,
    config: &Config,
    number: &str,
    ordinal: usize,
    state: CheckState,
) -> Result<Applied> {
    let tree = tree_for(content, config, number)?;
    let (_, node) = tree
        .pending_main(ordinal)
        .ok_or_else(|| CampaignError::MilestoneNotFound {
            campaign: number.to_string(),
            ordinal,
        })?;
    rewrite(content, number, node, state)
}

/// Mark the `ordinal`-th pending subtask beneath the `parent_ordinal`-th
/// pending main task of campaign `number`.
pub fn toggle_subtask(
    content: &str,
    config: &Config,
    number: &str,
    parent_ordinal: usize,
    ordinal: usize,
    state: CheckState,
) -> Result<Applied> {
    let tree = tree_for(content, config, number)?;
    if tree.pending_main(parent_ordinal).is_none() {
        return Err(CampaignError::MilestoneNotFound {
            campaign: number.to_string(),
            ordinal: parent_ordinal,
        });
    }
    let node = tree
        .pending_subtask(parent_ordinal, ordinal)
        .ok_or_else(|| CampaignError::SubtaskNotFound {
            campaign: number.to_string(),
            parent: parent_ordinal,
            ordinal,
        })?;
    rewrite(content, number, node, state)
}

/// Mark the current focus of campaign `number`: its pending subtask when
/// there is one, otherwise the pending main task itself.
pub fn mark_current(
    content: &str,
    config: &Config,
    number: &str,
    state: CheckState,
) -> Result<Applied> {
    let tree = tree_for(content, config, number)?;
    match tree.find_current() {
        Focus::AllComplete => Err(CampaignError::NothingPending(number.to_string())),
        Focus::Item(item) => match item.subtask_ordinal {
            Some(sub) => toggle_subtask(content, config, number, item.ordinal, sub, state),
            None => toggle(content, config, number, item.ordinal, state),
        },
    }
}

/// Replace the checkbox of `node` with the marker for `state`.
fn rewrite(
    content: &str,
    number: &str,
    node: &MilestoneNode,
    state: CheckState,
) -> Result<Applied> {
    let not_found = || CampaignError::MilestoneNotFound {
        campaign: number.to_string(),
        ordinal: node.line,
    };
    let offset = node.marker_offset.ok_or_else(not_found)?;
    let marker = state.marker();
    let mut out = String::with_capacity(content.len());

    for (index, line) in content.split_inclusive('\n').enumerate() {
        if index == node.line {
            let end = offset + marker.len();
            if !line.is_char_boundary(offset) || !line.is_char_boundary(end) {
                return Err(not_found());
            }
            out.push_str(&line[..offset]);
            out.push_str(marker);
            out.push_str(&line[end..]);
        } else {
            out.push_str(line);
        }
    }

    Ok(Applied {
        content: out,
        line: node.line,
        text: node.text.clone(),
        state,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
