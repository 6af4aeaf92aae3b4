//! Splitting a campaigns file into records and parsing each record's fields.
//!
//! The format is a loose `key: value` grammar. A key with an empty value
//! opens a list, and the `- ` lines that follow are collected verbatim
//! (leading whitespace included) until the next key.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A line consisting of exactly this token separates two records.
pub const SEPARATOR: &str = "---";

/// Blocks containing this marker are examples and never parsed as records.
pub const TEMPLATE_MARKER: &str = "###TEMPLATE###";

/// Prefix (after trimming) of a list item line.
pub const LIST_MARKER: char = '-';

// ---------------------------------------------------------------------------
// FieldKeys
// ---------------------------------------------------------------------------

/// The textual key used for each known field. Configurable so a campaigns
/// file can be written in another language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FieldKeys {
    pub number: String,
    pub name: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub recovery_end: String,
    pub milestones: String,
    pub status: String,
    pub rate: String,
    pub links: String,
}

impl Default for FieldKeys {
    fn default() -> Self {
        Self {
            number: "number".to_string(),
            name: "name".to_string(),
            description: "description".to_string(),
            start: "start".to_string(),
            end: "end".to_string(),
            recovery_end: "recovery-end".to_string(),
            milestones: "milestones".to_string(),
            status: "status".to_string(),
            rate: "rate".to_string(),
            links: "links&drafts".to_string(),
        }
    }
}

impl FieldKeys {
    pub fn all(&self) -> [(&'static str, &str); 10] {
        [
            ("number", &self.number),
            ("name", &self.name),
            ("description", &self.description),
            ("start", &self.start),
            ("end", &self.end),
            ("recovery_end", &self.recovery_end),
            ("milestones", &self.milestones),
            ("status", &self.status),
            ("rate", &self.rate),
            ("links", &self.links),
        ]
    }
}

// ---------------------------------------------------------------------------
// Source lines and blocks
// ---------------------------------------------------------------------------

/// One line of the campaigns file, without its line ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 0-based line number in the whole file.
    pub number: usize,
    pub text: &'a str,
}

/// A trimmed run of lines between two separators.
#[derive(Debug, Clone)]
pub struct Block<'a> {
    /// 0-based position among the kept blocks.
    pub index: usize,
    pub lines: Vec<SourceLine<'a>>,
}

impl Block<'_> {
    pub fn first_line(&self) -> usize {
        self.lines.first().map(|l| l.number).unwrap_or(0)
    }

    fn is_template(&self) -> bool {
        self.lines.iter().any(|l| l.text.contains(TEMPLATE_MARKER))
    }
}

/// Split `content` on separator lines. Blank edges are trimmed from each
/// block; empty blocks and template blocks are dropped.
pub fn split_blocks(content: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Vec<SourceLine<'_>> = Vec::new();

    for (number, text) in content.lines().enumerate() {
        if text == SEPARATOR {
            push_block(&mut blocks, std::mem::take(&mut current));
        } else {
            current.push(SourceLine { number, text });
        }
    }
    push_block(&mut blocks, current);
    blocks
}

fn push_block<'a>(blocks: &mut Vec<Block<'a>>, mut lines: Vec<SourceLine<'a>>) {
    while lines.last().is_some_and(|l| l.text.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines
        .iter()
        .take_while(|l| l.text.trim().is_empty())
        .count();
    lines.drain(..leading);
    if lines.is_empty() {
        return;
    }
    let block = Block {
        index: blocks.len(),
        lines,
    };
    if block.is_template() {
        return;
    }
    blocks.push(block);
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    ListItem,
    Field { key: &'a str, value: &'a str },
    Other,
}

/// Classify a single record line.
///
/// The list marker is checked before the colon, so `- [ ] ratio 3:1` is a
/// list item and never a key.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with(LIST_MARKER) {
        return LineKind::ListItem;
    }
    match line.split_once(':') {
        Some((key, value)) => LineKind::Field {
            key: key.trim(),
            value: value.trim(),
        },
        None => LineKind::Other,
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// A list item as written, trailing whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListLine {
    /// 0-based line number in the whole file.
    pub line: usize,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<ListLine>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Fields(HashMap<String, FieldValue>);

impl Fields {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The scalar value of `key`, if it was written as `key: value`.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(FieldValue::Scalar(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The list items of `key`; empty when absent or scalar.
    pub fn list(&self, key: &str) -> &[ListLine] {
        match self.0.get(key) {
            Some(FieldValue::List(items)) => items,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, key: &str, value: FieldValue) {
        self.0.insert(key.to_string(), value);
    }
}

/// Parse the lines of one record into its fields.
pub fn parse_fields(lines: &[SourceLine<'_>]) -> Fields {
    let mut fields = Fields::default();
    let mut pending: Option<(&str, Vec<ListLine>)> = None;

    for line in lines {
        match classify_line(line.text) {
            LineKind::Blank | LineKind::Other => {}
            LineKind::ListItem => {
                if let Some((_, items)) = pending.as_mut() {
                    items.push(ListLine {
                        line: line.number,
                        raw: line.text.trim_end().to_string(),
                    });
                }
            }
            LineKind::Field { key, value } => {
                flush(&mut fields, pending.take());
                if value.is_empty() {
                    pending = Some((key, Vec::new()));
                } else {
                    fields.insert(key, FieldValue::Scalar(value.to_string()));
                }
            }
        }
    }
    flush(&mut fields, pending);
    fields
}

fn flush(fields: &mut Fields, pending: Option<(&str, Vec<ListLine>)>) {
    if let Some((key, items)) = pending {
        if !items.is_empty() {
            fields.insert(key, FieldValue::List(items));
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A block that carries a number field. Nothing else is validated here.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub first_line: usize,
    pub fields: Fields,
}

/// Split `content` into blocks and keep those whose fields contain `number_key`.
pub fn parse_records(content: &str, number_key: &str) -> Vec<RawRecord> {
    split_blocks(content)
        .into_iter()
        .filter_map(|block| {
            let fields = parse_fields(&block.lines);
            if fields.contains(number_key) {
                Some(RawRecord {
                    first_line: block.first_line(),
                    fields,
                })
            } else {
                tracing::debug!(
                    block = block.index,
                    line = block.first_line() + 1,
                    "block has no {number_key} field"
                );
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "---
number: 1
name: First
milestones:
   - [x] A
   - [ ] B: with colon
      - [ ] B1

status: active
---

---
###TEMPLATE###
number: 99
---
number: 2
name: Second
";

    fn lines(text: &str) -> Vec<SourceLine<'_>> {
        text.lines()
            .enumerate()
            .map(|(number, text)| SourceLine { number, text })
            .collect()
    }

    #[test]
    fn split_drops_empty_and_template_blocks() {
        let blocks = split_blocks(FILE);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines[0].text, "number: 1");
        assert_eq!(blocks[0].first_line(), 1);
        assert_eq!(blocks[1].lines[0].text, "number: 2");
        assert_eq!(blocks[1].index, 1);
    }

    #[test]
    fn split_trims_blank_edges() {
        let blocks = split_blocks("\n\nnumber: 1\n\n\n---\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 1);
        assert_eq!(blocks[0].lines[0].number, 2);
    }

    #[test]
    fn separator_must_be_exact() {
        let blocks = split_blocks("number: 1\n ---\nname: x---\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 3);
    }

    #[test]
    fn list_marker_wins_over_colon() {
        assert_eq!(classify_line("   - [ ] ratio 3:1"), LineKind::ListItem);
        assert_eq!(
            classify_line("start: 2025-01-01"),
            LineKind::Field {
                key: "start",
                value: "2025-01-01"
            }
        );
        assert_eq!(classify_line("   "), LineKind::Blank);
        assert_eq!(classify_line("free text"), LineKind::Other);
    }

    #[test]
    fn value_keeps_later_colons() {
        assert_eq!(
            classify_line("links: https://example.com"),
            LineKind::Field {
                key: "links",
                value: "https://example.com"
            }
        );
    }

    #[test]
    fn list_items_keep_indentation_and_line_numbers() {
        let fields = parse_fields(&lines(
            "milestones:\n   - [x] A   \n\n      - [ ] A1\nstatus: active",
        ));
        let items = fields.list("milestones");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].raw, "   - [x] A");
        assert_eq!(items[0].line, 1);
        assert_eq!(items[1].raw, "      - [ ] A1");
        assert_eq!(items[1].line, 3);
        assert_eq!(fields.scalar("status"), Some("active"));
    }

    #[test]
    fn scalar_flushes_pending_list() {
        let fields = parse_fields(&lines("links:\n - a\nname: x\n - orphan"));
        assert_eq!(fields.list("links").len(), 1);
        assert_eq!(fields.scalar("name"), Some("x"));
    }

    #[test]
    fn empty_list_is_not_stored() {
        let fields = parse_fields(&lines("recovery-end:\ndescription: \nname: x"));
        assert!(!fields.contains("recovery-end"));
        assert!(!fields.contains("description"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn list_item_without_pending_key_is_ignored() {
        let fields = parse_fields(&lines("- stray\nname: x"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn records_require_number() {
        let records = parse_records("name: no number\n---\nnumber: 3\n", "number");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields.scalar("number"), Some("3"));
        assert_eq!(records[0].first_line, 2);
    }

    #[test]
    fn records_from_file() {
        let records = parse_records(FILE, "number");
        assert_eq!(records.len(), 2);
        let first = &records[0].fields;
        assert_eq!(first.scalar("name"), Some("First"));
        assert_eq!(first.list("milestones").len(), 3);
        assert_eq!(first.list("milestones")[1].raw, "   - [ ] B: with colon");
    }

    #[test]
    fn crlf_lines_are_parsed() {
        let records = parse_records("number: 1\r\nname: win\r\n---\r\n", "number");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields.scalar("name"), Some("win"));
    }

    #[test]
    fn custom_number_key() {
        let keys = FieldKeys {
            number: "رقم".to_string(),
            ..FieldKeys::default()
        };
        let records = parse_records("رقم: 4\n", &keys.number);
        assert_eq!(records.len(), 1);
    }
}
