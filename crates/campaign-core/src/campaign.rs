use crate::config::Config;
use crate::error::{CampaignError, Result};
use crate::milestone::MilestoneTree;
use crate::record::{parse_records, RawRecord};
use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

static DATE_RE: OnceLock<Regex> = OnceLock::new();

fn date_re() -> &'static Regex {
    DATE_RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
}

/// Parse a strict `YYYY-MM-DD` date. Surrounding whitespace is ignored.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if !date_re().is_match(value) {
        return Err(CampaignError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| CampaignError::InvalidDate(value.to_string()))
}

/// `date` moved by `days`, or [`CampaignError::DateOutOfRange`] when the
/// result falls outside the calendar chrono can represent.
pub fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or(CampaignError::DateOutOfRange { date, days })
}

// ---------------------------------------------------------------------------
// Campaign
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub number: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub recovery_end: NaiveDate,
    /// False when `recovery_end` was derived from `end`.
    pub recovery_declared: bool,
    pub status: Option<String>,
    pub rate: Option<String>,
    pub milestones: MilestoneTree,
    pub links: Vec<String>,
}

impl Campaign {
    /// The name, or `Campaign <number>` when unnamed.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Campaign {}", self.number),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    MissingField { field: String },
    InvalidDate { field: String, value: String },
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    RecoveryBeforeEnd { end: NaiveDate, recovery_end: NaiveDate },
    RecoveryOutOfRange { end: NaiveDate, days: i64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField { field } => write!(f, "missing '{field}'"),
            SkipReason::InvalidDate { field, value } => {
                write!(f, "'{field}' is not a YYYY-MM-DD date: '{value}'")
            }
            SkipReason::EndBeforeStart { start, end } => {
                write!(f, "end {end} is before start {start}")
            }
            SkipReason::RecoveryBeforeEnd { end, recovery_end } => {
                write!(f, "recovery end {recovery_end} is before end {end}")
            }
            SkipReason::RecoveryOutOfRange { end, days } => {
                write!(f, "end {end} plus {days} recovery days is out of range")
            }
        }
    }
}

/// What became of one record: usable, or skipped with a reason.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    Ready(Box<Campaign>),
    Skipped {
        number: String,
        line: usize,
        reason: SkipReason,
    },
}

impl RecordOutcome {
    pub fn number(&self) -> &str {
        match self {
            RecordOutcome::Ready(c) => &c.number,
            RecordOutcome::Skipped { number, .. } => number,
        }
    }

    pub fn campaign(&self) -> Option<&Campaign> {
        match self {
            RecordOutcome::Ready(c) => Some(c),
            RecordOutcome::Skipped { .. } => None,
        }
    }
}

/// Turn a raw record into a campaign, validating its dates.
pub fn evaluate(record: &RawRecord, config: &Config) -> RecordOutcome {
    let keys = &config.keys;
    let fields = &record.fields;
    let number = fields.scalar(&keys.number).unwrap_or_default().to_string();

    let skipped = |reason: SkipReason| {
        tracing::debug!(
            campaign = %number,
            line = record.first_line + 1,
            "skipping record: {reason}"
        );
        RecordOutcome::Skipped {
            number: number.clone(),
            line: record.first_line + 1,
            reason,
        }
    };

    let date = |key: &str| -> std::result::Result<Option<NaiveDate>, SkipReason> {
        match fields.scalar(key) {
            None => Ok(None),
            Some(value) => parse_date(value).map(Some).map_err(|_| SkipReason::InvalidDate {
                field: key.to_string(),
                value: value.to_string(),
            }),
        }
    };

    let mut dates = Vec::with_capacity(2);
    for key in [&keys.start, &keys.end] {
        match date(key.as_str()) {
            Ok(Some(d)) => dates.push(d),
            Ok(None) => {
                return skipped(SkipReason::MissingField {
                    field: key.to_string(),
                })
            }
            Err(reason) => return skipped(reason),
        }
    }
    let (start, end) = (dates[0], dates[1]);
    if end < start {
        return skipped(SkipReason::EndBeforeStart { start, end });
    }

    let (recovery_end, recovery_declared) = match date(keys.recovery_end.as_str()) {
        Ok(Some(d)) => (d, true),
        Ok(None) => match add_days(end, config.recovery_days) {
            Ok(d) => (d, false),
            Err(_) => {
                return skipped(SkipReason::RecoveryOutOfRange {
                    end,
                    days: config.recovery_days,
                })
            }
        },
        Err(reason) => return skipped(reason),
    };
    if recovery_end < end {
        return skipped(SkipReason::RecoveryBeforeEnd { end, recovery_end });
    }

    let text = |key: &String| fields.scalar(key).map(str::to_string);

    RecordOutcome::Ready(Box::new(Campaign {
        number: number.clone(),
        name: text(&keys.name),
        description: text(&keys.description),
        start,
        end,
        recovery_end,
        recovery_declared,
        status: text(&keys.status),
        rate: text(&keys.rate),
        milestones: MilestoneTree::parse(fields.list(&keys.milestones)),
        links: fields
            .list(&keys.links)
            .iter()
            .map(|l| l.raw.trim().trim_start_matches('-').trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
    }))
}

/// Parse every record in `content`. One bad record never affects another.
pub fn assess(content: &str, config: &Config) -> Vec<RecordOutcome> {
    parse_records(content, &config.keys.number)
        .iter()
        .map(|r| evaluate(r, config))
        .collect()
}

/// Find the first record whose number is `number`, usable or not.
pub fn find_record<'a>(
    records: &'a [RawRecord],
    config: &Config,
    number: &str,
) -> Result<&'a RawRecord> {
    records
        .iter()
        .find(|r| r.fields.scalar(&config.keys.number) == Some(number))
        .ok_or_else(|| CampaignError::RecordNotFound(number.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milestone::Focus;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn one(content: &str) -> RecordOutcome {
        let mut outcomes = assess(content, &Config::default());
        assert_eq!(outcomes.len(), 1);
        outcomes.remove(0)
    }

    #[test]
    fn strict_dates() {
        assert_eq!(parse_date("2025-01-05").unwrap(), d("2025-01-05"));
        assert_eq!(parse_date(" 2025-01-05 ").unwrap(), d("2025-01-05"));
        for bad in ["2025-1-5", "05/01/2025", "2025-02-30", "", "2025-01-05x"] {
            assert!(parse_date(bad).is_err(), "expected invalid: {bad}");
        }
    }

    #[test]
    fn derived_recovery_end() {
        let outcome = one("number: 1\nstart: 2025-01-01\nend: 2025-02-11\n");
        let c = outcome.campaign().unwrap();
        assert_eq!(c.recovery_end, d("2025-02-25"));
        assert!(!c.recovery_declared);
        assert!(c.recovery_end >= c.end);
        assert_eq!(c.display_name(), "Campaign 1");
    }

    #[test]
    fn declared_recovery_end() {
        let outcome =
            one("number: 1\nstart: 2025-01-01\nend: 2025-02-11\nrecovery-end: 2025-03-01\n");
        let c = outcome.campaign().unwrap();
        assert_eq!(c.recovery_end, d("2025-03-01"));
        assert!(c.recovery_declared);
    }

    #[test]
    fn blank_recovery_end_is_derived() {
        let outcome = one("number: 1\nstart: 2025-01-01\nend: 2025-02-11\nrecovery-end:   \n");
        assert_eq!(outcome.campaign().unwrap().recovery_end, d("2025-02-25"));
    }

    #[test]
    fn recovery_before_end_is_skipped() {
        let outcome =
            one("number: 7\nstart: 2025-01-01\nend: 2025-02-11\nrecovery-end: 2025-02-01\n");
        match outcome {
            RecordOutcome::Skipped { number, reason, .. } => {
                assert_eq!(number, "7");
                assert!(matches!(reason, SkipReason::RecoveryBeforeEnd { .. }));
            }
            RecordOutcome::Ready(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn huge_recovery_days_skip_instead_of_overflowing() {
        let content = "number: 1\nstart: 2025-01-01\nend: 2025-02-11\n---\nnumber: 2\nstart: 2025-01-01\nend: 2025-02-11\nrecovery-end: 2025-03-01\n";
        for days in [100_000_000, i64::MAX] {
            let mut config = Config::default();
            config.recovery_days = days;
            let outcomes = assess(content, &config);
            assert!(matches!(
                &outcomes[0],
                RecordOutcome::Skipped {
                    reason: SkipReason::RecoveryOutOfRange { .. },
                    ..
                }
            ));
            assert_eq!(outcomes[1].campaign().unwrap().recovery_end, d("2025-03-01"));
        }
    }

    #[test]
    fn add_days_reports_overflow() {
        assert_eq!(add_days(d("2025-01-01"), 42).unwrap(), d("2025-02-12"));
        assert!(matches!(
            add_days(d("2025-01-01"), 100_000_000),
            Err(CampaignError::DateOutOfRange { days: 100_000_000, .. })
        ));
        assert!(add_days(d("2025-01-01"), i64::MAX).is_err());
    }

    #[test]
    fn missing_and_invalid_dates_are_skipped() {
        let missing = one("number: 1\nstart: 2025-01-01\n");
        assert!(matches!(
            missing,
            RecordOutcome::Skipped {
                reason: SkipReason::MissingField { .. },
                ..
            }
        ));

        let invalid = one("number: 1\nstart: 2025-01-01\nend: soon\n");
        match invalid {
            RecordOutcome::Skipped { reason, line, .. } => {
                assert_eq!(line, 1);
                assert_eq!(
                    reason,
                    SkipReason::InvalidDate {
                        field: "end".to_string(),
                        value: "soon".to_string()
                    }
                );
            }
            RecordOutcome::Ready(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn end_before_start_is_skipped() {
        let outcome = one("number: 1\nstart: 2025-02-01\nend: 2025-01-01\n");
        assert!(matches!(
            outcome,
            RecordOutcome::Skipped {
                reason: SkipReason::EndBeforeStart { .. },
                ..
            }
        ));
    }

    #[test]
    fn bad_record_does_not_affect_others() {
        let content = "number: 1\nstart: nope\nend: 2025-01-01\n---\nnumber: 2\nstart: 2025-01-01\nend: 2025-01-02\n";
        let outcomes = assess(content, &Config::default());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].campaign().is_none());
        assert_eq!(outcomes[1].campaign().unwrap().number, "2");
    }

    #[test]
    fn fields_are_carried_over() {
        let content = "\
number: 3
name: Deep Work
description: ship the thing
start: 2025-01-01
end: 2025-02-11
milestones:
   - [x] Outline
   - [ ] Draft
      - [ ] Intro
status: active
rate: 4
links&drafts:
   - https://example.com/notes
   -
";
        let outcome = one(content);
        let c = outcome.campaign().unwrap();
        assert_eq!(c.display_name(), "Deep Work");
        assert_eq!(c.description.as_deref(), Some("ship the thing"));
        assert_eq!(c.status.as_deref(), Some("active"));
        assert_eq!(c.rate.as_deref(), Some("4"));
        assert_eq!(c.links, vec!["https://example.com/notes"]);
        assert_eq!(c.milestones.progress().to_string(), "1/2");
        assert!(matches!(c.milestones.find_current(), Focus::Item(_)));
    }

    #[test]
    fn find_record_by_number() {
        let config = Config::default();
        let records = parse_records("number: 1\n---\nnumber: 2\n", &config.keys.number);
        assert_eq!(find_record(&records, &config, "2").unwrap().first_line, 2);
        assert!(matches!(
            find_record(&records, &config, "9"),
            Err(CampaignError::RecordNotFound(_))
        ));
    }
}
