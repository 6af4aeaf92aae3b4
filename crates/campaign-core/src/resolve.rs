//! Picking today's campaign and working out where in its cycle we are.

use crate::campaign::{Campaign, RecordOutcome};
use crate::config::Config;
use crate::error::{CampaignError, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// Statuses that keep a record eligible. A blank status is eligible too.
pub const ELIGIBLE_STATUSES: &[&str] = &["active", "rest"];

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// `start <= today <= end`.
    Campaign { week: u32, days_left: i64 },
    /// `end < today <= recovery_end`.
    Recovery {
        recovery_end: NaiveDate,
        days_left: i64,
    },
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Campaign { .. } => "campaign",
            Phase::Recovery { .. } => "recovery",
        }
    }
}

/// How far past `end` a record stays active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Active from `start` to `end`.
    Campaign,
    /// Active from `start` to `recovery_end`.
    WithRecovery,
}

/// 1-based week of the campaign containing `today`, clamped to `max_week`.
pub fn week_number(start: NaiveDate, today: NaiveDate, max_week: u32) -> u32 {
    let days = (today - start).num_days().max(0);
    let week = u32::try_from(days / 7 + 1).unwrap_or(u32::MAX);
    week.min(max_week.max(1))
}

/// The phase `campaign` is in on `today`, or `None` when outside the window.
pub fn classify(
    campaign: &Campaign,
    today: NaiveDate,
    window: Window,
    max_week: u32,
) -> Option<Phase> {
    if today < campaign.start {
        return None;
    }
    if today <= campaign.end {
        return Some(Phase::Campaign {
            week: week_number(campaign.start, today, max_week),
            days_left: (campaign.end - today).num_days(),
        });
    }
    match window {
        Window::WithRecovery if today <= campaign.recovery_end => Some(Phase::Recovery {
            recovery_end: campaign.recovery_end,
            days_left: (campaign.recovery_end - today).num_days(),
        }),
        _ => None,
    }
}

/// Whether the record's advisory status allows it to be active.
pub fn is_eligible(campaign: &Campaign) -> bool {
    match campaign.status.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(status) => ELIGIBLE_STATUSES
            .iter()
            .any(|s| s.eq_ignore_ascii_case(status)),
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ActiveCampaign {
    pub campaign: Campaign,
    #[serde(flatten)]
    pub phase: Phase,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "campaigns", rename_all = "snake_case")]
pub enum Resolution {
    None,
    Active(Box<ActiveCampaign>),
    /// More than one record is active; none is picked.
    Conflict(Vec<ActiveCampaign>),
}

impl Resolution {
    /// The active campaign, `None` when nothing is active, or a
    /// [`CampaignError::Conflict`] naming every overlapping record.
    pub fn into_active(self) -> Result<Option<ActiveCampaign>> {
        match self {
            Resolution::None => Ok(None),
            Resolution::Active(a) => Ok(Some(*a)),
            Resolution::Conflict(active) => Err(CampaignError::Conflict(
                active.into_iter().map(|a| a.campaign.number).collect(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    pub today: NaiveDate,
    pub window: Window,
    pub max_week: u32,
}

impl Resolver {
    pub fn new(today: NaiveDate, window: Window, config: &Config) -> Self {
        Self {
            today,
            window,
            max_week: config.max_week,
        }
    }

    fn matches<'a>(
        &'a self,
        outcomes: &'a [RecordOutcome],
    ) -> impl Iterator<Item = ActiveCampaign> + 'a {
        outcomes
            .iter()
            .filter_map(RecordOutcome::campaign)
            .filter(|c| {
                let eligible = is_eligible(c);
                if !eligible {
                    tracing::debug!(
                        campaign = %c.number,
                        status = ?c.status,
                        "status is not active"
                    );
                }
                eligible
            })
            .filter_map(|c| {
                classify(c, self.today, self.window, self.max_week).map(|phase| ActiveCampaign {
                    campaign: c.clone(),
                    phase,
                })
            })
    }

    /// The first active record in file order. Overlaps are not detected.
    pub fn first_active(&self, outcomes: &[RecordOutcome]) -> Option<ActiveCampaign> {
        self.matches(outcomes).next()
    }

    /// All active records; more than one is reported as a conflict.
    pub fn resolve(&self, outcomes: &[RecordOutcome]) -> Resolution {
        let mut active: Vec<ActiveCampaign> = self.matches(outcomes).collect();
        match active.len() {
            0 => Resolution::None,
            1 => Resolution::Active(Box::new(active.remove(0))),
            _ => {
                let numbers: Vec<&str> =
                    active.iter().map(|a| a.campaign.number.as_str()).collect();
                tracing::warn!(campaigns = ?numbers, "multiple active campaigns");
                Resolution::Conflict(active)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
