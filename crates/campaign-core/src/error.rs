use thiserror::Error;

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("campaign not found: {0}")]
    RecordNotFound(String),

    /// `ordinal` is 0-based; messages count from 1.
    #[error("campaign {campaign} has no pending milestone #{}", .ordinal + 1)]
    MilestoneNotFound { campaign: String, ordinal: usize },

    #[error(
        "campaign {campaign} has no pending subtask #{} under pending milestone #{}",
        .ordinal + 1,
        .parent + 1
    )]
    SubtaskNotFound {
        campaign: String,
        parent: usize,
        ordinal: usize,
    },

    #[error("all milestones of campaign {0} are complete")]
    NothingPending(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("{date} plus {days} days is out of range")]
    DateOutOfRange { date: chrono::NaiveDate, days: i64 },

    #[error("multiple active campaigns: {}", .0.join(", "))]
    Conflict(Vec<String>),

    #[error("timed out after {timeout_ms}ms waiting for lock {path}")]
    LockTimeout { path: String, timeout_ms: u64 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CampaignError>;
