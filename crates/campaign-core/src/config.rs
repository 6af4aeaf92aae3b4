use crate::error::{CampaignError, Result};
use crate::paths;
use crate::record::FieldKeys;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ProgramsConfig
// ---------------------------------------------------------------------------

/// External programs the CLI hands files to. `None` means "use the
/// environment, then the built-in fallback".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pager: Option<String>,
    /// Viewer for the wiki. Unset opens it with the system handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
    #[serde(default = "default_notifier")]
    pub notifier: String,
}

fn default_notifier() -> String {
    "notify-send".to_string()
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            editor: None,
            pager: None,
            viewer: None,
            notifier: default_notifier(),
        }
    }
}

impl ProgramsConfig {
    pub fn editor(&self) -> String {
        resolve_program(self.editor.as_deref(), "EDITOR", "nvim")
    }

    pub fn pager(&self) -> String {
        resolve_program(self.pager.as_deref(), "PAGER", "less")
    }
}

fn resolve_program(configured: Option<&str>, env_var: &str, fallback: &str) -> String {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| fallback.to_string())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Days of recovery after `end` when a record declares no recovery end.
    #[serde(default = "default_recovery_days")]
    pub recovery_days: i64,
    /// Length of a new campaign in days.
    #[serde(default = "default_campaign_days")]
    pub campaign_days: i64,
    /// The week number is clamped to this value.
    #[serde(default = "default_max_week")]
    pub max_week: u32,
    /// Send a desktop notification when a milestone is marked.
    #[serde(default = "default_notify")]
    pub notify: bool,
    #[serde(default)]
    pub programs: ProgramsConfig,
    #[serde(default)]
    pub keys: FieldKeys,
}

/// Upper bound for `recovery_days` and `campaign_days`: a hundred years.
pub const MAX_DAYS: i64 = 36_500;

fn default_recovery_days() -> i64 {
    14
}

fn default_campaign_days() -> i64 {
    42
}

fn default_max_week() -> u32 {
    6
}

fn default_notify() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recovery_days: default_recovery_days(),
            campaign_days: default_campaign_days(),
            max_week: default_max_week(),
            notify: default_notify(),
            programs: ProgramsConfig::default(),
            keys: FieldKeys::default(),
        }
    }
}

impl Config {
    /// Load `config.yaml` from the vault. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.recovery_days < 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "recovery_days is {} (a recovery period cannot be negative)",
                    self.recovery_days
                ),
            });
        } else if self.recovery_days > MAX_DAYS {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "recovery_days is {} (must be at most {MAX_DAYS})",
                    self.recovery_days
                ),
            });
        } else if self.recovery_days == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "recovery_days is 0: campaigns without recovery-end get no recovery period"
                    .to_string(),
            });
        }

        if self.campaign_days < 1 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("campaign_days is {} (must be at least 1)", self.campaign_days),
            });
        } else if self.campaign_days > MAX_DAYS {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "campaign_days is {} (must be at most {MAX_DAYS})",
                    self.campaign_days
                ),
            });
        } else if self.campaign_days < 7 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "campaign_days is {} (shorter than a week is unusual)",
                    self.campaign_days
                ),
            });
        }

        if self.max_week == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "max_week is 0 (weeks are numbered from 1)".to_string(),
            });
        }

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (field, key) in self.keys.all() {
            if key.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("keys.{field} is empty"),
                });
                continue;
            }
            if key.contains(':') {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("keys.{field} '{key}' contains ':'"),
                });
            }
            if let Some(other) = seen.insert(key, field) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("keys.{field} and keys.{other} are both '{key}'"),
                });
            }
        }

        warnings
    }

    /// Fail with every error-level finding; warnings pass.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors: Vec<String> = self
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CampaignError::InvalidConfig(errors.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.recovery_days, 14);
        assert_eq!(cfg.campaign_days, 42);
        assert_eq!(cfg.max_week, 6);
        assert_eq!(cfg.keys.recovery_end, "recovery-end");
        assert_eq!(cfg.programs.notifier, "notify-send");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "recovery_days: 7\nkeys:\n  number: رقم\nprograms:\n  editor: vim\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.recovery_days, 7);
        assert_eq!(cfg.max_week, 6);
        assert_eq!(cfg.keys.number, "رقم");
        assert_eq!(cfg.keys.start, "start");
        assert_eq!(cfg.programs.editor(), "vim");
        assert_eq!(cfg.programs.notifier, "notify-send");
    }

    #[test]
    fn save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.notify = false;
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert!(!loaded.notify);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "max_week: [oops").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_empty());
        assert!(Config::default().ensure_valid().is_ok());
    }

    #[test]
    fn validate_flags_duplicate_and_empty_keys() {
        let mut cfg = Config::default();
        cfg.keys.name = "number".to_string();
        cfg.keys.rate = String::new();
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("keys.name and keys.number")));
        assert!(warnings.iter().any(|w| w.message == "keys.rate is empty"));
        assert!(matches!(
            cfg.ensure_valid(),
            Err(CampaignError::InvalidConfig(_))
        ));
    }

    #[test]
    fn oversized_day_counts_are_errors() {
        let mut cfg = Config::default();
        cfg.recovery_days = 100_000_000;
        let err = cfg.ensure_valid().unwrap_err().to_string();
        assert!(err.contains("recovery_days is 100000000 (must be at most 36500)"));

        cfg.recovery_days = MAX_DAYS;
        cfg.campaign_days = i64::MAX;
        let errors: Vec<_> = cfg
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("campaign_days is"));
    }

    #[test]
    fn huge_day_counts_in_yaml_load_then_fail_validation() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "recovery_days: 9223372036854775807\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.recovery_days, i64::MAX);
        assert!(matches!(
            cfg.ensure_valid(),
            Err(CampaignError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_flags_cycle_lengths() {
        let mut cfg = Config::default();
        cfg.recovery_days = 0;
        cfg.campaign_days = 3;
        cfg.max_week = 0;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 3);
        assert_eq!(
            warnings.iter().filter(|w| w.level == WarnLevel::Error).count(),
            1
        );
    }
}
