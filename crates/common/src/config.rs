//! Ledger configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the production parameters.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::cooldown::{RewardCooldown, DEFAULT_REWARD_COOLDOWN_SECS};

/// Global capacity ceiling, in capacity units.
pub const DEFAULT_MAX_CAPACITY_UNITS: u64 = 100_000;

/// Minimum monetary value of a commodity (tier 4) node, in base units.
pub const DEFAULT_COMMODITY_MIN_VALUE: u128 = 1_000_000;

/// Capacity units consumed by one commodity node.
pub const DEFAULT_COMMODITY_CAPACITY_UNITS: u64 = 10;

/// Reward schedules run for at most this many years.
pub const REWARD_YEAR_CEILING: u32 = 30;

/// Last reward year accepted by the reward ledger.
pub const DEFAULT_MAX_REWARD_YEAR: u32 = REWARD_YEAR_CEILING;

/// Retained ledger events.
pub const DEFAULT_MAX_EVENTS: usize = 1_000;

/// Year-1 reward per unit of node weight, in base units (1e15 = 0.001 of an 18-decimal token).
pub const DEFAULT_BASE_REWARD_PER_UNIT: u128 = 1_000_000_000_000_000;

/// Yearly reward decrease, in percent.
pub const DEFAULT_YEARLY_DECAY_PERCENT: u8 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Ceiling on weighted node capacity across the whole registry.
    pub max_capacity_units: u64,

    /// Minimum monetary value for tier 4 nodes.
    pub commodity_min_value: u128,

    /// Capacity units a tier 4 node consumes.
    pub commodity_capacity_units: u64,

    /// Minimum seconds between two rewards to the same user.
    pub reward_cooldown_secs: u64,

    /// Reward years run from 1 to this value inclusive. May shorten the
    /// schedule, never extend it past [`REWARD_YEAR_CEILING`].
    pub max_reward_year: u32,

    /// Size of the in-memory event log.
    pub max_events: usize,

    /// Parameters of the bundled decreasing reward calculator.
    pub base_reward_per_unit: u128,
    pub yearly_decay_percent: u8,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            max_capacity_units: DEFAULT_MAX_CAPACITY_UNITS,
            commodity_min_value: DEFAULT_COMMODITY_MIN_VALUE,
            commodity_capacity_units: DEFAULT_COMMODITY_CAPACITY_UNITS,
            reward_cooldown_secs: DEFAULT_REWARD_COOLDOWN_SECS,
            max_reward_year: DEFAULT_MAX_REWARD_YEAR,
            max_events: DEFAULT_MAX_EVENTS,
            base_reward_per_unit: DEFAULT_BASE_REWARD_PER_UNIT,
            yearly_decay_percent: DEFAULT_YEARLY_DECAY_PERCENT,
        }
    }
}

impl LedgerConfig {
    pub fn cooldown(&self) -> RewardCooldown {
        RewardCooldown::new(self.reward_cooldown_secs)
    }

    /// Reject parameter combinations the ledger cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_capacity_units == 0 {
            return Err(ConfigError::Invalid("max_capacity_units must be > 0".into()));
        }
        if self.commodity_capacity_units == 0 {
            return Err(ConfigError::Invalid("commodity_capacity_units must be > 0".into()));
        }
        if self.max_reward_year == 0 || self.max_reward_year > REWARD_YEAR_CEILING {
            return Err(ConfigError::Invalid(format!(
                "max_reward_year must be within 1..={}, got {}",
                REWARD_YEAR_CEILING, self.max_reward_year
            )));
        }
        if self.max_events == 0 {
            return Err(ConfigError::Invalid("max_events must be > 0".into()));
        }
        if self.yearly_decay_percent > 100 {
            return Err(ConfigError::Invalid(format!(
                "yearly_decay_percent must be <= 100, got {}",
                self.yearly_decay_percent
            )));
        }
        Ok(())
    }
}

/// Parse and validate a config from TOML text.
pub fn parse(s: &str) -> Result<LedgerConfig, ConfigError> {
    let cfg: LedgerConfig = toml::from_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load config from a TOML file path.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<LedgerConfig, ConfigError> {
    let s = fs::read_to_string(path.as_ref())?;
    parse(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let def = LedgerConfig::default();
        assert_eq!(def.commodity_min_value, 1_000_000);
        assert_eq!(def.reward_cooldown_secs, 86_400);
        assert_eq!(def.max_reward_year, 30);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(parse("").unwrap(), LedgerConfig::default());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(parse("max_capacity_units = 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse("yearly_decay_percent = 101"), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse("max_reward_year = 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse("max_reward_year = 31"), Err(ConfigError::Invalid(_))));
        assert_eq!(parse("max_reward_year = 30").unwrap().max_reward_year, 30);
        assert!(matches!(parse("max_events = \"many\""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file_roundtrip() {
        use std::io::Write;
        let tmp = tempfile::NamedTempFile::new().expect("temp file");
        let toml = r#"
            max_capacity_units = 500
            commodity_capacity_units = 25
            reward_cooldown_secs = 3600
        "#;
        let mut f = tmp.reopen().expect("reopen");
        write!(f, "{}", toml).expect("write");
        let cfg = load_from_file(tmp.path()).expect("load");
        assert_eq!(cfg.max_capacity_units, 500);
        assert_eq!(cfg.commodity_capacity_units, 25);
        assert_eq!(cfg.cooldown().window_secs, 3600);
        assert_eq!(cfg.max_reward_year, DEFAULT_MAX_REWARD_YEAR);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_from_file("/nonexistent/pnode.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
