//! Engine configuration with validation and defaults.
//!
//! All monetary fields are integer minor units; the house edge is integer
//! basis points. Conversion to decimal happens only at presentation
//! boundaries, never inside payout math.

use crate::games::types::GameType;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MAX_HOUSE_EDGE_BPS: u32 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Stake tier and house edge for one game.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameParams {
    /// House edge in basis points (100 = 1%).
    pub house_edge_bps: u32,
    /// Minimum stake in minor units, exclusive lower bound is zero.
    pub min_stake: u64,
    /// Maximum stake in minor units.
    pub max_stake: u64,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            house_edge_bps: 100,
            min_stake: 100,
            max_stake: 100_000_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    pub dice: GameParams,
    pub crash: GameParams,
    pub slots: GameParams,
    pub vegetables: GameParams,
    /// Payouts at or above this trigger the best-effort compliance alert.
    pub large_win_threshold: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dice: GameParams::default(),
            crash: GameParams::default(),
            slots: GameParams::default(),
            vegetables: GameParams::default(),
            large_win_threshold: 10_000_000,
        }
    }
}

impl EngineConfig {
    pub fn params(&self, game: GameType) -> &GameParams {
        match game {
            GameType::Dice => &self.dice,
            GameType::Crash => &self.crash,
            GameType::Slots => &self.slots,
            GameType::Vegetables => &self.vegetables,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, params) in [
            ("dice", &self.dice),
            ("crash", &self.crash),
            ("slots", &self.slots),
            ("vegetables", &self.vegetables),
        ] {
            if params.house_edge_bps >= MAX_HOUSE_EDGE_BPS {
                return Err(ConfigError::Invalid {
                    field: format!("{}.house_edge_bps", name),
                    reason: format!("must be below {}", MAX_HOUSE_EDGE_BPS),
                });
            }
            if params.min_stake == 0 {
                return Err(ConfigError::Invalid {
                    field: format!("{}.min_stake", name),
                    reason: "must be positive".to_string(),
                });
            }
            if params.min_stake > params.max_stake {
                return Err(ConfigError::Invalid {
                    field: format!("{}.max_stake", name),
                    reason: "must be at least min_stake".to_string(),
                });
            }
        }
        if self.large_win_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "large_win_threshold".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_full_house_edge() {
        let mut config = EngineConfig::default();
        config.crash.house_edge_bps = 10_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_stake_tier() {
        let mut config = EngineConfig::default();
        config.dice.min_stake = 1_000;
        config.dice.max_stake = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_round_trip() {
        let config = EngineConfig::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let back: EngineConfig = toml::from_str(&raw).unwrap();
        assert_eq!(config, back);
    }
}
