use crate::error::AtsError;
use crate::utils::odds::american_odds_to_payout;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Standard juice on a spread bet
pub const STANDARD_JUICE_ODDS: i32 = -110;

/// Absorbs half-point spread variants when testing for a push
pub const DEFAULT_PUSH_THRESHOLD: f64 = 0.5;

pub const DEFAULT_FLAT_STAKE: f64 = 100.0;

/// Providers tried in order before falling back to the first line posted
pub const DEFAULT_PROVIDER_PRIORITY: [&str; 4] = ["ESPN Bet", "DraftKings", "Bovada", "consensus"];

/// Spread-size tier boundaries, compared against the absolute spread
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadTiers {
    /// Spreads up to and including this are small
    pub small_max: f64,
    /// Spreads above `small_max` up to and including this are medium
    pub medium_max: f64,
}

impl Default for SpreadTiers {
    fn default() -> Self {
        Self {
            small_max: 7.0,
            medium_max: 14.0,
        }
    }
}

/// Tunable parameters for ATS classification and aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub push_threshold: f64,
    pub stake: f64,
    pub juice_odds: i32,
    pub spread_tiers: SpreadTiers,
    pub provider_priority: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            push_threshold: DEFAULT_PUSH_THRESHOLD,
            stake: DEFAULT_FLAT_STAKE,
            juice_odds: STANDARD_JUICE_ODDS,
            spread_tiers: SpreadTiers::default(),
            provider_priority: DEFAULT_PROVIDER_PRIORITY
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), AtsError> {
        if !self.push_threshold.is_finite() || self.push_threshold < 0.0 {
            return Err(AtsError::InvalidConfig(format!(
                "push_threshold must be a non-negative number, got {}",
                self.push_threshold
            )));
        }
        if !self.stake.is_finite() || self.stake <= 0.0 {
            return Err(AtsError::InvalidConfig(format!(
                "stake must be positive, got {}",
                self.stake
            )));
        }
        if self.juice_odds > -100 && self.juice_odds < 100 {
            return Err(AtsError::InvalidConfig(format!(
                "juice_odds must be American odds (<= -100 or >= 100), got {}",
                self.juice_odds
            )));
        }
        let tiers = self.spread_tiers;
        if !tiers.small_max.is_finite()
            || !tiers.medium_max.is_finite()
            || tiers.small_max < 0.0
            || tiers.small_max > tiers.medium_max
        {
            return Err(AtsError::InvalidConfig(format!(
                "spread tiers must satisfy 0 <= small_max <= medium_max, got {} / {}",
                tiers.small_max, tiers.medium_max
            )));
        }
        Ok(())
    }

    /// Profit on a winning flat stake at `juice_odds` (90.91 at -110 on 100)
    pub fn win_payout(&self) -> f64 {
        self.stake * american_odds_to_payout(self.juice_odds)
    }
}

/// API credentials, loaded from the environment (a `.env` file is honored)
#[derive(Debug, Clone)]
pub struct Credentials {
    pub cfbd_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self {
            cfbd_api_key: std::env::var("CFBD_API_KEY").ok(),
        }
    }

    pub fn cfbd(&self) -> Result<&str> {
        self.cfbd_api_key
            .as_deref()
            .context("CFBD_API_KEY not set in environment or .env file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.provider_priority[0], "ESPN Bet");
        assert_relative_eq!(cfg.win_payout(), 90.909090909, epsilon = 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = EngineConfig {
            push_threshold: -0.1,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(AtsError::InvalidConfig(_))));

        let cfg = EngineConfig {
            juice_odds: 50,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = EngineConfig {
            spread_tiers: SpreadTiers {
                small_max: 15.0,
                medium_max: 14.0,
            },
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = EngineConfig {
            stake: 0.0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"push_threshold": 0.0}"#).unwrap();
        assert_eq!(cfg.push_threshold, 0.0);
        assert_eq!(cfg.juice_odds, STANDARD_JUICE_ODDS);
        assert_eq!(cfg.spread_tiers, SpreadTiers::default());
    }
}
