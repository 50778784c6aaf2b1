// 7.0 config.rs: sizing policy in one place. percent range, default inputs, capital floor.
// 7.1 only the capital ceiling is market derived (see bounds.rs); everything here is fixed policy.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Percent;

/// Fixed policy for the leverage form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingPolicy {
    // Smallest capital the form accepts (asset units)
    pub min_capital: Decimal,
    // Capital pre-filled at session start, clamped to the liquidity ceiling
    pub default_capital: Decimal,
    // Lowest selectable leverage percent
    pub min_percent: Percent,
    // Highest selectable leverage percent. also sizes the capital ceiling
    pub max_percent: Percent,
    // Leverage percent pre-filled at session start
    pub default_percent: Percent,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            min_capital: dec!(0.01),
            default_capital: dec!(0.1),
            min_percent: Percent::new(dec!(10)),
            max_percent: Percent::new(dec!(60)),
            default_percent: Percent::new(dec!(50)),
        }
    }
}

impl SizingPolicy {
    // Tighter range that never leaves the safe band
    pub fn conservative() -> Self {
        Self {
            max_percent: Percent::new(dec!(50)),
            default_percent: Percent::new(dec!(30)),
            ..Self::default()
        }
    }

    // Validate the policy for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_percent.value().is_zero() {
            return Err(ConfigError::ZeroMaxPercent);
        }

        if self.max_percent.value() < Decimal::ZERO || self.min_percent.value() < Decimal::ZERO {
            return Err(ConfigError::InvalidPercentRange {
                reason: "Percent bounds must not be negative".to_string(),
            });
        }

        if self.max_percent.value() > dec!(100) {
            return Err(ConfigError::InvalidPercentRange {
                reason: "Max percent must not exceed 100".to_string(),
            });
        }

        if self.min_percent > self.max_percent {
            return Err(ConfigError::InvalidPercentRange {
                reason: "Min percent must not exceed max percent".to_string(),
            });
        }

        if self.default_percent < self.min_percent || self.default_percent > self.max_percent {
            return Err(ConfigError::InvalidPercentRange {
                reason: "Default percent must lie within the percent range".to_string(),
            });
        }

        if self.min_capital < Decimal::ZERO {
            return Err(ConfigError::InvalidCapital {
                reason: "Min capital must not be negative".to_string(),
            });
        }

        if self.default_capital < self.min_capital {
            return Err(ConfigError::InvalidCapital {
                reason: "Default capital must be at least min capital".to_string(),
            });
        }

        Ok(())
    }
}

/// Session level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub policy: SizingPolicy,
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            policy: SizingPolicy::default(),
            max_events: 10_000,
        }
    }
}

// Policy validation errors. any of these is fatal to the session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Max leverage percent is zero, capital ceiling is undefined")]
    ZeroMaxPercent,

    #[error("Invalid percent range: {reason}")]
    InvalidPercentRange { reason: String },

    #[error("Invalid capital policy: {reason}")]
    InvalidCapital { reason: String },
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Conservative,
}

impl Environment {
    pub fn config(&self) -> SessionConfig {
        match self {
            Environment::Development => SessionConfig::default(),
            Environment::Conservative => SessionConfig {
                policy: SizingPolicy::conservative(),
                ..SessionConfig::default()
            },
        }
    }
}
