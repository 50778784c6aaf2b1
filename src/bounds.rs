//! Input bounds derived from facility liquidity.
//!
//! The percent range is fixed policy. The capital ceiling is sized so that a
//! position at the maximum percent draws at most 90% of the facility's
//! liquidity across its compounding stages. It reuses the compounding factor
//! from the position calculator, so the two must stay in step.

use crate::config::{ConfigError, SizingPolicy};
use crate::position::PositionInputs;
use crate::types::Percent;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Share of counterparty liquidity a max-leverage position may draw.
pub const LIQUIDITY_USAGE: Decimal = dec!(0.9);

/// Valid ranges for the two user inputs under one market snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_capital: Decimal,
    pub max_capital: Decimal,
    pub min_percent: Percent,
    pub max_percent: Percent,
    /// Policy default capital, clamped to `max_capital`.
    pub default_capital: Decimal,
    pub default_percent: Percent,
}

impl Bounds {
    /// Inputs the form starts from.
    pub fn default_inputs(&self) -> PositionInputs {
        PositionInputs::new(self.default_capital, self.default_percent)
    }

    pub fn contains(&self, inputs: &PositionInputs) -> bool {
        inputs.capital >= self.min_capital
            && inputs.capital <= self.max_capital
            && inputs.leverage_percent >= self.min_percent
            && inputs.leverage_percent <= self.max_percent
    }
}

/// Largest capital whose max-leverage collateral draw stays within the reserve.
///
/// `round2(liquidity * 0.9 / (r + r² + r³))` with `r = max_percent / 100`.
pub fn max_capital(liquidity: Decimal, max_percent: Percent) -> Result<Decimal, ConfigError> {
    if max_percent.value().is_zero() {
        return Err(ConfigError::ZeroMaxPercent);
    }
    if max_percent.value() < Decimal::ZERO {
        return Err(ConfigError::InvalidPercentRange {
            reason: "Max percent must be positive".to_string(),
        });
    }

    let factor = draw_factor(max_percent.as_ratio()).ok_or_else(|| {
        ConfigError::InvalidPercentRange {
            reason: format!("Max percent {max_percent} is too large"),
        }
    })?;
    // a percent below decimal precision rounds the factor away entirely
    if factor.is_zero() {
        return Err(ConfigError::ZeroMaxPercent);
    }

    let usable = liquidity.max(Decimal::ZERO) * LIQUIDITY_USAGE;
    let ceiling = usable.checked_div(factor).unwrap_or(Decimal::MAX);
    Ok(ceiling.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// `r + r² + r³`, or None if it does not fit in a Decimal.
fn draw_factor(r: Decimal) -> Option<Decimal> {
    let r2 = r.checked_mul(r)?;
    let r3 = r2.checked_mul(r)?;
    r.checked_add(r2)?.checked_add(r3)
}

/// Resolve bounds and defaults for the given liquidity.
pub fn resolve_bounds(liquidity: Decimal, policy: &SizingPolicy) -> Result<Bounds, ConfigError> {
    let max_capital = max_capital(liquidity, policy.max_percent)?;

    Ok(Bounds {
        min_capital: policy.min_capital,
        max_capital,
        min_percent: policy.min_percent,
        max_percent: policy.max_percent,
        default_capital: policy.default_capital.min(max_capital),
        default_percent: policy.default_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_at_sixty_percent() {
        // 0.6 + 0.36 + 0.216 = 1.176; 100 * 0.9 / 1.176 = 76.530...
        let ceiling = max_capital(dec!(100), Percent::new(dec!(60))).unwrap();
        assert_eq!(ceiling, dec!(76.53));
    }

    #[test]
    fn ceiling_at_fifty_percent() {
        // 0.5 + 0.25 + 0.125 = 0.875; 7 * 0.9 / 0.875 = 7.2
        let ceiling = max_capital(dec!(7), Percent::new(dec!(50))).unwrap();
        assert_eq!(ceiling, dec!(7.2));
    }

    #[test]
    fn zero_max_percent_is_config_error() {
        let result = max_capital(dec!(100), Percent::zero());
        assert_eq!(result, Err(ConfigError::ZeroMaxPercent));
    }

    #[test]
    fn negative_max_percent_is_config_error() {
        let result = max_capital(dec!(100), Percent::new(dec!(-10)));
        assert!(matches!(result, Err(ConfigError::InvalidPercentRange { .. })));
    }

    #[test]
    fn oversized_max_percent_is_config_error() {
        // r = 1e10, r³ does not fit
        let result = max_capital(dec!(100), Percent::new(dec!(1_000_000_000_000)));
        assert!(matches!(result, Err(ConfigError::InvalidPercentRange { .. })));
    }

    #[test]
    fn vanishing_max_percent_is_config_error() {
        // 1e-28 / 100 rounds to zero at 28 decimal places
        let result = max_capital(dec!(100), Percent::new(Decimal::new(1, 28)));
        assert_eq!(result, Err(ConfigError::ZeroMaxPercent));
    }

    #[test]
    fn tiny_max_percent_saturates_ceiling() {
        let result = max_capital(Decimal::MAX, Percent::new(Decimal::new(1, 20))).unwrap();
        assert_eq!(result, Decimal::MAX);
    }

    #[test]
    fn empty_facility_has_zero_ceiling() {
        let bounds = resolve_bounds(Decimal::ZERO, &SizingPolicy::default()).unwrap();
        assert_eq!(bounds.max_capital, Decimal::ZERO);
        assert_eq!(bounds.default_capital, Decimal::ZERO);
    }

    #[test]
    fn default_capital_clamped_to_ceiling() {
        // ceiling: 0.1 * 0.9 / 1.176 = 0.0765... → 0.08
        let bounds = resolve_bounds(dec!(0.1), &SizingPolicy::default()).unwrap();
        assert_eq!(bounds.max_capital, dec!(0.08));
        assert_eq!(bounds.default_capital, dec!(0.08));
    }

    #[test]
    fn default_capital_kept_when_liquid() {
        let bounds = resolve_bounds(dec!(1000), &SizingPolicy::default()).unwrap();
        assert_eq!(bounds.default_capital, dec!(0.1));
        assert_eq!(bounds.min_percent.value(), dec!(10));
        assert_eq!(bounds.max_percent.value(), dec!(60));
        assert_eq!(bounds.default_inputs().leverage_percent.value(), dec!(50));
    }

    #[test]
    fn contains_checks_both_ranges() {
        let bounds = resolve_bounds(dec!(1000), &SizingPolicy::default()).unwrap();

        let inside = PositionInputs::new(dec!(1), Percent::new(dec!(40)));
        assert!(bounds.contains(&inside));

        let too_levered = PositionInputs::new(dec!(1), Percent::new(dec!(61)));
        assert!(!bounds.contains(&too_levered));

        let too_small = PositionInputs::new(dec!(0.001), Percent::new(dec!(40)));
        assert!(!bounds.contains(&too_small));
    }
}
