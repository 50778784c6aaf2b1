//! Leveraged position projection.
//!
//! A position is built by pledging capital, borrowing against it at ratio
//! `r`, swapping the borrowed quote back into the asset and pledging that
//! again. Collateral compounds over three re-pledge rounds while debt
//! compounds over four borrow rounds: the last borrow is paid out, not
//! re-pledged.
//!
//! Every output is recomputed from scratch on each call. Callers must not
//! patch individual fields, since they share intermediate terms.

use crate::market::MarketState;
use crate::types::Percent;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Debt over collateral multiple at which the position is liquidated.
pub const LIQUIDATION_MULTIPLE: Decimal = dec!(1.5);

/// User controlled sizing inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInputs {
    /// Principal, in asset units.
    pub capital: Decimal,
    pub leverage_percent: Percent,
}

impl PositionInputs {
    pub fn new(capital: Decimal, leverage_percent: Percent) -> Self {
        Self {
            capital,
            leverage_percent,
        }
    }
}

/// Collateral over debt, expressed as a whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollateralizationRatio {
    Finite(Decimal),
    /// No leverage applied.
    Infinite,
}

impl CollateralizationRatio {
    pub fn is_infinite(&self) -> bool {
        matches!(self, CollateralizationRatio::Infinite)
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            CollateralizationRatio::Finite(v) => Some(*v),
            CollateralizationRatio::Infinite => None,
        }
    }
}

/// Projected position figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOutputs {
    /// Total pledged, in asset units.
    pub collateral: Decimal,
    /// Total borrowed, in quote units.
    pub debt: Decimal,
    /// Asset price at which the position is liquidated. 0 when undefined.
    pub liquidation_price: Decimal,
    /// Quote left over after the extra collateral is paid for.
    pub return_value: Decimal,
    pub collateralization_ratio: CollateralizationRatio,
}

impl PositionOutputs {
    /// Outputs of a position with no leverage applied.
    pub fn unlevered() -> Self {
        Self {
            collateral: Decimal::ZERO,
            debt: Decimal::ZERO,
            liquidation_price: Decimal::ZERO,
            return_value: Decimal::ZERO,
            collateralization_ratio: CollateralizationRatio::Infinite,
        }
    }
}

/// Project a position. Never panics: extreme inputs saturate.
pub fn compute_outputs(capital: Decimal, percent: Percent, asset_price: Decimal) -> PositionOutputs {
    if !percent.is_positive() || capital <= Decimal::ZERO {
        return PositionOutputs::unlevered();
    }

    let r = percent.as_ratio();
    let r2 = r.saturating_mul(r);
    let r3 = r2.saturating_mul(r);
    let r4 = r3.saturating_mul(r);

    // 1 + r + r² + r³: own capital plus three re-pledged rounds
    let pledge_factor = Decimal::ONE
        .saturating_add(r)
        .saturating_add(r2)
        .saturating_add(r3);
    // r + r² + r³ + r⁴: four borrow rounds
    let borrow_factor = r.saturating_add(r2).saturating_add(r3).saturating_add(r4);

    let collateral = capital.saturating_mul(pledge_factor);
    let debt = capital.saturating_mul(asset_price).saturating_mul(borrow_factor);

    let extra_collateral_cost = collateral.saturating_sub(capital).saturating_mul(asset_price);
    let return_value = debt.saturating_sub(extra_collateral_cost);

    let liquidation_price = debt
        .checked_div(collateral)
        .and_then(|ratio| ratio.checked_mul(LIQUIDATION_MULTIPLE))
        .unwrap_or(Decimal::ZERO);

    // 100 / r, computed as 10_000 / percent to keep precision
    let ratio = dec!(10_000)
        .checked_div(percent.value())
        .unwrap_or(Decimal::MAX)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    PositionOutputs {
        collateral,
        debt,
        liquidation_price,
        return_value,
        collateralization_ratio: CollateralizationRatio::Finite(ratio),
    }
}

/// Project a position from the snapshot types.
pub fn compute(inputs: &PositionInputs, market: &MarketState) -> PositionOutputs {
    compute_outputs(
        inputs.capital,
        inputs.leverage_percent,
        market.asset_price.value(),
    )
}
