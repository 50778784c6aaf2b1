//! Property-based tests for the sizing math.
//!
//! These tests verify invariants hold under random inputs.

use loop_core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// Strategies for generating test data
fn capital_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|x| Decimal::new(x, 4)) // 0.0001 to 100
}

fn percent_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000i64).prop_map(|x| Decimal::new(x, 2)) // 0.01% to 100%
}

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|x| Decimal::new(x, 2)) // $0.01 to $10,000
}

fn liquidity_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|x| Decimal::new(x, 4)) // 0 to 10,000
}

proptest! {
    /// Collateral follows the three-round pledge formula
    #[test]
    fn collateral_formula(
        capital in capital_strategy(),
        percent in percent_strategy(),
    ) {
        let out = compute_outputs(capital, Percent::new(percent), dec!(100));
        let r = percent / dec!(100);
        let expected = capital * (Decimal::ONE + r + r * r + r * r * r);
        prop_assert_eq!(out.collateral, expected);
    }

    /// Debt follows the four-round borrow formula
    #[test]
    fn debt_formula(
        capital in capital_strategy(),
        percent in percent_strategy(),
        price in price_strategy(),
    ) {
        let out = compute_outputs(capital, Percent::new(percent), price);
        let r = percent / dec!(100);
        let expected = capital * price * (r + r * r + r * r * r + r * r * r * r);
        prop_assert_eq!(out.debt, expected);
    }

    /// More leverage always means more collateral
    #[test]
    fn collateral_increases_with_percent(
        capital in capital_strategy(),
        low in 1i64..5_000i64,
        step in 1i64..5_000i64,
    ) {
        let a = compute_outputs(capital, Percent::new(Decimal::new(low, 2)), dec!(100));
        let b = compute_outputs(capital, Percent::new(Decimal::new(low + step, 2)), dec!(100));
        prop_assert!(b.collateral > a.collateral);
    }

    /// Ratio strictly decreases as whole-percent leverage grows
    #[test]
    fn ratio_decreases_with_percent(
        low in 1i64..50i64,
        step in 1i64..50i64,
    ) {
        let a = compute_outputs(dec!(1), Percent::new(Decimal::from(low)), dec!(100));
        let b = compute_outputs(dec!(1), Percent::new(Decimal::from(low + step)), dec!(100));

        let ra = a.collateralization_ratio.value().unwrap();
        let rb = b.collateralization_ratio.value().unwrap();
        prop_assert!(rb < ra, "ratio {} at {}% should be below {} at {}%", rb, low + step, ra, low);
    }

    /// Liquidation price is 1.5x debt over collateral
    #[test]
    fn liquidation_formula(
        capital in capital_strategy(),
        percent in percent_strategy(),
        price in price_strategy(),
    ) {
        let out = compute_outputs(capital, Percent::new(percent), price);
        prop_assert!(out.collateral > Decimal::ZERO);

        let expected = out.debt / out.collateral * dec!(1.5);
        prop_assert_eq!(out.liquidation_price, expected);
    }

    /// Non-positive percent never levers
    #[test]
    fn unlevered_at_or_below_zero(
        capital in capital_strategy(),
        percent in -10_000i64..=0i64,
        price in price_strategy(),
    ) {
        let out = compute_outputs(capital, Percent::new(Decimal::new(percent, 2)), price);
        prop_assert_eq!(out, PositionOutputs::unlevered());
    }

    /// Same inputs, same outputs
    #[test]
    fn projection_is_idempotent(
        capital in capital_strategy(),
        percent in percent_strategy(),
        price in price_strategy(),
    ) {
        let first = compute_outputs(capital, Percent::new(percent), price);
        let second = compute_outputs(capital, Percent::new(percent), price);
        prop_assert_eq!(first, second);
    }

    /// Label flips exactly above 50%
    #[test]
    fn danger_iff_above_half(percent in 0i64..=10_000i64) {
        let p = Decimal::new(percent, 2);
        let label = classify(Percent::new(p));
        prop_assert_eq!(label.is_danger(), p > dec!(50));
    }

    /// A max capital position at max leverage never draws past the reserve
    #[test]
    fn ceiling_respects_liquidity_reserve(
        liquidity in liquidity_strategy(),
        max_percent in 1i64..=100i64,
    ) {
        let max = Percent::new(Decimal::from(max_percent));
        let ceiling = max_capital(liquidity, max).unwrap();

        let r = max.as_ratio();
        let draw = ceiling * (r + r * r + r * r * r);
        // round2 can push the ceiling up by half a cent
        let slack = dec!(0.01) * (r + r * r + r * r * r);
        prop_assert!(draw <= liquidity * LIQUIDITY_USAGE + slack);
    }

    /// Default capital never exceeds the ceiling
    #[test]
    fn default_capital_clamped(liquidity in liquidity_strategy()) {
        let bounds = resolve_bounds(liquidity, &SizingPolicy::default()).unwrap();
        prop_assert!(bounds.default_capital <= bounds.max_capital);
        prop_assert!(bounds.default_capital <= dec!(0.1));
    }

    /// Out of range numbers still produce finite, non-panicking outputs
    #[test]
    fn projection_is_total(
        capital in 0i64..i64::MAX,
        percent in -1_000_000i64..1_000_000i64,
        price in 0i64..i64::MAX,
    ) {
        let out = compute_outputs(
            Decimal::from(capital),
            Percent::new(Decimal::from(percent)),
            Decimal::from(price),
        );
        prop_assert_eq!(out.collateralization_ratio.is_infinite(), percent <= 0 || capital == 0);
    }
}

#[test]
fn half_leverage_scenario() {
    let percent = Percent::new(dec!(50));
    let out = compute_outputs(dec!(0.1), percent, dec!(200));

    assert_eq!(out.collateral, dec!(0.1875));
    assert_eq!(out.debt, dec!(18.75));
    assert_eq!(out.return_value, dec!(1.25));
    assert_eq!(out.liquidation_price, dec!(150));
    assert_eq!(out.collateralization_ratio, CollateralizationRatio::Finite(dec!(200)));
    // danger starts strictly above 50
    assert_eq!(classify(percent), RiskLabel::Safe);
    assert_eq!(classify(Percent::new(dec!(51))), RiskLabel::Danger);
}

#[test]
fn zero_leverage_scenario() {
    let out = compute_outputs(dec!(1), Percent::zero(), dec!(200));

    assert_eq!(out.collateral, Decimal::ZERO);
    assert_eq!(out.debt, Decimal::ZERO);
    assert_eq!(out.return_value, Decimal::ZERO);
    assert_eq!(out.liquidation_price, Decimal::ZERO);
    assert_eq!(out.collateralization_ratio, CollateralizationRatio::Infinite);
}

#[test]
fn zero_max_percent_is_configuration_error() {
    assert_eq!(max_capital(dec!(100), Percent::zero()), Err(ConfigError::ZeroMaxPercent));
}
