// 12.0: market snapshot. fetched as a whole, replaced as a whole, never patched in place.

use crate::types::{Price, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Asset price and facility liquidity as seen at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    /// Quote units per unit of asset.
    pub asset_price: Price,
    /// Funds the leverage facility holds, in asset units.
    pub counterparty_liquidity: Decimal,
    pub fetched_at: Timestamp,
}

impl MarketState {
    pub fn new(asset_price: Price, counterparty_liquidity: Decimal, fetched_at: Timestamp) -> Self {
        Self {
            asset_price,
            counterparty_liquidity,
            fetched_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn snapshot_keeps_fetched_figures() {
        let market = MarketState::new(
            Price::new_unchecked(dec!(200)),
            dec!(100),
            Timestamp::from_millis(5),
        );
        assert_eq!(market.asset_price.value(), dec!(200));
        assert_eq!(market.counterparty_liquidity, dec!(100));
        assert_eq!(market.fetched_at, Timestamp::from_millis(5));
    }
}
