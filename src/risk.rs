//! Position risk labelling.
//!
//! The label depends on the leverage percent alone. Anything above half of
//! each pledge being re-borrowed is flagged, regardless of price or size.

use crate::types::Percent;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Leverage percents strictly above this are dangerous.
pub const DANGER_THRESHOLD: Decimal = dec!(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    Safe,
    Danger,
}

impl RiskLabel {
    pub fn is_danger(&self) -> bool {
        matches!(self, RiskLabel::Danger)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Safe => "safe",
            RiskLabel::Danger => "danger",
        }
    }
}

pub fn classify(percent: Percent) -> RiskLabel {
    if percent.value() > DANGER_THRESHOLD {
        RiskLabel::Danger
    } else {
        RiskLabel::Safe
    }
}
