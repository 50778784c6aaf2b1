//! Coercion of raw form values into model inputs.
//!
//! Form widgets hand back whatever the user left in the field: a number,
//! nothing, or text. Only genuine numbers get through. Text is rejected even
//! when it looks numeric, since the widget already parses what it accepts.
//! Range clamping is the form's job; out of range numbers pass.

use crate::position::PositionInputs;
use crate::types::Percent;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Value as delivered by a form widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawInput {
    /// Cleared field or placeholder.
    Empty,
    Number(f64),
    Text(String),
}

impl From<f64> for RawInput {
    fn from(value: f64) -> Self {
        RawInput::Number(value)
    }
}

impl From<Option<f64>> for RawInput {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawInput::Empty, RawInput::Number)
    }
}

impl From<&str> for RawInput {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            RawInput::Empty
        } else {
            RawInput::Text(value.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Capital,
    LeveragePercent,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectedInput {
    #[error("Field is empty")]
    Empty,

    #[error("Not a number: {0:?}")]
    NotNumeric(String),

    #[error("Number {0} cannot be represented")]
    Unrepresentable(f64),
}

/// Accept a raw value as a model number, or reject it.
pub fn accept_edit(raw: &RawInput) -> Result<Decimal, RejectedInput> {
    match raw {
        RawInput::Empty => Err(RejectedInput::Empty),
        RawInput::Text(text) => Err(RejectedInput::NotNumeric(text.clone())),
        // NaN and infinities land here too
        RawInput::Number(value) => {
            Decimal::from_f64(*value).ok_or(RejectedInput::Unrepresentable(*value))
        }
    }
}

impl PositionInputs {
    /// Inputs with one field replaced. On rejection the caller keeps `self`.
    pub fn apply_edit(&self, field: InputField, raw: &RawInput) -> Result<Self, RejectedInput> {
        let value = accept_edit(raw)?;
        let mut next = *self;
        match field {
            InputField::Capital => next.capital = value,
            InputField::LeveragePercent => next.leverage_percent = Percent::new(value),
        }
        Ok(next)
    }
}
