use crate::error::SourceError;
use bigdecimal::{BigDecimal, RoundingMode};
use chain_util::SUBUNITS_PER_COIN;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::num::NonZeroU64;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rounding {
    Down,
    Up,
    Floor,
    Ceiling,
    HalfUp,
    HalfDown,
    HalfEven,
}

impl From<Rounding> for RoundingMode {
    fn from(rounding: Rounding) -> Self {
        match rounding {
            Rounding::Down => RoundingMode::Down,
            Rounding::Up => RoundingMode::Up,
            Rounding::Floor => RoundingMode::Floor,
            Rounding::Ceiling => RoundingMode::Ceiling,
            Rounding::HalfUp => RoundingMode::HalfUp,
            Rounding::HalfDown => RoundingMode::HalfDown,
            Rounding::HalfEven => RoundingMode::HalfEven,
        }
    }
}

// Significant digits kept by the subunit division
pub const DEFAULT_PRECISION: NonZeroU64 = NonZeroU64::new(28).unwrap();

fn default_precision() -> NonZeroU64 {
    DEFAULT_PRECISION
}

fn default_rounding() -> Rounding {
    Rounding::Down
}

/// Precision and rounding of the subunit to coin division. Passed to each
/// call explicitly, there is no process wide decimal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalContext {
    #[serde(default = "default_precision")]
    pub precision: NonZeroU64,

    #[serde(default = "default_rounding")]
    pub rounding: Rounding,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            rounding: default_rounding(),
        }
    }
}

impl DecimalContext {
    pub fn new(precision: NonZeroU64, rounding: Rounding) -> Self {
        Self {
            precision,
            rounding,
        }
    }

    /// Converts an amount of subunits (1e8 per coin) to whole coins.
    pub fn coins_from_subunits(&self, raw: &RawValue) -> Result<BigDecimal, SourceError> {
        let subunits = parse_decimal(raw)?;
        let coins = subunits / BigDecimal::from(SUBUNITS_PER_COIN);
        Ok(coins
            .with_precision_round(self.precision, self.rounding.into())
            .normalized())
    }

    /// Takes an amount already denominated in whole coins. Kept exactly as
    /// reported, only trailing zeros are dropped.
    pub fn coins_from_decimal(&self, raw: &RawValue) -> Result<BigDecimal, SourceError> {
        Ok(parse_decimal(raw)?.normalized())
    }
}

// Reads the literal JSON text of a number (or a numeric string), so the amount
// never passes through a binary float.
fn parse_decimal(raw: &RawValue) -> Result<BigDecimal, SourceError> {
    let text = raw.get().trim();
    let text = if text.starts_with('"') {
        serde_json::from_str::<String>(text)?
    } else {
        text.to_string()
    };

    let value = BigDecimal::from_str(text.trim()).map_err(|e| {
        SourceError::protocol(format!("Invalid decimal amount {}: {}", text, e))
    })?;

    if value < BigDecimal::from(0) {
        return Err(SourceError::protocol(format!(
            "Negative amount {} is not a valid output value",
            text
        )));
    }

    Ok(value)
}
