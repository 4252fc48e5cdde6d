//! Fixed-point fuel prices.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of fractional digits carried by every [`Price`].
pub const PRICE_SCALE: u32 = 3;

/// Largest representable price: six digits, three of them fractional.
pub const MAX_PRICE: Decimal = Decimal::from_parts(999_999, 0, 0, false, PRICE_SCALE);

/// Unit fuel price in currency per gallon, quantized to three decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(Decimal);

impl Price {
    /// Baseline used for virtual route endpoints when no station is nearby.
    pub fn fallback() -> Self {
        Self(Decimal::new(3500, PRICE_SCALE))
    }

    /// Quantize `value` to three places (round half to even), rejecting
    /// negatives and anything above [`MAX_PRICE`].
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::InvalidPrice {
                input: value.to_string(),
                message: "price must not be negative".to_string(),
            });
        }
        let mut quantized =
            value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointNearestEven);
        if quantized > MAX_PRICE {
            return Err(Error::InvalidPrice {
                input: value.to_string(),
                message: format!("price must not exceed {MAX_PRICE}"),
            });
        }
        quantized.rescale(PRICE_SCALE);
        Ok(Self(quantized.abs()))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = Decimal::from_str(s.trim()).map_err(|err| Error::InvalidPrice {
            input: s.to_string(),
            message: err.to_string(),
        })?;
        Price::new(value).map_err(|err| match err {
            Error::InvalidPrice { message, .. } => Error::InvalidPrice {
                input: s.to_string(),
                message,
            },
            other => other,
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Price {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.to_string()
    }
}
