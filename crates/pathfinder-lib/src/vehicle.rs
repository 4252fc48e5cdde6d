//! Vehicle fuel model.
//!
//! Fuel economy is carried as a fixed-point decimal so that per-leg costs can
//! be summed across long multi-stop routes without floating-point drift.
//! Distances stay `f64` and are converted exactly once per leg through
//! [`miles_to_decimal`].

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::price::Price;

/// Vehicle characteristics that bound graph edges and price each leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vehicle {
    /// Miles travelled per gallon.
    pub mpg: Decimal,
    /// Distance covered on a full tank, in miles.
    pub max_range_miles: f64,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            mpg: Decimal::TEN,
            max_range_miles: 500.0,
        }
    }
}

impl Vehicle {
    pub fn new(mpg: Decimal, max_range_miles: f64) -> Result<Self> {
        let vehicle = Self {
            mpg,
            max_range_miles,
        };
        vehicle.validate()?;
        Ok(vehicle)
    }

    /// Validate fuel economy and range.
    pub fn validate(&self) -> Result<()> {
        if self.mpg <= Decimal::ZERO {
            return Err(Error::InvalidConfig {
                key: "VEHICLE_MPG".to_string(),
                message: format!("must be greater than zero, got {}", self.mpg),
            });
        }
        if !self.max_range_miles.is_finite() || self.max_range_miles <= 0.0 {
            return Err(Error::InvalidConfig {
                key: "VEHICLE_MAX_RANGE_MILES".to_string(),
                message: format!("must be a positive number, got {}", self.max_range_miles),
            });
        }
        Ok(())
    }

    /// Whether a single tank covers `distance_miles`.
    pub fn can_reach(&self, distance_miles: f64) -> bool {
        distance_miles <= self.max_range_miles
    }

    /// Gallons burned over `distance_miles`.
    pub fn gallons_for(&self, distance_miles: f64) -> Decimal {
        miles_to_decimal(distance_miles) / self.mpg
    }

    /// Cost of driving `distance_miles` on fuel bought at `price`.
    ///
    /// Fuel for a leg is paid at the departure node.
    pub fn leg_cost(&self, distance_miles: f64, price: Price) -> Decimal {
        self.gallons_for(distance_miles) * price.as_decimal()
    }
}

/// Convert a floating-point distance to the decimal domain.
pub fn miles_to_decimal(miles: f64) -> Decimal {
    Decimal::from_f64(miles).unwrap_or(Decimal::ZERO)
}
