//! Forward evaluation of the thermal → cooling → fuel cascade.

use crate::error::CascadeError;
use crate::models::{Coefficients, Preset};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One evaluation of the cascade.
///
/// Every field is derived from `windshield_size` in the same pass, so
/// `fuel_burn` always matches the `system_weight` stored beside it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct CascadeResult {
    pub windshield_size: f64,
    pub heat_load: f64,
    pub system_weight: f64,
    pub fuel_burn: f64,
}

impl CascadeResult {
    /// Values in cascade order: size, heat load, weight, fuel burn.
    pub fn values(&self) -> [f64; 4] {
        [
            self.windshield_size,
            self.heat_load,
            self.system_weight,
            self.fuel_burn,
        ]
    }
}

/// The evaluator. Holds only coefficients; evaluation never mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cascade {
    coefficients: Coefficients,
}

impl Cascade {
    pub fn new(coefficients: Coefficients) -> Self {
        Self { coefficients }
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self::new(preset.coefficients())
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// Evaluates the three stages in dependency order.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::Domain`] when the fuel model cannot raise a
    /// negative size to its fractional drag exponent.
    pub fn evaluate(&self, windshield_size: f64) -> Result<CascadeResult, CascadeError> {
        let Coefficients { thermal, cooling, fuel } = &self.coefficients;

        let heat_load = thermal.heat_load(windshield_size);
        let system_weight = cooling.system_weight(heat_load);
        let fuel_burn = fuel.fuel_burn(system_weight, windshield_size)?;

        trace!(windshield_size, heat_load, system_weight, fuel_burn, "cascade evaluated");

        Ok(CascadeResult {
            windshield_size,
            heat_load,
            system_weight,
            fuel_burn,
        })
    }
}
