//! The three stage models of the windshield cascade and their coefficient sets.
//!
//! Each stage is a pure function of its inputs. Coefficients are data, so the
//! two published parameterizations are expressed as [`Preset`]s rather than
//! separate code paths.

use crate::error::CascadeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Heat load as an affine function of windshield size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ThermalModel {
    pub slope: f64,
    pub offset: f64,
}

impl ThermalModel {
    pub fn heat_load(&self, windshield_size: f64) -> f64 {
        self.slope * windshield_size + self.offset
    }
}

/// Cooling system weight as an affine function of heat load.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct CoolingModel {
    pub slope: f64,
    pub offset: f64,
}

impl CoolingModel {
    pub fn system_weight(&self, heat_load: f64) -> f64 {
        self.slope * heat_load + self.offset
    }
}

/// Fuel burn from a weight penalty plus a power-law drag penalty on size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FuelModel {
    /// Fuel burned per unit of cooling system weight
    pub weight_factor: f64,
    /// Drag penalty scale
    pub drag_factor: f64,
    /// Exponent applied to windshield size in the drag term
    pub drag_exponent: f64,
}

impl FuelModel {
    /// Computes fuel burn.
    ///
    /// A negative size raised to a fractional exponent has no real value, so
    /// that combination is rejected. Integral exponents accept any sign.
    pub fn fuel_burn(&self, system_weight: f64, windshield_size: f64) -> Result<f64, CascadeError> {
        if windshield_size < 0.0 && self.drag_exponent.fract() != 0.0 {
            return Err(CascadeError::Domain {
                windshield_size,
                exponent: self.drag_exponent,
            });
        }

        let weight_penalty = self.weight_factor * system_weight;
        let drag_penalty = self.drag_factor * windshield_size.powf(self.drag_exponent);
        Ok(weight_penalty + drag_penalty)
    }
}

/// A complete coefficient set for the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coefficients {
    pub thermal: ThermalModel,
    pub cooling: CoolingModel,
    pub fuel: FuelModel,
}

impl Default for Coefficients {
    fn default() -> Self {
        Preset::Baseline.coefficients()
    }
}

/// Named coefficient sets shipped with the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// Arbitrary-unit model with a linear drag term
    #[default]
    Baseline,
    /// Area-based model (m²) with a super-linear drag term
    Refined,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Baseline, Preset::Refined];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Baseline => "baseline",
            Preset::Refined => "refined",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Baseline => "arbitrary units, linear drag",
            Preset::Refined => "area in m², drag ~ size^1.2",
        }
    }

    pub fn coefficients(self) -> Coefficients {
        match self {
            Preset::Baseline => Coefficients {
                thermal: ThermalModel { slope: 2.5, offset: 10.0 },
                cooling: CoolingModel { slope: 0.5, offset: 50.0 },
                fuel: FuelModel {
                    weight_factor: 0.8,
                    drag_factor: 1.2,
                    drag_exponent: 1.0,
                },
            },
            Preset::Refined => Coefficients {
                thermal: ThermalModel { slope: 1.1, offset: 1.5 },
                cooling: CoolingModel { slope: 22.0, offset: 30.0 },
                fuel: FuelModel {
                    weight_factor: 0.05,
                    drag_factor: 8.0,
                    drag_exponent: 1.2,
                },
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Ok(Preset::Baseline),
            "refined" => Ok(Preset::Refined),
            _ => Err(CascadeError::UnknownPreset(s.to_string())),
        }
    }
}
