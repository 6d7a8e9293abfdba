//! Parametric sweeps over windshield size.

use crate::cascade::{Cascade, CascadeResult};
use crate::error::CascadeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated, inclusive, linearly spaced range of windshield sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRange {
    min: f64,
    max: f64,
    num_points: usize,
}

impl SweepRange {
    /// # Errors
    ///
    /// Returns [`CascadeError::InvalidRange`] unless both bounds are finite,
    /// `max > min` and `num_points >= 2`.
    pub fn new(min: f64, max: f64, num_points: usize) -> Result<Self, CascadeError> {
        if !min.is_finite() || !max.is_finite() || !(max > min) || num_points < 2 {
            return Err(CascadeError::InvalidRange { min, max, num_points });
        }
        Ok(Self { min, max, num_points })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn step(&self) -> f64 {
        let n = (self.num_points - 1) as f64;
        self.max / n - self.min / n
    }

    /// Sample `i` of the range. The last sample is pinned to `max`.
    ///
    /// Interpolates as a weighted mean of the bounds, so the span `max - min`
    /// is never formed and cannot overflow.
    pub fn sample(&self, i: usize) -> f64 {
        if i == 0 {
            return self.min;
        }
        if i + 1 >= self.num_points {
            return self.max;
        }
        let t = i as f64 / (self.num_points - 1) as f64;
        self.min * (1.0 - t) + self.max * t
    }

    /// All samples in ascending order.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.num_points).map(move |i| self.sample(i))
    }
}

impl fmt::Display for SweepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]×{}", self.min, self.max, self.num_points)
    }
}

/// One of the four quantities in a [`CascadeResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    WindshieldSize,
    HeatLoad,
    SystemWeight,
    FuelBurn,
}

impl Column {
    pub const ALL: [Column; 4] = [
        Column::WindshieldSize,
        Column::HeatLoad,
        Column::SystemWeight,
        Column::FuelBurn,
    ];

    /// Field name as used in CSV headers and JSON keys.
    pub fn key(self) -> &'static str {
        match self {
            Column::WindshieldSize => "windshield_size",
            Column::HeatLoad => "heat_load",
            Column::SystemWeight => "system_weight",
            Column::FuelBurn => "fuel_burn",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Column::WindshieldSize => "Windshield Size",
            Column::HeatLoad => "Heat Load",
            Column::SystemWeight => "System Weight",
            Column::FuelBurn => "Fuel Burn",
        }
    }

    pub fn get(self, result: &CascadeResult) -> f64 {
        match self {
            Column::WindshieldSize => result.windshield_size,
            Column::HeatLoad => result.heat_load,
            Column::SystemWeight => result.system_weight,
            Column::FuelBurn => result.fuel_burn,
        }
    }
}

/// Sweep results in ascending sample order.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SweepTable {
    rows: Vec<CascadeResult>,
}

impl SweepTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CascadeResult] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CascadeResult> {
        self.rows.iter()
    }

    pub fn first(&self) -> Option<&CascadeResult> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&CascadeResult> {
        self.rows.last()
    }

    /// Extracts one quantity as a series, in row order.
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.rows.iter().map(|r| column.get(r)).collect()
    }

    /// Row with the lowest fuel burn. NaN rows are never selected.
    pub fn min_fuel_burn(&self) -> Option<&CascadeResult> {
        self.rows
            .iter()
            .filter(|r| !r.fuel_burn.is_nan())
            .min_by(|a, b| a.fuel_burn.total_cmp(&b.fuel_burn))
    }
}

impl<'a> IntoIterator for &'a SweepTable {
    type Item = &'a CascadeResult;
    type IntoIter = std::slice::Iter<'a, CascadeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl Cascade {
    /// Evaluates the cascade once per sample of `range`, in ascending order.
    ///
    /// # Errors
    ///
    /// Stops at the first sample the fuel model rejects and returns that error.
    pub fn sweep(&self, range: &SweepRange) -> Result<SweepTable, CascadeError> {
        let rows = range
            .samples()
            .map(|size| self.evaluate(size))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SweepTable { rows })
    }

    /// Validates the bounds and sweeps in one call.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::InvalidRange`] for a bad range, or the first
    /// evaluation error.
    pub fn sweep_between(
        &self,
        min: f64,
        max: f64,
        num_points: usize,
    ) -> Result<SweepTable, CascadeError> {
        let range = SweepRange::new(min, max, num_points)?;
        self.sweep(&range)
    }
}
