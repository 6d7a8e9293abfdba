//! Fuel-burn compliance thresholds.

use serde::{Deserialize, Serialize};

/// A named regulatory fuel-burn limit.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Standard {
    pub name: String,
    pub threshold: f64,
}

impl Standard {
    pub fn new(name: impl Into<String>, threshold: f64) -> Self {
        Self {
            name: name.into(),
            threshold,
        }
    }

    /// NaN never passes.
    pub fn is_satisfied_by(&self, fuel_burn: f64) -> bool {
        fuel_burn <= self.threshold
    }
}

/// Outcome of comparing one fuel burn value against one standard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceCheck {
    pub standard: String,
    pub threshold: f64,
    pub fuel_burn: f64,
    pub passed: bool,
}

pub fn default_standards() -> Vec<Standard> {
    vec![
        Standard::new("ICAO Annex 16 Vol. III (new type)", 64.4),
        Standard::new("ICAO Annex 16 Vol. III (in production)", 102.0),
        Standard::new("EASA CS-CO2", 79.1),
        Standard::new("FAA 14 CFR Part 38", 102.0),
    ]
}

/// Checks `fuel_burn` against every standard, preserving table order.
pub fn check(standards: &[Standard], fuel_burn: f64) -> Vec<ComplianceCheck> {
    standards
        .iter()
        .map(|s| ComplianceCheck {
            standard: s.name.clone(),
            threshold: s.threshold,
            fuel_burn,
            passed: s.is_satisfied_by(fuel_burn),
        })
        .collect()
}

pub fn all_passed(checks: &[ComplianceCheck]) -> bool {
    checks.iter().all(|c| c.passed)
}
