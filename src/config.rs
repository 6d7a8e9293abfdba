use crate::cascade::Cascade;
use crate::compliance::{default_standards, Standard};
use crate::models::{Coefficients, CoolingModel, FuelModel, Preset, ThermalModel};
use crate::sweep::SweepRange;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const PROGRAM: &str = "aerocascade";

// Dashboard input limits for the sweep form
pub const SWEEP_MIN_LOWER: f64 = 0.1;
pub const SWEEP_MIN_UPPER: f64 = 5.0;
pub const SWEEP_MAX_UPPER: f64 = 15.0;
pub const SWEEP_MIN_GAP: f64 = 0.1;
pub const SWEEP_POINTS_MIN: usize = 5;
pub const SWEEP_POINTS_MAX: usize = 50;

// Slack, in slider steps, for decimal inputs like 3.6 that are not exact in binary
const GRID_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Root {
    #[serde(default)]
    pub project: Project,
    #[serde(default)]
    pub coefficients: CoefficientConfig,
    #[serde(default)]
    pub design: Design,
    #[serde(default)]
    pub sweep: Sweep,
    /// Fuel-burn standards; the built-in table is used when absent
    #[serde(default)]
    pub compliance: Option<Vec<Standard>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Project {
    pub program: String,
    #[serde(default = "default_study")]
    pub study: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_study() -> String {
    "windshield-sizing".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for Project {
    fn default() -> Self {
        Self {
            program: PROGRAM.to_string(),
            study: default_study(),
            version: default_version(),
        }
    }
}

/// Coefficient selection: a named preset, optionally overridden per stage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CoefficientConfig {
    /// "baseline" or "refined" (default: baseline)
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub thermal: Option<ThermalModel>,
    #[serde(default)]
    pub cooling: Option<CoolingModel>,
    #[serde(default)]
    pub fuel: Option<FuelModel>,
}

impl CoefficientConfig {
    pub fn preset(&self) -> Result<Preset> {
        match &self.preset {
            Some(name) => Ok(name.parse()?),
            None => Ok(Preset::default()),
        }
    }

    /// Preset coefficients with any explicit stage tables applied on top.
    pub fn resolve(&self) -> Result<Coefficients> {
        let mut coefficients = self.preset()?.coefficients();
        if let Some(thermal) = self.thermal {
            coefficients.thermal = thermal;
        }
        if let Some(cooling) = self.cooling {
            coefficients.cooling = cooling;
        }
        if let Some(fuel) = self.fuel {
            coefficients.fuel = fuel;
        }
        Ok(coefficients)
    }

    pub fn is_customized(&self) -> bool {
        self.thermal.is_some() || self.cooling.is_some() || self.fuel.is_some()
    }
}

/// Single-point design input and its slider bounds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Design {
    #[serde(default = "default_windshield_size")]
    pub windshield_size: f64,
    #[serde(default = "default_design_min")]
    pub min: f64,
    #[serde(default = "default_design_max")]
    pub max: f64,
    #[serde(default = "default_design_step")]
    pub step: f64,
}

fn default_windshield_size() -> f64 { 3.0 }
fn default_design_min() -> f64 { 0.5 }
fn default_design_max() -> f64 { 10.0 }
fn default_design_step() -> f64 { 0.1 }

impl Default for Design {
    fn default() -> Self {
        Self {
            windshield_size: default_windshield_size(),
            min: default_design_min(),
            max: default_design_max(),
            step: default_design_step(),
        }
    }
}

impl Design {
    pub fn contains(&self, windshield_size: f64) -> bool {
        (self.min..=self.max).contains(&windshield_size)
    }

    /// True when `windshield_size` lies on the slider grid `min + k * step`.
    pub fn on_grid(&self, windshield_size: f64) -> bool {
        let steps = (windshield_size - self.min) / self.step;
        (steps - steps.round()).abs() < GRID_TOLERANCE
    }

    /// Input policy shared by every single-point entry point.
    pub fn check(&self, windshield_size: f64) -> Result<()> {
        if !self.contains(windshield_size) {
            bail!("windshield size must be in [{}, {}]", self.min, self.max);
        }
        if !self.on_grid(windshield_size) {
            bail!(
                "windshield size must be a multiple of {} from {}",
                self.step,
                self.min
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Sweep {
    #[serde(default = "default_sweep_min")]
    pub min: f64,
    #[serde(default = "default_sweep_max")]
    pub max: f64,
    #[serde(default = "default_num_points")]
    pub num_points: usize,
}

fn default_sweep_min() -> f64 { 0.5 }
fn default_sweep_max() -> f64 { 10.0 }
fn default_num_points() -> usize { 20 }

impl Default for Sweep {
    fn default() -> Self {
        Self {
            min: default_sweep_min(),
            max: default_sweep_max(),
            num_points: default_num_points(),
        }
    }
}

impl Sweep {
    pub fn validate(&self) -> Result<()> {
        if !(SWEEP_MIN_LOWER..=SWEEP_MIN_UPPER).contains(&self.min) {
            bail!("sweep.min must be in [{}, {}]", SWEEP_MIN_LOWER, SWEEP_MIN_UPPER);
        }
        if !(self.min + SWEEP_MIN_GAP..=SWEEP_MAX_UPPER).contains(&self.max) {
            bail!(
                "sweep.max must be in [sweep.min + {}, {}] (sweep.min = {})",
                SWEEP_MIN_GAP,
                SWEEP_MAX_UPPER,
                self.min
            );
        }
        if !(SWEEP_POINTS_MIN..=SWEEP_POINTS_MAX).contains(&self.num_points) {
            bail!("sweep.num_points must be in [{}, {}]", SWEEP_POINTS_MIN, SWEEP_POINTS_MAX);
        }
        Ok(())
    }

    pub fn range(&self) -> Result<SweepRange> {
        Ok(SweepRange::new(self.min, self.max, self.num_points)?)
    }
}

impl Root {
    /// Reads and parses a config file, returning it with its raw text.
    pub fn load(path: &Path) -> Result<(Self, String)> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let cfg = Self::parse(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok((cfg, text))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn standards(&self) -> Vec<Standard> {
        self.compliance.clone().unwrap_or_else(default_standards)
    }

    pub fn cascade(&self) -> Result<Cascade> {
        Ok(Cascade::new(self.coefficients.resolve()?))
    }

    pub fn validate(&self) -> Result<()> {
        if self.project.program != PROGRAM {
            bail!("project.program must be {}", PROGRAM);
        }

        let coefficients = self.coefficients.resolve()?;
        let values = [
            ("coefficients.thermal.slope", coefficients.thermal.slope),
            ("coefficients.thermal.offset", coefficients.thermal.offset),
            ("coefficients.cooling.slope", coefficients.cooling.slope),
            ("coefficients.cooling.offset", coefficients.cooling.offset),
            ("coefficients.fuel.weight_factor", coefficients.fuel.weight_factor),
            ("coefficients.fuel.drag_factor", coefficients.fuel.drag_factor),
            ("coefficients.fuel.drag_exponent", coefficients.fuel.drag_exponent),
        ];
        for (key, value) in values {
            if !value.is_finite() {
                bail!("{} must be finite", key);
            }
        }

        let design = &self.design;
        if !(design.min > 0.0) {
            bail!("design.min must be positive");
        }
        if !(design.max > design.min) {
            bail!("design.max must be greater than design.min");
        }
        if !(design.step > 0.0) {
            bail!("design.step must be positive");
        }
        if !design.contains(design.windshield_size) {
            bail!(
                "design.windshield_size must be in [{}, {}]",
                design.min,
                design.max
            );
        }
        if !design.on_grid(design.windshield_size) {
            bail!(
                "design.windshield_size must be a multiple of {} from {}",
                design.step,
                design.min
            );
        }

        self.sweep.validate()?;

        if let Some(ref standards) = self.compliance {
            if standards.is_empty() {
                bail!("compliance must list at least one standard when present");
            }
            for s in standards {
                if s.name.trim().is_empty() {
                    bail!("compliance.name must not be empty");
                }
                if !s.threshold.is_finite() {
                    bail!("compliance.threshold for '{}' must be finite", s.name);
                }
            }
        }

        Ok(())
    }
}
