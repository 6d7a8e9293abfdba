//! Terminal rendering and JSON result bundles.
//!
//! This is the dashboard in text form: metric readout, cascade-flow chart,
//! compliance flags and sweep table. The JSON bundles carry the same data as
//! chart-ready series for external plotting.

use crate::cascade::CascadeResult;
use crate::compliance::ComplianceCheck;
use crate::config;
use crate::models::Coefficients;
use crate::sweep::{Column, SweepRange, SweepTable};
use anyhow::Result;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Write;

pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: &str = "1.0.0";

const BAR_WIDTH: usize = 40;

// ============================================================================
// JSON Output Structures
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub schema_version: String,
    pub tool_version: String,
    pub program: String,
    pub study: String,
    pub timestamp_utc: String,
    pub platform: String,
    pub config_hash: String,
    pub coefficients: Coefficients,
}

impl Manifest {
    pub fn new(cfg: &config::Root, cfg_text: &str, coefficients: &Coefficients) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tool_version: TOOL_VERSION.to_string(),
            program: cfg.project.program.clone(),
            study: cfg.project.study.clone(),
            timestamp_utc: timestamp_utc(),
            platform: std::env::consts::OS.to_string(),
            config_hash: compute_hash(cfg_text),
            coefficients: *coefficients,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowPoint {
    pub stage: &'static str,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct PointBundle {
    pub manifest: Manifest,
    pub result: CascadeResult,
    pub flow: Vec<FlowPoint>,
    pub compliance: Vec<ComplianceCheck>,
}

#[derive(Debug, Serialize)]
pub struct RangeSummary {
    pub min: f64,
    pub max: f64,
    pub num_points: usize,
    pub step: f64,
}

impl From<&SweepRange> for RangeSummary {
    fn from(range: &SweepRange) -> Self {
        Self {
            min: range.min(),
            max: range.max(),
            num_points: range.num_points(),
            step: range.step(),
        }
    }
}

/// One array per quantity, ready to plot against `windshield_size`.
#[derive(Debug, Serialize)]
pub struct Series {
    pub windshield_size: Vec<f64>,
    pub heat_load: Vec<f64>,
    pub system_weight: Vec<f64>,
    pub fuel_burn: Vec<f64>,
}

impl From<&SweepTable> for Series {
    fn from(table: &SweepTable) -> Self {
        Self {
            windshield_size: table.column(Column::WindshieldSize),
            heat_load: table.column(Column::HeatLoad),
            system_weight: table.column(Column::SystemWeight),
            fuel_burn: table.column(Column::FuelBurn),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SweepBundle<'a> {
    pub manifest: Manifest,
    pub range: RangeSummary,
    pub series: Series,
    pub rows: &'a SweepTable,
    pub min_fuel_burn: Option<CascadeResult>,
}

#[derive(Debug, Serialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub coefficients: Coefficients,
    pub result: CascadeResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeltaMetrics {
    pub heat_load_change_pct: f64,
    pub system_weight_change_pct: f64,
    pub fuel_burn_change_pct: f64,
}

impl DeltaMetrics {
    pub fn between(base: &CascadeResult, other: &CascadeResult) -> Self {
        Self {
            heat_load_change_pct: pct_change(base.heat_load, other.heat_load),
            system_weight_change_pct: pct_change(base.system_weight, other.system_weight),
            fuel_burn_change_pct: pct_change(base.fuel_burn, other.fuel_burn),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ComparisonBundle {
    pub manifest: Manifest,
    pub active: ScenarioResult,
    pub other: ScenarioResult,
    pub delta: DeltaMetrics,
}

// ============================================================================
// Helper Functions
// ============================================================================

pub fn compute_hash(data: &str) -> String {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

pub fn timestamp_utc() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Relative change in percent; zero when the base is zero.
pub fn pct_change(base: f64, other: f64) -> f64 {
    if base != 0.0 {
        (other - base) / base.abs() * 100.0
    } else {
        0.0
    }
}

/// The cascade as ordered stages, for the flow chart.
pub fn flow(result: &CascadeResult) -> Vec<FlowPoint> {
    Column::ALL
        .iter()
        .map(|c| FlowPoint {
            stage: c.label(),
            value: c.get(result),
        })
        .collect()
}

fn bar(value: f64, scale: f64) -> String {
    let filled = if scale > 0.0 && value > 0.0 {
        ((value / scale) * BAR_WIDTH as f64).round() as usize
    } else {
        0
    };
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

// ============================================================================
// Text Rendering
// ============================================================================

pub fn render_metrics<W: Write>(w: &mut W, result: &CascadeResult) -> Result<()> {
    writeln!(w, "Analysis Results")?;
    for c in Column::ALL {
        writeln!(w, "  {:<16} {:>10.2}", c.label(), c.get(result))?;
    }
    Ok(())
}

pub fn render_flow<W: Write>(w: &mut W, result: &CascadeResult) -> Result<()> {
    let points = flow(result);
    let scale = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);

    writeln!(w, "Design Cascade Flow")?;
    for (i, p) in points.iter().enumerate() {
        let arrow = if i == 0 { " " } else { ">" };
        writeln!(w, "{} {:<16} |{}| {:>10.2}", arrow, p.stage, bar(p.value, scale), p.value)?;
    }
    Ok(())
}

pub fn render_compliance<W: Write>(w: &mut W, checks: &[ComplianceCheck]) -> Result<()> {
    let Some(first) = checks.first() else {
        return Ok(());
    };
    writeln!(w, "Compliance (fuel burn {:.2})", first.fuel_burn)?;
    for c in checks {
        let flag = if c.passed { "PASS" } else { "FAIL" };
        writeln!(w, "  [{}] {:<40} <= {:>8.2}", flag, c.standard, c.threshold)?;
    }
    Ok(())
}

/// Metric readout, flow chart and compliance flags for one evaluation.
pub fn render_point<W: Write>(
    w: &mut W,
    result: &CascadeResult,
    checks: &[ComplianceCheck],
) -> Result<()> {
    render_metrics(w, result)?;
    writeln!(w)?;
    render_flow(w, result)?;
    writeln!(w)?;
    render_compliance(w, checks)?;
    Ok(())
}

pub fn render_sweep_table<W: Write>(w: &mut W, table: &SweepTable) -> Result<()> {
    writeln!(w, "Parametric Sweep Analysis ({} points)", table.len())?;
    let header: Vec<String> = Column::ALL.iter().map(|c| format!("{:>16}", c.key())).collect();
    writeln!(w, "{}", header.join(" "))?;
    for row in table {
        let cells: Vec<String> = row.values().iter().map(|v| format!("{:>16.3}", v)).collect();
        writeln!(w, "{}", cells.join(" "))?;
    }
    if let Some(best) = table.min_fuel_burn() {
        writeln!(
            w,
            "Lowest fuel burn {:.3} at windshield size {:.3}",
            best.fuel_burn, best.windshield_size
        )?;
    }
    Ok(())
}

pub fn render_comparison<W: Write>(
    w: &mut W,
    active: &ScenarioResult,
    other: &ScenarioResult,
    delta: &DeltaMetrics,
) -> Result<()> {
    writeln!(
        w,
        "Comparison at windshield size {:.2}",
        active.result.windshield_size
    )?;
    writeln!(
        w,
        "  {:<16} {:>14} {:>14} {:>10}",
        "", active.scenario_name, other.scenario_name, "change"
    )?;
    let rows = [
        (Column::HeatLoad, delta.heat_load_change_pct),
        (Column::SystemWeight, delta.system_weight_change_pct),
        (Column::FuelBurn, delta.fuel_burn_change_pct),
    ];
    for (c, pct) in rows {
        writeln!(
            w,
            "  {:<16} {:>14.2} {:>14.2} {:>+9.2}%",
            c.label(),
            c.get(&active.result),
            c.get(&other.result),
            pct
        )?;
    }
    Ok(())
}
