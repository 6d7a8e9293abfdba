use aerocascade::compliance::{check as check_standards, default_standards};
use aerocascade::io::to_csv_string;
use aerocascade::report::{SCHEMA_VERSION, TOOL_VERSION};
use aerocascade::{Cascade, CascadeError, CascadeResult, Column, Preset, SweepTable};
use numpy::PyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn cascade_for(preset: &str) -> Result<Cascade, CascadeError> {
    let preset: Preset = preset.parse()?;
    Ok(Cascade::from_preset(preset))
}

fn run_sweep(
    min_size: f64,
    max_size: f64,
    num_points: usize,
    preset: &str,
) -> Result<SweepTable, CascadeError> {
    cascade_for(preset)?.sweep_between(min_size, max_size, num_points)
}

/// Column series keyed the same way as the CSV header
fn sweep_columns(table: &SweepTable) -> Vec<(&'static str, Vec<f64>)> {
    Column::ALL
        .iter()
        .map(|&column| (column.key(), table.column(column)))
        .collect()
}

/// One cascade evaluation
#[pyclass]
#[derive(Clone)]
struct CascadeOutput {
    #[pyo3(get)]
    windshield_size: f64,
    #[pyo3(get)]
    heat_load: f64,
    #[pyo3(get)]
    system_weight: f64,
    #[pyo3(get)]
    fuel_burn: f64,
}

impl From<CascadeResult> for CascadeOutput {
    fn from(r: CascadeResult) -> Self {
        Self {
            windshield_size: r.windshield_size,
            heat_load: r.heat_load,
            system_weight: r.system_weight,
            fuel_burn: r.fuel_burn,
        }
    }
}

#[pymethods]
impl CascadeOutput {
    fn __repr__(&self) -> String {
        format!(
            "CascadeOutput(windshield_size={:.2}, heat_load={:.2}, system_weight={:.2}, fuel_burn={:.2})",
            self.windshield_size, self.heat_load, self.system_weight, self.fuel_burn
        )
    }

    fn to_dict(&self, py: Python<'_>) -> PyResult<PyObject> {
        let dict = PyDict::new(py);
        dict.set_item("windshield_size", self.windshield_size)?;
        dict.set_item("heat_load", self.heat_load)?;
        dict.set_item("system_weight", self.system_weight)?;
        dict.set_item("fuel_burn", self.fuel_burn)?;
        Ok(dict.into())
    }
}

/// Evaluate the cascade at one windshield size
#[pyfunction]
#[pyo3(signature = (windshield_size, preset = "baseline"))]
fn evaluate(windshield_size: f64, preset: &str) -> PyResult<CascadeOutput> {
    let result = cascade_for(preset)
        .and_then(|cascade| cascade.evaluate(windshield_size))
        .map_err(value_error)?;
    Ok(result.into())
}

/// Parametric sweep; returns one numpy array per quantity
#[pyfunction]
#[pyo3(signature = (min_size, max_size, num_points, preset = "baseline"))]
fn sweep<'py>(
    py: Python<'py>,
    min_size: f64,
    max_size: f64,
    num_points: usize,
    preset: &str,
) -> PyResult<&'py PyDict> {
    let table = run_sweep(min_size, max_size, num_points, preset).map_err(value_error)?;

    let result = PyDict::new(py);
    for (key, values) in sweep_columns(&table) {
        result.set_item(key, PyArray1::from_vec(py, values))?;
    }
    Ok(result)
}

/// Sweep rendered as CSV text, ready for a download button
#[pyfunction]
#[pyo3(signature = (min_size, max_size, num_points, preset = "baseline"))]
fn sweep_csv(min_size: f64, max_size: f64, num_points: usize, preset: &str) -> PyResult<String> {
    let table = run_sweep(min_size, max_size, num_points, preset).map_err(value_error)?;
    to_csv_string(&table).map_err(value_error)
}

/// Check a fuel burn value against the default standards
#[pyfunction]
fn compliance(fuel_burn: f64) -> Vec<(String, f64, bool)> {
    check_standards(&default_standards(), fuel_burn)
        .into_iter()
        .map(|c| (c.standard, c.threshold, c.passed))
        .collect()
}

/// Built-in coefficient presets as (name, description) pairs
#[pyfunction]
fn presets() -> Vec<(String, String)> {
    Preset::ALL
        .iter()
        .map(|p| (p.name().to_string(), p.description().to_string()))
        .collect()
}

/// Get version information
#[pyfunction]
fn version() -> (String, String) {
    (TOOL_VERSION.to_string(), SCHEMA_VERSION.to_string())
}

/// aerocascade Python module
#[pymodule]
fn aerocascade_python(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<CascadeOutput>()?;
    m.add_function(wrap_pyfunction!(evaluate, m)?)?;
    m.add_function(wrap_pyfunction!(sweep, m)?)?;
    m.add_function(wrap_pyfunction!(sweep_csv, m)?)?;
    m.add_function(wrap_pyfunction!(compliance, m)?)?;
    m.add_function(wrap_pyfunction!(presets, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;

    m.add("__version__", TOOL_VERSION)?;
    m.add("SCHEMA_VERSION", SCHEMA_VERSION)?;
    m.add("CSV_HEADER", aerocascade::io::CSV_HEADER)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_for_rejects_unknown_preset() {
        assert!(cascade_for("Refined ").is_ok());
        let err = cascade_for("warp").unwrap_err();
        assert_eq!(err, CascadeError::UnknownPreset("warp".to_string()));
    }

    #[test]
    fn test_run_sweep_errors_carry_message() {
        let err = run_sweep(f64::NEG_INFINITY, 0.0, 3, "baseline").unwrap_err();
        assert!(matches!(err, CascadeError::InvalidRange { .. }));
        assert!(!err.to_string().is_empty());

        let err = run_sweep(-2.0, 2.0, 5, "refined").unwrap_err();
        assert!(matches!(err, CascadeError::Domain { .. }));
    }

    #[test]
    fn test_sweep_columns_match_csv_header() {
        let table = run_sweep(0.5, 10.0, 20, "baseline").unwrap();
        let columns = sweep_columns(&table);

        let keys: Vec<&str> = columns.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys.join(","), aerocascade::io::CSV_HEADER);
        assert!(columns.iter().all(|(_, values)| values.len() == 20));
        assert_eq!(columns[0].1[0], 0.5);
        assert_eq!(columns[0].1[19], 10.0);
    }
}
