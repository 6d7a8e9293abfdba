//! Test suite for the windshield cascade
//!
//! Includes:
//! - Unit tests for each stage model and the evaluator
//! - Sweep ordering, spacing and consistency properties
//! - Regression tests for both coefficient presets
//! - Config, CSV, session and interactive front-end tests

use crate::cascade::{Cascade, CascadeResult};
use crate::compliance::{self, default_standards, Standard};
use crate::config::{self, Root};
use crate::error::CascadeError;
use crate::interactive::{parse_command, Command, Dashboard};
use crate::io::{self, CsvWriter, CSV_HEADER};
use crate::models::{Coefficients, CoolingModel, FuelModel, Preset, ThermalModel};
use crate::report;
use crate::session::Session;
use crate::sweep::{Column, SweepRange};
use approx::assert_relative_eq;
use std::io::Cursor;

fn baseline() -> Cascade {
    Cascade::from_preset(Preset::Baseline)
}

fn refined() -> Cascade {
    Cascade::from_preset(Preset::Refined)
}

// =============================================================================
// Stage Model Tests
// =============================================================================

#[test]
fn test_thermal_model_is_affine() {
    let thermal = ThermalModel { slope: 2.5, offset: 10.0 };
    assert_relative_eq!(thermal.heat_load(0.0), 10.0);
    assert_relative_eq!(thermal.heat_load(3.0), 17.5);
    assert_relative_eq!(thermal.heat_load(-2.0), 5.0);
}

#[test]
fn test_cooling_model_is_affine() {
    let cooling = CoolingModel { slope: 0.5, offset: 50.0 };
    assert_relative_eq!(cooling.system_weight(17.5), 58.75);
    assert_relative_eq!(cooling.system_weight(0.0), 50.0);
}

#[test]
fn test_fuel_model_linear_drag() {
    let fuel = Preset::Baseline.coefficients().fuel;
    let burn = fuel.fuel_burn(58.75, 3.0).unwrap();
    assert_relative_eq!(burn, 50.6, epsilon = 1e-12);
}

#[test]
fn test_fuel_model_power_law_drag() {
    let fuel = FuelModel {
        weight_factor: 0.0,
        drag_factor: 1.0,
        drag_exponent: 2.0,
    };
    assert_relative_eq!(fuel.fuel_burn(0.0, 3.0).unwrap(), 9.0);
}

// =============================================================================
// Negative Input Policy
// =============================================================================

#[test]
fn test_negative_size_rejected_for_fractional_exponent() {
    let err = refined().evaluate(-1.0).unwrap_err();
    assert_eq!(
        err,
        CascadeError::Domain {
            windshield_size: -1.0,
            exponent: 1.2
        }
    );
}

#[test]
fn test_negative_size_accepted_for_integral_exponent() {
    let r = baseline().evaluate(-1.0).unwrap();
    // heat = 7.5, weight = 53.75, fuel = 43.0 - 1.2
    assert_relative_eq!(r.heat_load, 7.5);
    assert_relative_eq!(r.system_weight, 53.75);
    assert_relative_eq!(r.fuel_burn, 41.8, epsilon = 1e-12);

    let squared = FuelModel {
        weight_factor: 0.0,
        drag_factor: 1.0,
        drag_exponent: 2.0,
    };
    assert_relative_eq!(squared.fuel_burn(0.0, -3.0).unwrap(), 9.0);
}

#[test]
fn test_zero_size_accepted_by_both_presets() {
    for preset in Preset::ALL {
        let r = Cascade::from_preset(preset).evaluate(0.0).unwrap();
        assert!(r.fuel_burn.is_finite(), "{} should accept zero", preset);
    }
}

// =============================================================================
// Cascade Evaluator Tests
// =============================================================================

#[test]
fn test_baseline_scenario() {
    let r = baseline().evaluate(3.0).unwrap();
    assert_relative_eq!(r.windshield_size, 3.0);
    assert_relative_eq!(r.heat_load, 17.5);
    assert_relative_eq!(r.system_weight, 58.75);
    assert_relative_eq!(r.fuel_burn, 50.6, epsilon = 1e-12);
}

#[test]
fn test_refined_scenario() {
    let r = refined().evaluate(3.6).unwrap();
    assert_relative_eq!(r.heat_load, 5.46, epsilon = 1e-12);
    assert_relative_eq!(r.system_weight, 150.12, epsilon = 1e-9);
    let expected = 0.05 * 150.12 + 8.0 * 3.6_f64.powf(1.2);
    assert_relative_eq!(r.fuel_burn, expected, epsilon = 1e-9);
    // 7.506 + 8.0 * 4.65118
    assert_relative_eq!(r.fuel_burn, 44.7154, epsilon = 1e-4);
}

#[test]
fn test_result_is_composition_of_stages() {
    let c = Preset::Refined.coefficients();
    let cascade = Cascade::new(c);

    for x in [0.5, 1.0, 2.25, 4.0, 7.3, 10.0] {
        let r = cascade.evaluate(x).unwrap();
        let heat = c.thermal.heat_load(x);
        let weight = c.cooling.system_weight(heat);
        let fuel = c.fuel.fuel_burn(weight, x).unwrap();
        assert_eq!(r.heat_load, heat);
        assert_eq!(r.system_weight, weight);
        assert_eq!(r.fuel_burn, fuel);
    }
}

#[test]
fn test_determinism() {
    for cascade in [baseline(), refined()] {
        let a = cascade.evaluate(4.2).unwrap();
        let b = cascade.evaluate(4.2).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_custom_coefficients() {
    let cascade = Cascade::new(Coefficients {
        thermal: ThermalModel { slope: 1.0, offset: 0.0 },
        cooling: CoolingModel { slope: 2.0, offset: 1.0 },
        fuel: FuelModel {
            weight_factor: 1.0,
            drag_factor: 0.0,
            drag_exponent: 1.0,
        },
    });
    let r = cascade.evaluate(4.0).unwrap();
    assert_relative_eq!(r.fuel_burn, 9.0);
}

// =============================================================================
// Sweep Tests
// =============================================================================

#[test]
fn test_sweep_range_rejects_bad_bounds() {
    assert!(matches!(
        SweepRange::new(5.0, 5.0, 10),
        Err(CascadeError::InvalidRange { .. })
    ));
    assert!(matches!(
        SweepRange::new(6.0, 5.0, 10),
        Err(CascadeError::InvalidRange { .. })
    ));
    assert!(matches!(
        SweepRange::new(1.0, 5.0, 1),
        Err(CascadeError::InvalidRange { .. })
    ));
    assert!(SweepRange::new(f64::NAN, 5.0, 10).is_err());
    assert!(SweepRange::new(1.0, f64::NAN, 10).is_err());
}

#[test]
fn test_sweep_range_extreme_bounds() {
    for (min, max) in [
        (f64::NEG_INFINITY, 0.0),
        (0.0, f64::INFINITY),
        (f64::NEG_INFINITY, f64::INFINITY),
    ] {
        assert!(matches!(
            SweepRange::new(min, max, 3),
            Err(CascadeError::InvalidRange { .. })
        ));
    }
    assert!(matches!(
        baseline().sweep_between(f64::NEG_INFINITY, 0.0, 3),
        Err(CascadeError::InvalidRange { .. })
    ));

    // The span overflows f64 but every sample stays finite and ordered
    let range = SweepRange::new(-f64::MAX, f64::MAX, 3).unwrap();
    let samples: Vec<f64> = range.samples().collect();
    assert_eq!(samples, vec![-f64::MAX, 0.0, f64::MAX]);
    assert!(range.step().is_finite());
    assert_eq!(range.step(), f64::MAX);

    let range = SweepRange::new(-f64::MAX, f64::MAX, 5).unwrap();
    let samples: Vec<f64> = range.samples().collect();
    assert!(samples.iter().all(|s| s.is_finite()));
    assert!(samples.windows(2).all(|p| p[1] > p[0]));
    assert_relative_eq!(samples[1], -f64::MAX / 2.0);
    assert_relative_eq!(samples[3], f64::MAX / 2.0);
}

#[test]
fn test_sweep_ordering_and_spacing() {
    let table = baseline().sweep_between(0.5, 10.0, 20).unwrap();
    assert_eq!(table.len(), 20);

    let sizes = table.column(Column::WindshieldSize);
    assert_relative_eq!(sizes[0], 0.5);
    assert_relative_eq!(sizes[19], 10.0);

    let step = (10.0 - 0.5) / 19.0;
    for pair in sizes.windows(2) {
        assert!(pair[1] > pair[0], "sizes must ascend");
        assert_relative_eq!(pair[1] - pair[0], step, epsilon = 1e-12);
    }
}

#[test]
fn test_sweep_last_sample_is_exact_max() {
    let range = SweepRange::new(0.1, 0.7, 7).unwrap();
    let samples: Vec<f64> = range.samples().collect();
    assert_eq!(samples.len(), 7);
    assert_eq!(samples[0], 0.1);
    assert_eq!(samples[6], 0.7);
}

#[test]
fn test_sweep_two_points() {
    let table = baseline().sweep_between(1.0, 2.0, 2).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.first().unwrap().windshield_size, 1.0);
    assert_eq!(table.last().unwrap().windshield_size, 2.0);
}

#[test]
fn test_sweep_matches_point_evaluation() {
    let cascade = refined();
    let range = SweepRange::new(1.0, 10.0, 13).unwrap();
    let table = cascade.sweep(&range).unwrap();

    for (i, row) in table.iter().enumerate() {
        assert_eq!(*row, cascade.evaluate(range.sample(i)).unwrap());
    }
}

#[test]
fn test_sweep_propagates_domain_error() {
    let err = refined().sweep_between(-2.0, 2.0, 5).unwrap_err();
    assert!(matches!(err, CascadeError::Domain { .. }));
}

#[test]
fn test_sweep_min_fuel_burn() {
    // Fuel burn rises monotonically with size for the baseline preset
    let table = baseline().sweep_between(0.5, 10.0, 20).unwrap();
    let best = table.min_fuel_burn().unwrap();
    assert_eq!(best.windshield_size, 0.5);
}

// =============================================================================
// Compliance Tests
// =============================================================================

#[test]
fn test_compliance_all_pass_at_baseline_design() {
    let checks = compliance::check(&default_standards(), 50.6);
    assert_eq!(checks.len(), 4);
    assert!(compliance::all_passed(&checks));
    let thresholds: Vec<f64> = checks.iter().map(|c| c.threshold).collect();
    assert_eq!(thresholds, vec![64.4, 102.0, 79.1, 102.0]);
}

#[test]
fn test_compliance_threshold_is_inclusive() {
    let checks = compliance::check(&default_standards(), 79.1);
    let passed: Vec<bool> = checks.iter().map(|c| c.passed).collect();
    assert_eq!(passed, vec![false, true, true, true]);
}

#[test]
fn test_compliance_nan_fails() {
    let checks = compliance::check(&default_standards(), f64::NAN);
    assert!(checks.iter().all(|c| !c.passed));
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_default_config_is_valid() {
    let cfg = Root::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.coefficients.resolve().unwrap(), Preset::Baseline.coefficients());
    assert_eq!(cfg.design.windshield_size, 3.0);
    assert_eq!(cfg.sweep.num_points, 20);
    assert_eq!(cfg.standards().len(), 4);
}

#[test]
fn test_default_config_round_trips_through_toml() {
    let cfg = Root::default();
    let text = cfg.to_toml().unwrap();
    let parsed = Root::parse(&text).unwrap();
    assert_eq!(parsed, cfg);
}

#[test]
fn test_config_parses_preset_and_overrides() {
    let text = r#"
[project]
program = "aerocascade"

[coefficients]
preset = "refined"

[coefficients.fuel]
weight_factor = 0.1
drag_factor = 4.0
drag_exponent = 1.0

[[compliance]]
name = "Internal target"
threshold = 40.0
"#;
    let cfg = Root::parse(text).unwrap();
    cfg.validate().unwrap();

    let c = cfg.coefficients.resolve().unwrap();
    assert_eq!(c.thermal, Preset::Refined.coefficients().thermal);
    assert_eq!(c.fuel.drag_factor, 4.0);
    assert!(cfg.coefficients.is_customized());
    assert_eq!(cfg.standards(), vec![Standard::new("Internal target", 40.0)]);
}

#[test]
fn test_config_rejects_unknown_preset() {
    let text = "[coefficients]\npreset = \"supersonic\"\n";
    let cfg = Root::parse(text).unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_rejects_out_of_range_inputs() {
    let mut cfg = Root::default();
    cfg.design.windshield_size = 12.0;
    assert!(cfg.validate().is_err());

    let mut cfg = Root::default();
    cfg.sweep.num_points = 4;
    assert!(cfg.validate().is_err());

    let mut cfg = Root::default();
    cfg.sweep.min = 6.0;
    assert!(cfg.validate().is_err());

    let mut cfg = Root::default();
    cfg.sweep.max = cfg.sweep.min + 0.05;
    assert!(cfg.validate().is_err());

    let mut cfg = Root::default();
    cfg.project.program = "other".to_string();
    assert!(cfg.validate().is_err());

    let mut cfg = Root::default();
    cfg.compliance = Some(Vec::new());
    assert!(cfg.validate().is_err());

    let mut cfg = Root::default();
    cfg.design.windshield_size = 3.05;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_design_size_check() {
    let design = config::Design::default();
    for size in [0.5, 3.0, 3.6, 7.3, 10.0] {
        assert!(design.check(size).is_ok(), "{} should be accepted", size);
    }

    let err = design.check(50.0).unwrap_err();
    assert_eq!(err.to_string(), "windshield size must be in [0.5, 10]");
    assert!(design.check(0.4).is_err());
    assert!(design.check(f64::NAN).is_err());

    let err = design.check(3.14).unwrap_err();
    assert_eq!(err.to_string(), "windshield size must be a multiple of 0.1 from 0.5");

    let coarse = config::Design {
        windshield_size: 3.0,
        min: 1.0,
        max: 9.0,
        step: 0.5,
    };
    assert!(coarse.check(3.5).is_ok());
    assert!(coarse.check(3.6).is_err());
}

#[test]
fn test_config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("study.toml");
    std::fs::write(&path, "[sweep]\nmin = 1.0\nmax = 5.0\nnum_points = 9\n").unwrap();

    let (cfg, text) = Root::load(&path).unwrap();
    cfg.validate().unwrap();
    assert!(text.contains("num_points = 9"));
    assert_eq!(cfg.sweep.range().unwrap().num_points(), 9);
    assert_eq!(cfg.project.program, config::PROGRAM);
}

// =============================================================================
// CSV Export Tests
// =============================================================================

#[test]
fn test_csv_header_and_precision() {
    let table = baseline().sweep_between(1.0, 3.0, 3).unwrap();
    let csv = io::to_csv_string(&table).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[3], "3.000000,17.500000,58.750000,50.600000");
}

#[test]
fn test_csv_single_row_writer() {
    let r = CascadeResult {
        windshield_size: 1.0,
        heat_load: 2.0,
        system_weight: 3.0,
        fuel_burn: 4.5,
    };
    let mut w = CsvWriter::new(Vec::new());
    w.write_header().unwrap();
    w.write_row(&r).unwrap();
    let text = String::from_utf8(w.into_inner()).unwrap();
    assert_eq!(
        text,
        format!("{}\n1.000000,2.000000,3.000000,4.500000\n", CSV_HEADER)
    );
}

#[test]
fn test_export_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results").join(io::DEFAULT_EXPORT_NAME);
    let table = refined().sweep_between(0.5, 10.0, 5).unwrap();

    io::export_table(&path, &table).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 6);
}

#[test]
fn test_sibling_path() {
    let p = std::path::Path::new("results/out.csv");
    assert_eq!(
        io::sibling_path(p, "_summary.json"),
        std::path::Path::new("results/out_summary.json")
    );
}

// =============================================================================
// Report Tests
// =============================================================================

#[test]
fn test_flow_stages_in_cascade_order() {
    let r = baseline().evaluate(3.0).unwrap();
    let flow = report::flow(&r);
    let stages: Vec<&str> = flow.iter().map(|p| p.stage).collect();
    assert_eq!(
        stages,
        vec!["Windshield Size", "Heat Load", "System Weight", "Fuel Burn"]
    );
    assert_eq!(flow[3].value, r.fuel_burn);
}

#[test]
fn test_render_point_shows_metrics_and_flags() {
    let r = baseline().evaluate(3.0).unwrap();
    let checks = compliance::check(&default_standards(), r.fuel_burn);
    let mut out = Vec::new();
    report::render_point(&mut out, &r, &checks).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("Analysis Results"));
    assert!(text.contains("58.75"));
    assert!(text.contains("50.60"));
    assert_eq!(text.matches("[PASS]").count(), 4);
}

#[test]
fn test_sweep_bundle_serializes_series() {
    let cfg = Root::default();
    let cascade = cfg.cascade().unwrap();
    let range = cfg.sweep.range().unwrap();
    let table = cascade.sweep(&range).unwrap();

    let bundle = report::SweepBundle {
        manifest: report::Manifest::new(&cfg, "", cascade.coefficients()),
        range: (&range).into(),
        series: (&table).into(),
        rows: &table,
        min_fuel_burn: table.min_fuel_burn().copied(),
    };
    let json: serde_json::Value = serde_json::to_value(&bundle).unwrap();

    assert_eq!(json["series"]["fuel_burn"].as_array().unwrap().len(), 20);
    assert_eq!(json["rows"].as_array().unwrap().len(), 20);
    assert_eq!(json["manifest"]["coefficients"]["thermal"]["slope"], 2.5);
    assert_eq!(json["range"]["num_points"], 20);
}

#[test]
fn test_delta_metrics_between_presets() {
    let a = baseline().evaluate(3.0).unwrap();
    let b = refined().evaluate(3.0).unwrap();
    let d = report::DeltaMetrics::between(&a, &b);
    assert_relative_eq!(
        d.fuel_burn_change_pct,
        (b.fuel_burn - a.fuel_burn) / a.fuel_burn * 100.0
    );
}

// =============================================================================
// Session Tests
// =============================================================================

fn session() -> Session {
    Session::new(baseline(), default_standards())
}

#[test]
fn test_session_memoizes_point() {
    let mut s = session();
    let a = s.evaluate(3.0).unwrap();
    let b = s.evaluate(3.0).unwrap();
    assert_eq!(a, b);
    assert_eq!(s.stats(), (1, 1));

    s.evaluate(3.1).unwrap();
    assert_eq!(s.stats(), (1, 2));
    assert_eq!(s.last_point().unwrap().windshield_size, 3.1);
}

#[test]
fn test_session_memoizes_sweep() {
    let mut s = session();
    let range = SweepRange::new(0.5, 10.0, 20).unwrap();
    let first = s.sweep(range).unwrap().clone();
    let second = s.sweep(range).unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(s.stats(), (1, 1));
}

#[test]
fn test_session_preset_change_invalidates() {
    let mut s = session();
    let before = s.evaluate(3.0).unwrap();
    s.sweep(SweepRange::new(1.0, 2.0, 5).unwrap()).unwrap();

    s.set_coefficients(Preset::Refined.coefficients());
    assert!(s.last_point().is_none());
    assert!(s.last_sweep().is_none());

    let after = s.evaluate(3.0).unwrap();
    assert_ne!(before, after);
    assert_eq!(after, refined().evaluate(3.0).unwrap());
}

// =============================================================================
// Interactive Tests
// =============================================================================

#[test]
fn test_parse_commands() {
    assert_eq!(parse_command("   ").unwrap(), None);
    assert_eq!(parse_command("size 3.5").unwrap(), Some(Command::Size(3.5)));
    assert_eq!(parse_command("RUN").unwrap(), Some(Command::Run(None)));
    assert_eq!(
        parse_command("sweep 0.5 10 20").unwrap(),
        Some(Command::Sweep {
            min: 0.5,
            max: 10.0,
            num_points: 20
        })
    );
    assert_eq!(
        parse_command("preset refined").unwrap(),
        Some(Command::Preset(Preset::Refined))
    );
    assert_eq!(parse_command("exit").unwrap(), Some(Command::Quit));

    assert!(parse_command("size").is_err());
    assert!(parse_command("size abc").is_err());
    assert!(parse_command("size 1 2").is_err());
    assert!(parse_command("preset warp").is_err());
    assert!(parse_command("fly").is_err());
}

#[test]
fn test_dashboard_script() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("sweep.csv");
    let script = format!(
        "size 3.0\nrun\nbogus\nexport {p}\nsweep 0.5 10 5\nexport {p}\nsize 50\nquit\nsize 4.0\n",
        p = csv_path.display()
    );

    let mut dashboard = Dashboard::new(session(), config::Design::default());
    let mut out = Vec::new();
    dashboard.run(Cursor::new(script), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("50.60"));
    assert!(text.contains("error: unknown command 'bogus'"));
    assert!(text.contains("error: no sweep to export"));
    assert!(text.contains("exported 5 rows"));
    assert!(text.contains("error: windshield size must be in [0.5, 10]"));
    // `run` reused the memoized 3.0 result, and nothing after quit ran
    assert_eq!(dashboard.session().stats(), (1, 2));
    assert_eq!(dashboard.current_size(), 3.0);

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 6);
}

#[test]
fn test_dashboard_rejects_sweep_outside_form_limits() {
    let mut dashboard = Dashboard::new(session(), config::Design::default());
    let mut out = Vec::new();
    dashboard
        .run(Cursor::new("sweep 0.5 10 2\n"), &mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("error: sweep.num_points must be in [5, 50]"));
}

#[test]
fn test_dashboard_rejects_off_grid_size() {
    let mut dashboard = Dashboard::new(session(), config::Design::default());
    let mut out = Vec::new();
    dashboard
        .run(Cursor::new("size 3.14\nsize 3.1\n"), &mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("error: windshield size must be a multiple of 0.1 from 0.5"));
    assert_eq!(dashboard.current_size(), 3.1);
    assert_eq!(dashboard.session().stats(), (0, 1));
}

#[test]
fn test_dashboard_preset_switch() {
    let mut dashboard = Dashboard::new(session(), config::Design::default());
    let mut out = Vec::new();
    dashboard
        .run(Cursor::new("preset refined\nsize 3.6\n"), &mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("coefficients: refined"));
    assert!(text.contains("150.12"));
}
