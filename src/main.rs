use aerocascade::cascade::Cascade;
use aerocascade::compliance;
use aerocascade::config;
use aerocascade::interactive::Dashboard;
use aerocascade::io::{self, CsvWriter};
use aerocascade::models::Preset;
use aerocascade::report::{self, ComparisonBundle, DeltaMetrics, Manifest, PointBundle, ScenarioResult, SweepBundle};
use aerocascade::session::Session;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aerocascade")]
#[command(version)]
#[command(about = "Windshield sizing design cascade: thermal -> cooling -> fuel burn")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    /// Coefficient preset, replacing the config's coefficients
    #[arg(short, long, global = true)]
    preset: Option<Preset>,

    /// Analysis mode when no subcommand is given: "single" or "sweep"
    #[arg(short, long, default_value = "single")]
    mode: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the cascade at one windshield size
    Run {
        /// Windshield size (defaults to design.windshield_size)
        #[arg(long)]
        size: Option<f64>,
        /// Write a JSON result bundle next to the CSV
        #[arg(long)]
        json: bool,
    },
    /// Run a parametric sweep over windshield size
    Sweep {
        /// Lower bound (defaults to sweep.min)
        #[arg(long)]
        min: Option<f64>,
        /// Upper bound (defaults to sweep.max)
        #[arg(long)]
        max: Option<f64>,
        /// Number of points (defaults to sweep.num_points)
        #[arg(long)]
        points: Option<usize>,
        /// Write a JSON summary with chart series next to the CSV
        #[arg(long)]
        json: bool,
    },
    /// Compare the active coefficients against another preset
    Compare {
        /// Preset to compare against
        #[arg(long)]
        against: Preset,
        /// Windshield size (defaults to design.windshield_size)
        #[arg(long)]
        size: Option<f64>,
        /// Write a JSON comparison next to the CSV
        #[arg(long)]
        json: bool,
    },
    /// Interactive dashboard session on stdin/stdout
    Interactive,
    /// Validate a configuration file
    Validate,
    /// List built-in coefficient presets
    Presets,
    /// Print version information
    Version,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aerocascade={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Loads the config (or defaults), applies `--preset`, and validates.
fn load_config(path: Option<&Path>, preset: Option<Preset>) -> Result<(config::Root, String)> {
    let (mut cfg, cfg_text) = match path {
        Some(path) => config::Root::load(path)?,
        None => {
            let cfg = config::Root::default();
            let text = cfg.to_toml()?;
            (cfg, text)
        }
    };

    if let Some(preset) = preset {
        cfg.coefficients = config::CoefficientConfig {
            preset: Some(preset.name().to_string()),
            ..Default::default()
        };
    }

    cfg.validate()?;
    info!(
        program = %cfg.project.program,
        study = %cfg.project.study,
        version = %cfg.project.version,
        preset = %cfg.coefficients.preset()?,
        customized = cfg.coefficients.is_customized(),
        "configuration loaded"
    );
    Ok((cfg, cfg_text))
}

fn scenario_name(cfg: &config::Root) -> Result<String> {
    let preset = cfg.coefficients.preset()?;
    if cfg.coefficients.is_customized() {
        Ok(format!("{}+custom", preset))
    } else {
        Ok(preset.to_string())
    }
}

// ============================================================================
// Run Modes
// ============================================================================

fn run_single(cfg: &config::Root, cfg_text: &str, out_path: &Path, size: f64, json_output: bool) -> Result<()> {
    cfg.design.check(size)?;

    let cascade = cfg.cascade()?;
    let result = cascade.evaluate(size)?;
    let checks = compliance::check(&cfg.standards(), result.fuel_burn);

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    report::render_point(&mut stdout, &result, &checks)?;
    stdout.flush()?;

    let mut w = CsvWriter::create(out_path)?;
    w.write_header()?;
    w.write_row(&result)?;
    w.flush()?;

    info!(
        windshield_size = result.windshield_size,
        heat_load = result.heat_load,
        system_weight = result.system_weight,
        fuel_burn = result.fuel_burn,
        csv = %out_path.display(),
        "single-point analysis complete"
    );

    for failed in checks.iter().filter(|c| !c.passed) {
        warn!(
            standard = %failed.standard,
            threshold = failed.threshold,
            fuel_burn = failed.fuel_burn,
            "fuel burn exceeds standard"
        );
    }

    if json_output {
        let json_path = io::sibling_path(out_path, ".json");
        let bundle = PointBundle {
            manifest: Manifest::new(cfg, cfg_text, cascade.coefficients()),
            result,
            flow: report::flow(&result),
            compliance: checks,
        };
        io::write_json(&json_path, &bundle)?;
        info!(path = %json_path.display(), "JSON bundle written");
    }

    Ok(())
}

fn run_sweep(cfg: &config::Root, cfg_text: &str, out_path: &Path, sweep: &config::Sweep, json_output: bool) -> Result<()> {
    sweep.validate()?;
    let range = sweep.range()?;
    let cascade = cfg.cascade()?;

    let start = Instant::now();
    let table = cascade.sweep(&range)?;
    let wall_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    report::render_sweep_table(&mut stdout, &table)?;
    stdout.flush()?;

    io::export_table(out_path, &table)?;

    info!(
        range = %range,
        rows = table.len(),
        wall_time_ms,
        csv = %out_path.display(),
        "sweep complete"
    );

    if json_output {
        let json_path = io::sibling_path(out_path, "_summary.json");
        let bundle = SweepBundle {
            manifest: Manifest::new(cfg, cfg_text, cascade.coefficients()),
            range: (&range).into(),
            series: (&table).into(),
            rows: &table,
            min_fuel_burn: table.min_fuel_burn().copied(),
        };
        io::write_json(&json_path, &bundle)?;
        info!(path = %json_path.display(), "JSON summary written");
    }

    Ok(())
}

fn run_compare(
    cfg: &config::Root,
    cfg_text: &str,
    out_path: &Path,
    against: Preset,
    size: f64,
    json_output: bool,
) -> Result<()> {
    cfg.design.check(size)?;

    let active_cascade = cfg.cascade()?;
    let other_cascade = Cascade::from_preset(against);

    let active = ScenarioResult {
        scenario_name: scenario_name(cfg)?,
        coefficients: *active_cascade.coefficients(),
        result: active_cascade.evaluate(size)?,
    };
    let other = ScenarioResult {
        scenario_name: against.to_string(),
        coefficients: *other_cascade.coefficients(),
        result: other_cascade.evaluate(size)?,
    };
    let delta = DeltaMetrics::between(&active.result, &other.result);

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    report::render_comparison(&mut stdout, &active, &other, &delta)?;
    stdout.flush()?;

    let mut w = CsvWriter::create(out_path)?;
    w.write_header()?;
    w.write_row(&active.result)?;
    w.write_row(&other.result)?;
    w.write_blank()?;
    w.write_comment(&format!("Scenarios: {} vs {}", active.scenario_name, other.scenario_name))?;
    w.write_comment(&format!("Heat load change: {:.2}%", delta.heat_load_change_pct))?;
    w.write_comment(&format!("System weight change: {:.2}%", delta.system_weight_change_pct))?;
    w.write_comment(&format!("Fuel burn change: {:.2}%", delta.fuel_burn_change_pct))?;
    w.flush()?;

    info!(
        active = %active.scenario_name,
        other = %other.scenario_name,
        fuel_burn_change_pct = delta.fuel_burn_change_pct,
        "comparison complete"
    );

    if json_output {
        let json_path = io::sibling_path(out_path, ".json");
        let bundle = ComparisonBundle {
            manifest: Manifest::new(cfg, cfg_text, active_cascade.coefficients()),
            active,
            other,
            delta,
        };
        io::write_json(&json_path, &bundle)?;
        info!(path = %json_path.display(), "JSON comparison written");
    }

    Ok(())
}

fn run_interactive(cfg: &config::Root) -> Result<()> {
    let session = Session::new(cfg.cascade()?, cfg.standards());
    let mut dashboard = Dashboard::new(session, cfg.design);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    dashboard.run(stdin.lock(), &mut stdout)
}

fn validate_config(cfg_path: &Path) -> Result<()> {
    let (cfg, _) = config::Root::load(cfg_path)?;
    cfg.validate()?;
    let coefficients = cfg.coefficients.resolve()?;

    eprintln!("[aerocascade] config valid: {}", cfg_path.display());
    eprintln!("  project: {} v{} ({})", cfg.project.program, cfg.project.version, cfg.project.study);
    eprintln!("  coefficients: {}", scenario_name(&cfg)?);
    eprintln!("    thermal: slope={}, offset={}", coefficients.thermal.slope, coefficients.thermal.offset);
    eprintln!("    cooling: slope={}, offset={}", coefficients.cooling.slope, coefficients.cooling.offset);
    eprintln!(
        "    fuel: weight_factor={}, drag_factor={}, drag_exponent={}",
        coefficients.fuel.weight_factor, coefficients.fuel.drag_factor, coefficients.fuel.drag_exponent
    );
    eprintln!(
        "  design: windshield_size={} in [{}, {}] step {}",
        cfg.design.windshield_size, cfg.design.min, cfg.design.max, cfg.design.step
    );
    eprintln!("  sweep: [{}, {}]×{}", cfg.sweep.min, cfg.sweep.max, cfg.sweep.num_points);
    for s in cfg.standards() {
        eprintln!("  compliance: {} <= {}", s.name, s.threshold);
    }

    Ok(())
}

fn print_presets() {
    println!("Built-in coefficient presets:");
    for preset in Preset::ALL {
        let c = preset.coefficients();
        println!("  {:<10} {}", preset.name(), preset.description());
        println!(
            "             heat_load     = {} * size + {}",
            c.thermal.slope, c.thermal.offset
        );
        println!(
            "             system_weight = {} * heat_load + {}",
            c.cooling.slope, c.cooling.offset
        );
        println!(
            "             fuel_burn     = {} * system_weight + {} * size^{}",
            c.fuel.weight_factor, c.fuel.drag_factor, c.fuel.drag_exponent
        );
    }
}

fn print_version() {
    println!("aerocascade - Windshield Sizing Design Cascade");
    println!();
    println!("  Tool Version:      {}", report::TOOL_VERSION);
    println!("  Schema Version:    {}", report::SCHEMA_VERSION);
    println!("  Platform:          {}", std::env::consts::OS);
    println!("  Architecture:      {}", std::env::consts::ARCH);
    println!();
    println!("Cascade:");
    println!("  windshield size -> heat load -> system weight -> fuel burn");
    println!();
    println!("Analysis modes:");
    println!("  - run:         single point with compliance flags");
    println!("  - sweep:       linearly spaced parametric sweep, CSV export");
    println!("  - compare:     active coefficients vs a preset");
    println!("  - interactive: memoizing dashboard session");
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        Some(Commands::Presets) => {
            print_presets();
            Ok(())
        }
        Some(Commands::Validate) => {
            let Some(cfg_path) = args.config else {
                bail!("--config required for validate");
            };
            validate_config(&cfg_path)
        }
        Some(Commands::Run { size, json }) => {
            let (cfg, cfg_text) = load_config(args.config.as_deref(), args.preset)?;
            let out_path = args.out.unwrap_or_else(|| PathBuf::from("results/out_single.csv"));
            let size = size.unwrap_or(cfg.design.windshield_size);
            run_single(&cfg, &cfg_text, &out_path, size, json)
        }
        Some(Commands::Sweep { min, max, points, json }) => {
            let (cfg, cfg_text) = load_config(args.config.as_deref(), args.preset)?;
            let out_path = args
                .out
                .unwrap_or_else(|| Path::new("results").join(io::DEFAULT_EXPORT_NAME));
            let sweep = config::Sweep {
                min: min.unwrap_or(cfg.sweep.min),
                max: max.unwrap_or(cfg.sweep.max),
                num_points: points.unwrap_or(cfg.sweep.num_points),
            };
            run_sweep(&cfg, &cfg_text, &out_path, &sweep, json)
        }
        Some(Commands::Compare { against, size, json }) => {
            let (cfg, cfg_text) = load_config(args.config.as_deref(), args.preset)?;
            let out_path = args.out.unwrap_or_else(|| PathBuf::from("results/comparison.csv"));
            let size = size.unwrap_or(cfg.design.windshield_size);
            run_compare(&cfg, &cfg_text, &out_path, against, size, json)
        }
        Some(Commands::Interactive) => {
            let (cfg, _) = load_config(args.config.as_deref(), args.preset)?;
            run_interactive(&cfg)
        }
        None => {
            let (cfg, cfg_text) = load_config(args.config.as_deref(), args.preset)?;

            match args.mode.as_str() {
                "single" => {
                    let out_path = args.out.unwrap_or_else(|| PathBuf::from("results/out_single.csv"));
                    run_single(&cfg, &cfg_text, &out_path, cfg.design.windshield_size, false)
                }
                "sweep" => {
                    let out_path = args
                        .out
                        .unwrap_or_else(|| Path::new("results").join(io::DEFAULT_EXPORT_NAME));
                    run_sweep(&cfg, &cfg_text, &out_path, &cfg.sweep, false)
                }
                _ => bail!("unknown mode: {} (use 'single' or 'sweep')", args.mode),
            }
        }
    }
}
