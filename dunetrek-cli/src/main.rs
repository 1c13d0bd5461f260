use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use dunetrek_engine::{
    DampingSweep, DpOptimizer, HeaveRig, RunOutcome, RunReport, ScenarioParams, SolveReport,
    TrajectorySimulator, preset, preset_names,
    simulator::ActionSet,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RunMode {
    /// Compute the dynamic-programming optimum for a scenario
    Solve,
    /// Replay the fixed diagnostic policy day by day
    Simulate,
    /// Grid-search the heave rig's damping settings for peak mean power
    Sweep,
}

#[derive(Debug, Parser)]
#[command(name = "dunetrek", version)]
#[command(
    about = "Dunetrek planning toolkit - traversal optimizer, trajectory replay, and heave-rig sweeps"
)]
struct Args {
    /// What to run against the selected scenario
    #[arg(long, value_enum, default_value_t = RunMode::Solve)]
    mode: RunMode,

    /// Built-in scenario preset
    #[arg(long, default_value = "oasis-crossing")]
    preset: String,

    /// Path to a scenario JSON file; overrides --preset
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// List all built-in presets and exit
    #[arg(long)]
    list_presets: bool,

    /// Path to a heave-rig JSON file (sweep mode); defaults to the reference rig
    #[arg(long)]
    rig: Option<PathBuf>,

    /// Largest damping coefficient on the sweep grid
    #[arg(long, default_value_t = 100_000.0)]
    damping_max: f64,

    /// Damping grid spacing
    #[arg(long, default_value_t = 1_000.0)]
    damping_step: f64,

    /// Largest damping exponent on the sweep grid
    #[arg(long, default_value_t = 1.0)]
    exponent_max: f64,

    /// Exponent grid spacing
    #[arg(long, default_value_t = 0.1)]
    exponent_step: f64,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_presets(&args)? {
        return Ok(());
    }

    announce_banner();

    let mut output_target = OutputTarget::new(args.output.as_ref())?;
    let failed = match args.mode {
        RunMode::Solve => run_solve(&args, &mut output_target)?,
        RunMode::Simulate => run_simulate(&args, &mut output_target)?,
        RunMode::Sweep => run_sweep(&args, &mut output_target)?,
    };
    output_target.flush()?;

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn announce_banner() {
    println!("{}", "🏜  Dunetrek Planning Toolkit".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn maybe_list_presets(args: &Args) -> Result<bool> {
    if !args.list_presets {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.as_ref())?;
    writeln!(output_target, "Available presets:")?;
    for name in preset_names() {
        writeln!(output_target, "  {name}")?;
    }
    output_target.flush()?;
    Ok(true)
}

fn load_scenario(args: &Args) -> Result<ScenarioParams> {
    if let Some(path) = &args.scenario {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let params: ScenarioParams = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        return Ok(params);
    }
    preset(&args.preset).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown preset {:?}; run with --list-presets to see the registry",
            args.preset
        )
    })
}

fn load_rig(args: &Args) -> Result<HeaveRig> {
    let Some(path) = &args.rig else {
        return Ok(HeaveRig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn run_solve(args: &Args, out: &mut OutputTarget) -> Result<bool> {
    let params = load_scenario(args)?;
    let report = DpOptimizer::new(&params)?.solve();
    match args.report.as_str() {
        "json" => serde_json::to_writer_pretty(&mut *out, &report)?,
        _ => write_solve_console(out, &report)?,
    }
    writeln!(out)?;
    Ok(report.is_infeasible())
}

fn write_solve_console(out: &mut OutputTarget, report: &SolveReport) -> Result<()> {
    if report.is_infeasible() {
        writeln!(out, "{}", "❌ No feasible trajectory".red().bold())?;
    } else {
        writeln!(
            out,
            "Best terminal wealth: {}",
            format!("{:.2}", report.best_wealth).bright_green().bold()
        )?;
    }
    writeln!(out, "Terminal states: {}", report.terminal_states)?;
    writeln!(out, "Peak table size: {}", report.peak_states)?;
    Ok(())
}

fn run_simulate(args: &Args, out: &mut OutputTarget) -> Result<bool> {
    let params = load_scenario(args)?;
    let report = TrajectorySimulator::new(&params)?.run();
    match args.report.as_str() {
        "json" => serde_json::to_writer_pretty(&mut *out, &report)?,
        _ => write_simulate_console(out, &report)?,
    }
    writeln!(out)?;
    Ok(matches!(report.outcome, RunOutcome::Exhausted(_)))
}

fn write_simulate_console(out: &mut OutputTarget, report: &RunReport) -> Result<()> {
    for record in &report.records {
        writeln!(
            out,
            "day {:>3}  region {:>2}  water {:>4}  food {:>4}  cash {:>10.2}  {}",
            record.day,
            record.position,
            record.water,
            record.food,
            record.money,
            describe_actions(&record.actions)
        )?;
    }
    match &report.outcome {
        RunOutcome::ReachedEnd {
            salvage_credit,
            final_cash,
        } => writeln!(
            out,
            "{} salvage {salvage_credit:.2}, final cash {final_cash:.2}",
            "✅ reached the end region:".green().bold()
        )?,
        RunOutcome::StoppedShort {
            leftover_value,
            final_cash,
        } => writeln!(
            out,
            "{} unrecovered supplies worth {leftover_value:.2}, final cash {final_cash:.2}",
            "⚠️  stopped short of the end region:".yellow().bold()
        )?,
        RunOutcome::Exhausted(exhaustion) => {
            writeln!(out, "{} {exhaustion}", "❌ run failed:".red().bold())?;
        }
    }
    Ok(())
}

fn describe_actions(actions: &ActionSet) -> String {
    if actions.is_empty() {
        return "-".to_string();
    }
    actions
        .iter()
        .map(|action| format!("{action:?}").to_lowercase())
        .collect::<Vec<_>>()
        .join("+")
}

fn run_sweep(args: &Args, out: &mut OutputTarget) -> Result<bool> {
    let rig = load_rig(args)?;
    let sweep = DampingSweep {
        damping_max: args.damping_max,
        damping_step: args.damping_step,
        exponent_max: args.exponent_max,
        exponent_step: args.exponent_step,
        ..DampingSweep::default()
    };
    let outcome = rig.sweep_damping(&sweep)?;
    match args.report.as_str() {
        "json" => serde_json::to_writer_pretty(&mut *out, &outcome)?,
        _ => {
            writeln!(
                out,
                "Peak mean power: {}",
                format!("{:.3}", outcome.best_power).bright_green().bold()
            )?;
            writeln!(out, "Best damping:    {:.1}", outcome.best_damping)?;
            writeln!(out, "Best exponent:   {:.2}", outcome.best_exponent)?;
            writeln!(out, "Grid points:     {}", outcome.evaluations)?;
        }
    }
    writeln!(out)?;
    Ok(false)
}

/// Report sink: stdout by default, a file when `--output` is given.
enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                Ok(Self::File(BufWriter::new(file)))
            }
            None => Ok(Self::Stdout(BufWriter::new(stdout()))),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::File(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dunetrek_engine::presets::dune_sprint;

    fn base_args() -> Args {
        Args {
            mode: RunMode::Solve,
            preset: "dune-sprint".to_string(),
            scenario: None,
            list_presets: false,
            rig: None,
            damping_max: 100_000.0,
            damping_step: 1_000.0,
            exponent_max: 1.0,
            exponent_step: 0.1,
            report: "console".to_string(),
            output: None,
        }
    }

    #[test]
    fn load_scenario_resolves_presets() {
        let args = base_args();
        let params = load_scenario(&args).unwrap();
        assert_eq!(params.day_count, 6);
    }

    #[test]
    fn load_scenario_rejects_unknown_presets() {
        let args = Args {
            preset: "salt-flats".to_string(),
            ..base_args()
        };
        let err = load_scenario(&args).unwrap_err();
        assert!(err.to_string().contains("unknown preset"));
    }

    #[test]
    fn load_scenario_prefers_files_over_presets() {
        let temp = std::env::temp_dir().join("dunetrek-scenario.json");
        let mut params = dune_sprint();
        params.day_count = 3;
        params.base_water_use.truncate(3);
        params.base_food_use.truncate(3);
        params.mandatory_stay.truncate(3);
        std::fs::write(&temp, serde_json::to_string(&params).unwrap()).unwrap();
        let args = Args {
            scenario: Some(temp),
            ..base_args()
        };
        let loaded = load_scenario(&args).unwrap();
        assert_eq!(loaded.day_count, 3);
    }

    #[test]
    fn solve_report_json_lands_in_the_output_file() {
        let temp = std::env::temp_dir().join("dunetrek-solve.json");
        let args = Args {
            report: "json".to_string(),
            ..base_args()
        };
        let mut target = OutputTarget::new(Some(&temp)).unwrap();
        let failed = run_solve(&args, &mut target).unwrap();
        target.flush().unwrap();
        assert!(!failed);
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("best_wealth"));
    }

    #[test]
    fn simulate_console_report_ends_with_the_outcome() {
        let temp = std::env::temp_dir().join("dunetrek-simulate.txt");
        let args = base_args();
        let mut target = OutputTarget::new(Some(&temp)).unwrap();
        // The sprint preset's fixed policy runs out of water mid-route.
        let failed = run_simulate(&args, &mut target).unwrap();
        target.flush().unwrap();
        assert!(failed);
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("day   1"));
        assert!(content.contains("water ran out on day 3"));
    }

    #[test]
    fn maybe_list_presets_writes_the_registry() {
        let temp = std::env::temp_dir().join("dunetrek-presets.txt");
        let args = Args {
            list_presets: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_presets(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("oasis-crossing"));
        assert!(content.contains("dune-sprint"));
    }

    #[test]
    fn maybe_list_presets_returns_false_when_disabled() {
        let args = base_args();
        assert!(!maybe_list_presets(&args).unwrap());
    }

    #[test]
    fn sweep_with_a_coarse_grid_reports_grid_points() {
        let temp = std::env::temp_dir().join("dunetrek-sweep.json");
        let args = Args {
            mode: RunMode::Sweep,
            report: "json".to_string(),
            damping_max: 2_000.0,
            damping_step: 1_000.0,
            exponent_max: 0.5,
            exponent_step: 0.5,
            ..base_args()
        };
        let mut target = OutputTarget::new(Some(&temp)).unwrap();
        let failed = run_sweep(&args, &mut target).unwrap();
        target.flush().unwrap();
        assert!(!failed);
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("\"evaluations\": 6"));
    }

    #[test]
    fn output_target_defaults_to_stdout() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
        assert!(matches!(target, OutputTarget::Stdout(_)));
    }

    #[test]
    fn describe_actions_joins_in_order() {
        let mut actions = ActionSet::new();
        actions.push(dunetrek_engine::DayAction::Purchase);
        actions.push(dunetrek_engine::DayAction::Mine);
        assert_eq!(describe_actions(&actions), "purchase+mine");
        assert_eq!(describe_actions(&ActionSet::new()), "-");
    }
}
