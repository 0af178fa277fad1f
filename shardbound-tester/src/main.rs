mod logic;

use anyhow::{Context, Result, ensure};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use logic::{RunStats, SimulationConfig, generate_world, run_simulation};
use shardbound_game::{RngAlgo, TravelConfig, WorldSnapshot, fnv1a};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary for terminals
    Console,
    /// Machine-readable summary and per-seed stats
    Json,
    /// Markdown tables for CI comments
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgoArg {
    Mulberry32,
    Xoshiro128,
}

impl From<AlgoArg> for RngAlgo {
    fn from(value: AlgoArg) -> Self {
        match value {
            AlgoArg::Mulberry32 => Self::Mulberry32,
            AlgoArg::Xoshiro128 => Self::Xoshiro128,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "shardbound-tester", version = "0.1.0")]
#[command(about = "Seeded random-walk sweeps over the Shardbound encounter core")]
struct Args {
    /// Seeds to run (comma-separated; non-numeric seeds are hashed)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Moves attempted per seed
    #[arg(long, default_value_t = 200)]
    steps: usize,

    /// Width of generated shards
    #[arg(long, default_value_t = 24)]
    width: i32,

    /// Height of generated shards
    #[arg(long, default_value_t = 24)]
    height: i32,

    /// Probability that the scripted combat wins a fight
    #[arg(long, default_value_t = 0.7)]
    win_rate: f64,

    /// Generator core for every stream
    #[arg(long, value_enum, default_value_t = AlgoArg::Mulberry32)]
    algo: AlgoArg,

    /// Walk a world snapshot JSON file instead of generated shards
    #[arg(long)]
    world: Option<PathBuf>,

    /// Travel configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    ensure!(
        (0.0..=1.0).contains(&args.win_rate),
        "--win-rate must lie in [0, 1], got {}",
        args.win_rate
    );
    ensure!(
        args.width > 0 && args.height > 0,
        "shard dimensions must be positive"
    );

    if args.report == ReportFormat::Console {
        announce_banner();
    }

    let start_time = Instant::now();
    let seeds = parse_seeds(&args.seeds);
    ensure!(!seeds.is_empty(), "no seeds given");
    let config = load_config(args.config.as_deref())?;
    let fixed_world = args.world.as_deref().map(load_world).transpose()?;

    let runs = run_sweep(&args, &seeds, fixed_world.as_ref(), &config)?;
    write_reports(&args, &runs, start_time)?;

    if runs.iter().any(|r| !r.passed()) {
        std::process::exit(1);
    }
    Ok(())
}

fn announce_banner() {
    println!("{}", "🗡️  Shardbound Encounter Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Numeric tokens are used as-is; anything else is hashed.
fn parse_seeds(input: &str) -> Vec<u32> {
    split_csv(input)
        .iter()
        .map(|token| token.parse().unwrap_or_else(|_| fnv1a(token)))
        .collect()
}

fn load_config(path: Option<&Path>) -> Result<TravelConfig> {
    let Some(path) = path else {
        return Ok(TravelConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = TravelConfig::from_json(&json)
        .with_context(|| format!("invalid travel config in {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("rejected travel config in {}", path.display()))?;
    Ok(config)
}

fn load_world(path: &Path) -> Result<WorldSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    WorldSnapshot::from_json(&json)
        .with_context(|| format!("invalid world snapshot in {}", path.display()))
}

fn run_sweep(
    args: &Args,
    seeds: &[u32],
    fixed_world: Option<&WorldSnapshot>,
    config: &TravelConfig,
) -> Result<Vec<RunStats>> {
    let mut runs = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        let sim = SimulationConfig {
            seed,
            steps: args.steps,
            width: args.width,
            height: args.height,
            win_rate: args.win_rate,
            algo: args.algo.into(),
        };
        let world = fixed_world.cloned().unwrap_or_else(|| {
            generate_world(seed, sim.width, sim.height, sim.algo)
        });
        let run_start = Instant::now();
        let stats = run_simulation(&sim, world, config.clone())
            .with_context(|| format!("seed {seed} failed"))?;
        if args.verbose {
            eprintln!(
                "{} seed {seed}: {} moves, {} ambushes in {:?}",
                "▶".blue(),
                stats.moves,
                stats.ambushes,
                run_start.elapsed()
            );
        }
        runs.push(stats);
    }
    Ok(runs)
}

fn write_reports(args: &Args, runs: &[RunStats], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => logic::reports::generate_json_report(&mut output_target, runs)?,
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(&mut output_target, runs)?;
        }
        ReportFormat::Console => {
            logic::reports::generate_console_report(
                &mut output_target,
                runs,
                start_time.elapsed(),
            )?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            seeds: "1337".to_string(),
            steps: 40,
            width: 12,
            height: 12,
            win_rate: 0.5,
            algo: AlgoArg::Mulberry32,
            world: None,
            config: None,
            report: ReportFormat::Json,
            verbose: false,
            output: None,
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shardbound-{name}-{}", std::process::id()))
    }

    #[test]
    fn seeds_accept_numbers_and_words() {
        let seeds = parse_seeds("7, alpha ,,42");
        assert_eq!(seeds, vec![7, fnv1a("alpha"), 42]);
    }

    #[test]
    fn algo_arg_maps_to_core() {
        assert_eq!(RngAlgo::from(AlgoArg::Xoshiro128), RngAlgo::Xoshiro128);
        assert_eq!(RngAlgo::from(AlgoArg::Mulberry32), RngAlgo::Mulberry32);
    }

    #[test]
    fn missing_config_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), TravelConfig::default());
    }

    #[test]
    fn invalid_config_file_is_reported() {
        let path = temp_file("bad-config.json");
        std::fs::write(&path, r#"{"p_floor": 0.9, "p_ceil": 0.1}"#).unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("rejected travel config"));
    }

    #[test]
    fn fixed_world_is_walked_for_every_seed() {
        let world = generate_world(99, 8, 8, RngAlgo::Mulberry32);
        let args = base_args();
        let runs = run_sweep(&args, &[1, 2], Some(&world), &TravelConfig::default()).unwrap();
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| r.shard_id == world.shard_id));
    }

    #[test]
    fn write_reports_emits_json() {
        let path = temp_file("report.json");
        let args = Args {
            output: Some(path.clone()),
            ..base_args()
        };
        let runs = run_sweep(&args, &[5], None, &TravelConfig::default()).unwrap();
        write_reports(&args, &runs, Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\"summary\""));
    }

    #[test]
    fn write_reports_emits_markdown() {
        let path = temp_file("report.md");
        let args = Args {
            report: ReportFormat::Markdown,
            output: Some(path.clone()),
            ..base_args()
        };
        let runs = run_sweep(&args, &[5], None, &TravelConfig::default()).unwrap();
        write_reports(&args, &runs, Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("| Seed |"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
