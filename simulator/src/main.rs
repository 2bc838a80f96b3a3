use anyhow::{Context, Result};
use clap::Parser;
use martingale_simulator::{canonical_experiments, Experiment, Mode, Runner};
use martingale_types::{Bankroll, SimulationConfig, DEFAULT_SAMPLE_EPISODES, DEFAULT_SEED};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, Level};

fn init_tracing(level: &str) -> Result<()> {
    let level =
        Level::from_str(level).map_err(|_| anyhow::anyhow!("invalid log level: {level}"))?;
    tracing_subscriber::fmt().with_max_level(level).init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML simulation config; runs a single custom experiment.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random stream.
    #[arg(long)]
    seed: Option<u64>,

    /// Episodes in a custom batch.
    #[arg(long)]
    episodes: Option<usize>,

    /// Spins allowed per episode.
    #[arg(long)]
    max_spins: Option<usize>,

    /// Winnings that end an episode in success.
    #[arg(long)]
    target: Option<i64>,

    /// Probability of winning a single spin.
    #[arg(long)]
    win_probability: Option<f64>,

    /// Bankroll for a custom batch (unlimited when omitted).
    #[arg(long)]
    bankroll: Option<u64>,

    /// Episodes in the sample experiment of the canonical set.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_EPISODES)]
    sample_episodes: usize,

    /// Directory for JSON reports.
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Worker threads with per-episode streams (0 uses one shared stream).
    #[arg(long, default_value_t = 0)]
    threads: usize,

    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn is_custom(&self) -> bool {
        self.config.is_some()
            || self.episodes.is_some()
            || self.max_spins.is_some()
            || self.target.is_some()
            || self.win_probability.is_some()
            || self.bankroll.is_some()
    }
}

/// Seed and experiments to run.
#[derive(Debug)]
struct Plan {
    seed: u64,
    experiments: Vec<Experiment>,
}

fn load_config(path: &Path) -> Result<SimulationConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read config file {}", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("could not parse config file {}", path.display()))
}

fn build_plan(args: &Args) -> Result<Plan> {
    if !args.is_custom() {
        let experiments = canonical_experiments(args.sample_episodes);
        for experiment in &experiments {
            experiment
                .validate()
                .with_context(|| format!("invalid experiment {}", experiment.name))?;
        }
        return Ok(Plan {
            seed: args.seed.unwrap_or(DEFAULT_SEED),
            experiments,
        });
    }

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(episodes) = args.episodes {
        config.num_episodes = episodes;
    }
    if let Some(max_spins) = args.max_spins {
        config.max_spins = max_spins;
    }
    if let Some(target) = args.target {
        config.target_winnings = target;
    }
    if let Some(p) = args.win_probability {
        config.win_probability = p;
    }
    if let Some(bankroll) = args.bankroll {
        config.bankroll = Bankroll::Bounded(bankroll);
    }
    config.validate().context("invalid simulation config")?;

    Ok(Plan {
        seed: config.seed,
        experiments: vec![Experiment::from(&config)],
    })
}

#[cfg(feature = "parallel")]
fn build_mode(threads: usize) -> Result<Mode> {
    if threads == 0 {
        return Ok(Mode::Sequential);
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("failed to create thread pool")?;
    Ok(Mode::Parallel(pool))
}

#[cfg(not(feature = "parallel"))]
fn build_mode(threads: usize) -> Result<Mode> {
    if threads == 0 {
        return Ok(Mode::Sequential);
    }
    anyhow::bail!("--threads requires the `parallel` feature")
}

fn main() -> Result<()> {
    // Parse args
    let args = Args::parse();

    // Create logger
    init_tracing(&args.log_level)?;

    let plan = build_plan(&args)?;
    let mode = build_mode(args.threads)?;
    info!(
        seed = plan.seed,
        experiments = plan.experiments.len(),
        threads = args.threads,
        "starting simulation"
    );

    let mut runner = Runner::new(plan.seed, mode);
    let reports = runner
        .run_all(&plan.experiments)
        .context("simulation failed")?;
    for report in &reports {
        let path = report
            .write(&args.output)
            .with_context(|| format!("could not write report {}", report.name))?;
        info!(experiment = %report.name, path = %path.display(), "report written");
    }
    Ok(())
}
