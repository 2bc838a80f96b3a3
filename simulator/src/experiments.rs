//! Experiment definitions and the runner that executes them.
//!
//! The canonical set reproduces the classic roulette study: a handful of
//! sample episodes with an unlimited bankroll, then two large batches with
//! and without a bankroll. In sequential mode all experiments share one
//! stream seeded once, in the order they are listed.

use martingale_execution::{run_batch, seeded_rng};
use martingale_types::{
    Bankroll, EpisodeParams, Error, SimulationConfig, DEFAULT_BANKROLL, DEFAULT_EPISODES,
    DEFAULT_SAMPLE_EPISODES,
};
use rand_chacha::ChaCha20Rng;
use tracing::info;

use crate::report::ExperimentReport;

/// One batch to simulate and report.
#[derive(Clone, Debug, PartialEq)]
pub struct Experiment {
    pub name: String,
    pub params: EpisodeParams,
    pub num_episodes: usize,
    /// Include raw trajectories in the report.
    pub keep_trajectories: bool,
}

impl Experiment {
    pub fn validate(&self) -> Result<(), Error> {
        self.params.validate()?;
        if self.num_episodes == 0 {
            return Err(Error::ZeroEpisodes);
        }
        Ok(())
    }
}

/// The sample, unlimited-bankroll and bounded-bankroll experiments.
pub fn canonical_experiments(sample_episodes: usize) -> Vec<Experiment> {
    let unlimited = EpisodeParams::default();
    let bounded = unlimited.with_bankroll(Bankroll::Bounded(DEFAULT_BANKROLL));
    vec![
        Experiment {
            name: "sample".to_string(),
            params: unlimited,
            num_episodes: sample_episodes,
            keep_trajectories: true,
        },
        Experiment {
            name: "unlimited".to_string(),
            params: unlimited,
            num_episodes: DEFAULT_EPISODES,
            keep_trajectories: false,
        },
        Experiment {
            name: "bounded".to_string(),
            params: bounded,
            num_episodes: DEFAULT_EPISODES,
            keep_trajectories: false,
        },
    ]
}

impl Default for Experiment {
    fn default() -> Self {
        Self {
            name: "custom".to_string(),
            params: EpisodeParams::default(),
            num_episodes: DEFAULT_EPISODES,
            keep_trajectories: false,
        }
    }
}

impl From<&SimulationConfig> for Experiment {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            params: config.episode_params(),
            num_episodes: config.num_episodes,
            ..Default::default()
        }
    }
}

/// How batches draw randomness.
pub enum Mode {
    /// One shared stream consumed in spin order.
    Sequential,
    /// Per-episode streams on a rayon pool; experiment `i` uses `seed + i`.
    #[cfg(feature = "parallel")]
    Parallel(rayon::ThreadPool),
}

/// Runs experiments in order against a single seed.
pub struct Runner {
    seed: u64,
    mode: Mode,
    rng: ChaCha20Rng,
    completed: u64,
}

impl Runner {
    pub fn new(seed: u64, mode: Mode) -> Self {
        Self {
            seed,
            mode,
            rng: seeded_rng(seed),
            completed: 0,
        }
    }

    pub fn run(&mut self, experiment: &Experiment) -> Result<ExperimentReport, Error> {
        experiment.validate()?;
        let batch = match &self.mode {
            Mode::Sequential => {
                run_batch(&mut self.rng, &experiment.params, experiment.num_episodes)?
            }
            #[cfg(feature = "parallel")]
            Mode::Parallel(pool) => martingale_execution::run_batch_parallel(
                pool,
                self.seed.wrapping_add(self.completed),
                &experiment.params,
                experiment.num_episodes,
            )?,
        };
        self.completed += 1;

        let report = ExperimentReport::build(
            &experiment.name,
            self.seed,
            &experiment.params,
            &batch,
            experiment.keep_trajectories,
        );
        info!(
            experiment = %experiment.name,
            episodes = experiment.num_episodes,
            bankroll = ?experiment.params.bankroll,
            success_probability = report.scalar("success_probability"),
            exact_target_probability = report.scalar("exact_target_probability"),
            expected_winnings = report.scalar("expected_winnings"),
            std_dev_winnings = report.scalar("std_dev_winnings"),
            "experiment complete"
        );
        Ok(report)
    }

    /// Run every experiment, stopping at the first failure.
    pub fn run_all(&mut self, experiments: &[Experiment]) -> Result<Vec<ExperimentReport>, Error> {
        experiments.iter().map(|experiment| self.run(experiment)).collect()
    }
}
