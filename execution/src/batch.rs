//! Batches of independent episodes.
//!
//! [`run_batch`] is the reference: every episode draws from the caller's
//! generator in order, so one seed reproduces the whole batch.
//! [`run_batch_with_streams`] gives each episode its own stream derived from
//! the seed and the episode index, which makes the rows independent of the
//! order they are computed in. The `parallel` feature adds
//! [`run_batch_parallel`], which produces exactly the rows of
//! [`run_batch_with_streams`] but is not row-for-row comparable to
//! [`run_batch`].

use martingale_types::{EpisodeParams, Error, Trajectory};
use rand::Rng;
use tracing::debug;

use crate::episode::{Episode, EpisodeOutcome, Terminal};
use crate::rng::episode_rng;

/// Trajectories of a batch, one row per episode, all of equal length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    rows: Vec<Trajectory>,
    terminals: Option<Vec<Terminal>>,
}

impl Batch {
    /// Assemble a batch from precomputed trajectories.
    pub fn from_rows(rows: Vec<Trajectory>) -> Result<Self, Error> {
        let Some(first) = rows.first() else {
            return Err(Error::EmptyBatch);
        };
        let expected = first.len();
        if let Some((row, trajectory)) = rows
            .iter()
            .enumerate()
            .find(|(_, trajectory)| trajectory.len() != expected)
        {
            return Err(Error::RaggedBatch {
                row,
                len: trajectory.len(),
                expected,
            });
        }
        Ok(Self {
            rows,
            terminals: None,
        })
    }

    fn from_outcomes(outcomes: Vec<EpisodeOutcome>) -> Self {
        let (rows, terminals): (Vec<_>, Vec<_>) = outcomes
            .into_iter()
            .map(|outcome| (outcome.trajectory, outcome.terminal))
            .unzip();
        Self {
            rows,
            terminals: Some(terminals),
        }
    }

    pub fn rows(&self) -> &[Trajectory] {
        &self.rows
    }

    /// Terminal state of each row, when the batch was simulated here.
    pub fn terminals(&self) -> Option<&[Terminal]> {
        self.terminals.as_deref()
    }

    pub fn num_episodes(&self) -> usize {
        self.rows.len()
    }

    /// Length shared by every row (`max_spins + 1`).
    pub fn trajectory_len(&self) -> usize {
        self.rows[0].len()
    }

    pub fn max_spins(&self) -> usize {
        self.trajectory_len() - 1
    }

    /// Values of every row at `spin`.
    pub fn column(&self, spin: usize) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().map(move |row| row.as_slice()[spin])
    }

    /// Terminal winnings of every row.
    pub fn final_column(&self) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().map(Trajectory::final_value)
    }
}

fn validate(params: &EpisodeParams, num_episodes: usize) -> Result<(), Error> {
    params.validate()?;
    if num_episodes == 0 {
        return Err(Error::ZeroEpisodes);
    }
    Ok(())
}

/// Run `num_episodes` episodes drawing sequentially from `rng`.
pub fn run_batch<R: Rng + ?Sized>(
    rng: &mut R,
    params: &EpisodeParams,
    num_episodes: usize,
) -> Result<Batch, Error> {
    validate(params, num_episodes)?;
    let outcomes: Vec<EpisodeOutcome> = (0..num_episodes)
        .map(|_| Episode::new_unchecked(*params).run(rng))
        .collect();
    debug!(
        num_episodes,
        max_spins = params.max_spins,
        bankroll = ?params.bankroll,
        "batch complete"
    );
    Ok(Batch::from_outcomes(outcomes))
}

/// Run `num_episodes` episodes, each on its own stream derived from `seed`.
pub fn run_batch_with_streams(
    seed: u64,
    params: &EpisodeParams,
    num_episodes: usize,
) -> Result<Batch, Error> {
    validate(params, num_episodes)?;
    let outcomes: Vec<EpisodeOutcome> = (0..num_episodes)
        .map(|index| Episode::new_unchecked(*params).run(&mut episode_rng(seed, index)))
        .collect();
    debug!(num_episodes, seed, "stream batch complete");
    Ok(Batch::from_outcomes(outcomes))
}

/// Parallel version of [`run_batch_with_streams`] on a rayon pool.
#[cfg(feature = "parallel")]
pub fn run_batch_parallel(
    pool: &rayon::ThreadPool,
    seed: u64,
    params: &EpisodeParams,
    num_episodes: usize,
) -> Result<Batch, Error> {
    use rayon::prelude::*;

    validate(params, num_episodes)?;
    let outcomes: Vec<EpisodeOutcome> = pool.install(|| {
        (0..num_episodes)
            .into_par_iter()
            .map(|index| Episode::new_unchecked(*params).run(&mut episode_rng(seed, index)))
            .collect()
    });
    debug!(
        num_episodes,
        seed,
        threads = pool.current_num_threads(),
        "parallel batch complete"
    );
    Ok(Batch::from_outcomes(outcomes))
}
