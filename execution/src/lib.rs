//! Martingale execution engine.
//!
//! This crate contains the betting state machine and the batch machinery used
//! by the simulator binary.
//!
//! ## Determinism requirements
//! - Every function that draws takes the generator explicitly; nothing reads
//!   process-wide random state.
//! - Each spin consumes exactly one draw, in spin order, so a fixed seed
//!   reproduces every trajectory of a sequential batch.
//! - Statistics never mutate the batch they summarize.
//!
//! ## Minimal pipeline (example)
//! ```rust
//! use martingale_execution::{run_batch, seeded_rng, SpinStatistics, Summary};
//! use martingale_types::{Bankroll, EpisodeParams};
//!
//! let params = EpisodeParams::default().with_bankroll(Bankroll::Bounded(256));
//! let mut rng = seeded_rng(693);
//! let batch = run_batch(&mut rng, &params, 100).unwrap();
//! let series = SpinStatistics::compute(&batch);
//! let summary = Summary::compute(&batch, &params);
//! assert_eq!(series.mean.len(), params.max_spins + 1);
//! assert!(summary.success_probability <= 1.0);
//! ```

pub mod batch;
pub mod episode;
pub mod rng;
pub mod spin;
pub mod statistics;

pub use batch::{run_batch, run_batch_with_streams, Batch};
#[cfg(feature = "parallel")]
pub use batch::run_batch_parallel;
pub use episode::{
    run_episode, run_episode_with_outcome, Episode, EpisodeOutcome, Terminal,
};
pub use rng::{episode_rng, seeded_rng};
pub use spin::spin;
pub use statistics::{Band, SpinStatistics, Summary};
