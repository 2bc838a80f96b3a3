use thiserror::Error as ThisError;

/// Parameter and shape errors raised before any simulation work starts.
#[derive(Debug, ThisError, Clone, PartialEq)]
pub enum Error {
    #[error("win probability must be within [0, 1] (got={0})")]
    InvalidWinProbability(f64),
    #[error("max_spins must be at least 1")]
    ZeroMaxSpins,
    #[error("target winnings must be positive (got={0})")]
    NonPositiveTarget(i64),
    #[error("bankroll out of range (got={got}, max={max})")]
    BankrollOutOfRange { got: u64, max: u64 },
    #[error("num_episodes must be at least 1")]
    ZeroEpisodes,
    #[error("trajectory must start at 0 (got={0})")]
    NonZeroStart(i64),
    #[error("trajectory too short (len={0}, min=2)")]
    TrajectoryTooShort(usize),
    #[error("ragged batch: row {row} has len={len}, expected={expected}")]
    RaggedBatch {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("batch is empty")]
    EmptyBatch,
}
