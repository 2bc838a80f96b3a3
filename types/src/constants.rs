/// Probability of winning an even-money bet on an American roulette wheel
/// (18 winning pockets out of 38).
pub const AMERICAN_ROULETTE_WIN_PROBABILITY: f64 = 18.0 / 38.0;

/// Stake placed at the start of every betting cycle.
pub const BASE_BET: i64 = 1;

/// Spins allowed per episode.
pub const DEFAULT_MAX_SPINS: usize = 1_000;

/// Cumulative winnings that end an episode in success.
pub const DEFAULT_TARGET_WINNINGS: i64 = 80;

/// Bankroll used by the bounded-capital experiment.
pub const DEFAULT_BANKROLL: u64 = 256;

/// Episodes per experiment batch.
pub const DEFAULT_EPISODES: usize = 1_000;

/// Episodes in the illustrative sample run.
pub const DEFAULT_SAMPLE_EPISODES: usize = 10;

/// Seed for the shared random stream of the canonical study.
pub const DEFAULT_SEED: u64 = 904_206_790;
