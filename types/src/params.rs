use serde::{Deserialize, Serialize};

use crate::{
    Error, AMERICAN_ROULETTE_WIN_PROBABILITY, DEFAULT_EPISODES, DEFAULT_MAX_SPINS, DEFAULT_SEED,
    DEFAULT_TARGET_WINNINGS,
};

/// Largest bankroll whose floor (`-amount`) fits in an `i64`.
pub const MAX_BANKROLL: u64 = i64::MAX as u64;

/// Capital available to cover losses during an episode.
///
/// Serialized as an optional integer: `null` (or a missing field) is
/// [`Bankroll::Unlimited`], any number is [`Bankroll::Bounded`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum Bankroll {
    /// Losses are never capped and bets are never clamped.
    #[default]
    Unlimited,
    /// Cumulative loss may not exceed this amount. A zero bankroll cannot
    /// cover any stake, so every episode ends before the first spin.
    Bounded(u64),
}

impl From<Option<u64>> for Bankroll {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(amount) => Self::Bounded(amount),
            None => Self::Unlimited,
        }
    }
}

impl From<Bankroll> for Option<u64> {
    fn from(value: Bankroll) -> Self {
        match value {
            Bankroll::Unlimited => None,
            Bankroll::Bounded(amount) => Some(amount),
        }
    }
}

impl Bankroll {
    pub fn validate(self) -> Result<(), Error> {
        match self {
            Self::Unlimited => Ok(()),
            Self::Bounded(amount) if amount > MAX_BANKROLL => Err(Error::BankrollOutOfRange {
                got: amount,
                max: MAX_BANKROLL,
            }),
            Self::Bounded(_) => Ok(()),
        }
    }

    /// Lowest cumulative winnings an episode may reach (`-amount`), if bounded.
    pub fn floor(self) -> Option<i64> {
        match self {
            Self::Unlimited => None,
            Self::Bounded(amount) => Some(-Self::amount_i64(amount)),
        }
    }

    /// Capital left to stake given the current cumulative winnings, if bounded.
    pub fn remaining(self, winnings: i64) -> Option<i64> {
        match self {
            Self::Unlimited => None,
            Self::Bounded(amount) => Some(Self::amount_i64(amount).saturating_add(winnings)),
        }
    }

    fn amount_i64(amount: u64) -> i64 {
        i64::try_from(amount).unwrap_or(i64::MAX)
    }
}

/// Parameters for a single episode.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeParams {
    pub win_probability: f64,
    pub max_spins: usize,
    pub target_winnings: i64,
    #[serde(default)]
    pub bankroll: Bankroll,
}

impl Default for EpisodeParams {
    fn default() -> Self {
        Self {
            win_probability: AMERICAN_ROULETTE_WIN_PROBABILITY,
            max_spins: DEFAULT_MAX_SPINS,
            target_winnings: DEFAULT_TARGET_WINNINGS,
            bankroll: Bankroll::Unlimited,
        }
    }
}

impl EpisodeParams {
    pub fn with_bankroll(self, bankroll: Bankroll) -> Self {
        Self { bankroll, ..self }
    }

    /// Rejects parameters outside their documented domain.
    ///
    /// A NaN probability fails the range check.
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.win_probability) {
            return Err(Error::InvalidWinProbability(self.win_probability));
        }
        if self.max_spins == 0 {
            return Err(Error::ZeroMaxSpins);
        }
        if self.target_winnings <= 0 {
            return Err(Error::NonPositiveTarget(self.target_winnings));
        }
        self.bankroll.validate()
    }

    /// Length of every trajectory produced with these parameters.
    pub fn trajectory_len(&self) -> usize {
        self.max_spins + 1
    }
}

fn default_win_probability() -> f64 {
    AMERICAN_ROULETTE_WIN_PROBABILITY
}

fn default_max_spins() -> usize {
    DEFAULT_MAX_SPINS
}

fn default_target_winnings() -> i64 {
    DEFAULT_TARGET_WINNINGS
}

fn default_num_episodes() -> usize {
    DEFAULT_EPISODES
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// Full simulation configuration, as read from a config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_win_probability")]
    pub win_probability: f64,
    #[serde(default = "default_max_spins")]
    pub max_spins: usize,
    #[serde(default = "default_target_winnings")]
    pub target_winnings: i64,
    #[serde(default)]
    pub bankroll: Bankroll,
    #[serde(default = "default_num_episodes")]
    pub num_episodes: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            win_probability: default_win_probability(),
            max_spins: default_max_spins(),
            target_winnings: default_target_winnings(),
            bankroll: Bankroll::Unlimited,
            num_episodes: default_num_episodes(),
            seed: default_seed(),
        }
    }
}

impl SimulationConfig {
    pub fn episode_params(&self) -> EpisodeParams {
        EpisodeParams {
            win_probability: self.win_probability,
            max_spins: self.max_spins,
            target_winnings: self.target_winnings,
            bankroll: self.bankroll,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.episode_params().validate()?;
        if self.num_episodes == 0 {
            return Err(Error::ZeroEpisodes);
        }
        Ok(())
    }
}
