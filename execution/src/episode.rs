//! Martingale episode state machine.
//!
//! An episode stakes [`BASE_BET`] on every fresh cycle, doubles the stake
//! after each loss and resets it after each win. With a bounded bankroll the
//! stake is clamped to the capital left before every spin.
//!
//! Terminal states, checked after every spin in this order:
//! 1. cumulative winnings reach the target,
//! 2. cumulative winnings reach the bankroll floor (`-bankroll`),
//! 3. the spin budget is used up.
//!
//! A bounded episode that cannot cover a stake of at least 1 stops before
//! spinning ([`Terminal::Bankrupt`]). When an episode stops early the
//! remaining trajectory slots are filled with the terminal value as the
//! episode stops.

use martingale_types::{EpisodeParams, Error, Trajectory, TrajectoryWriter, BASE_BET};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::spin;

/// How an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Terminal {
    /// Winnings reached the target on `spin`.
    TargetReached { spin: usize },
    /// Winnings reached the bankroll floor on `spin`.
    Ruined { spin: usize },
    /// No capital left to stake after `spin` spins.
    Bankrupt { spin: usize },
    /// Every spin in the budget was played.
    SpinBudgetExhausted,
}

impl Terminal {
    /// Number of spins played before the episode stopped.
    pub fn spins(&self, max_spins: usize) -> usize {
        match *self {
            Self::TargetReached { spin } | Self::Ruined { spin } | Self::Bankrupt { spin } => spin,
            Self::SpinBudgetExhausted => max_spins,
        }
    }
}

/// Finished episode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    pub trajectory: Trajectory,
    pub terminal: Terminal,
}

/// Betting state for one episode.
pub struct Episode {
    params: EpisodeParams,
    winnings: i64,
    bet: i64,
    spins: usize,
    writer: Option<TrajectoryWriter>,
    outcome: Option<EpisodeOutcome>,
}

impl Episode {
    /// Start an episode, rejecting invalid parameters.
    pub fn new(params: EpisodeParams) -> Result<Self, Error> {
        params.validate()?;
        Ok(Self::new_unchecked(params))
    }

    pub(crate) fn new_unchecked(params: EpisodeParams) -> Self {
        Self {
            params,
            winnings: 0,
            bet: BASE_BET,
            spins: 0,
            writer: Some(TrajectoryWriter::new(params.max_spins)),
            outcome: None,
        }
    }

    /// Cumulative winnings after the spins played so far.
    pub fn winnings(&self) -> i64 {
        self.winnings
    }

    /// Stake for the next spin, before any bankroll clamp.
    pub fn current_bet(&self) -> i64 {
        self.bet
    }

    pub fn spins(&self) -> usize {
        self.spins
    }

    pub fn terminal(&self) -> Option<Terminal> {
        self.outcome.as_ref().map(|outcome| outcome.terminal)
    }

    /// Play one spin.
    ///
    /// Returns the terminal state once the episode has stopped; further calls
    /// return the same state without drawing from `rng`.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Terminal> {
        if let Some(terminal) = self.terminal() {
            return Some(terminal);
        }

        if let Some(remaining) = self.params.bankroll.remaining(self.winnings) {
            self.bet = self.bet.min(remaining);
            if self.bet <= 0 {
                let spin = self.spins;
                return Some(self.stop(Terminal::Bankrupt { spin }, self.winnings));
            }
        }

        let won = spin::spin(rng, self.params.win_probability);
        self.spins += 1;
        if won {
            self.winnings = self.winnings.saturating_add(self.bet);
            self.bet = BASE_BET;
        } else {
            self.winnings = self.winnings.saturating_sub(self.bet);
            self.bet = self.bet.saturating_mul(2);
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.record(self.winnings);
        }

        let spin = self.spins;
        if self.winnings >= self.params.target_winnings {
            return Some(self.stop(Terminal::TargetReached { spin }, self.winnings));
        }
        if let Some(floor) = self.params.bankroll.floor() {
            if self.winnings <= floor {
                return Some(self.stop(Terminal::Ruined { spin }, floor));
            }
        }
        if self.spins >= self.params.max_spins {
            return Some(self.stop(Terminal::SpinBudgetExhausted, self.winnings));
        }
        None
    }

    fn stop(&mut self, terminal: Terminal, fill: i64) -> Terminal {
        if let Some(writer) = self.writer.take() {
            self.outcome = Some(EpisodeOutcome {
                trajectory: writer.fill(fill),
                terminal,
            });
        }
        terminal
    }

    /// Play until a terminal state is reached.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> EpisodeOutcome {
        loop {
            self.step(rng);
            if let Some(outcome) = self.outcome.take() {
                return outcome;
            }
        }
    }

    /// Outcome of a finished episode, or `None` while still betting.
    pub fn into_outcome(self) -> Option<EpisodeOutcome> {
        self.outcome
    }
}

/// Run one episode and return its trajectory.
pub fn run_episode<R: Rng + ?Sized>(
    rng: &mut R,
    params: &EpisodeParams,
) -> Result<Trajectory, Error> {
    Ok(run_episode_with_outcome(rng, params)?.trajectory)
}

/// Run one episode and return its trajectory and terminal state.
pub fn run_episode_with_outcome<R: Rng + ?Sized>(
    rng: &mut R,
    params: &EpisodeParams,
) -> Result<EpisodeOutcome, Error> {
    Ok(Episode::new(*params)?.run(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;
    use crate::spin::tests::CountingRng;
    use martingale_types::{Bankroll, AMERICAN_ROULETTE_WIN_PROBABILITY};
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;

    fn params(
        win_probability: f64,
        max_spins: usize,
        target: i64,
        bankroll: Bankroll,
    ) -> EpisodeParams {
        EpisodeParams {
            win_probability,
            max_spins,
            target_winnings: target,
            bankroll,
        }
    }

    fn play<R: Rng + ?Sized>(rng: &mut R, params: EpisodeParams) -> EpisodeOutcome {
        run_episode_with_outcome(rng, &params).unwrap()
    }

    /// Every draw is 0.0, so any probability wins.
    fn always_win() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every draw is just below 1.0, so any probability below 1 loses.
    fn always_lose() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_rejects_invalid_params() {
        let mut rng = seeded_rng(1);
        let result = run_episode(&mut rng, &params(1.5, 10, 80, Bankroll::Unlimited));
        assert_eq!(result, Err(Error::InvalidWinProbability(1.5)));
        let result = run_episode(&mut rng, &params(0.5, 0, 80, Bankroll::Unlimited));
        assert_eq!(result, Err(Error::ZeroMaxSpins));
        let result = run_episode(&mut rng, &params(0.5, 10, 0, Bankroll::Bounded(5)));
        assert_eq!(result, Err(Error::NonPositiveTarget(0)));
    }

    #[test]
    fn test_invalid_params_draw_nothing() {
        let mut rng = CountingRng::new(seeded_rng(1));
        let _ = run_episode(&mut rng, &params(-0.1, 10, 80, Bankroll::Unlimited));
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn test_certain_win_reaches_target_on_first_spin() {
        let mut rng = always_win();
        let outcome = play(&mut rng, params(1.0, 5, 1, Bankroll::Unlimited));
        assert_eq!(outcome.trajectory.as_slice(), &[0, 1, 1, 1, 1, 1]);
        assert_eq!(outcome.terminal, Terminal::TargetReached { spin: 1 });
    }

    #[test]
    fn test_certain_win_climbs_one_per_spin() {
        let mut rng = seeded_rng(3);
        let outcome = play(&mut rng, params(1.0, 1_000, 80, Bankroll::Unlimited));
        let values = outcome.trajectory.as_slice();
        assert_eq!(values.len(), 1_001);
        for (spin, value) in values.iter().enumerate().take(81) {
            assert_eq!(*value, spin as i64);
        }
        assert!(values[80..].iter().all(|&v| v == 80));
        assert_eq!(outcome.terminal, Terminal::TargetReached { spin: 80 });
    }

    #[test]
    fn test_certain_loss_ruins_at_bankroll() {
        let mut rng = always_lose();
        let outcome = play(&mut rng, params(0.0, 20, 80, Bankroll::Bounded(256)));
        let expected: Vec<i64> = vec![0, -1, -3, -7, -15, -31, -63, -127, -255, -256]
            .into_iter()
            .chain(std::iter::repeat(-256).take(11))
            .collect();
        assert_eq!(outcome.trajectory.as_slice(), expected.as_slice());
        assert_eq!(outcome.terminal, Terminal::Ruined { spin: 9 });
    }

    #[test]
    fn test_zero_bankroll_ends_before_first_spin() {
        let mut rng = CountingRng::new(seeded_rng(1));
        let outcome = play(&mut rng, params(0.5, 10, 80, Bankroll::Bounded(0)));
        assert_eq!(outcome.trajectory.as_slice(), &[0; 11]);
        assert_eq!(outcome.terminal, Terminal::Bankrupt { spin: 0 });
        assert_eq!(outcome.terminal.spins(10), 0);
        assert_eq!(rng.draws, 0);

        let mut episode = Episode::new(params(1.0, 3, 1, Bankroll::Bounded(0))).unwrap();
        assert_eq!(episode.step(&mut always_win()), Some(Terminal::Bankrupt { spin: 0 }));
        assert_eq!(episode.winnings(), 0);
        assert_eq!(episode.current_bet(), 0);
    }

    #[test]
    fn test_bet_is_clamped_to_remaining_capital() {
        let mut rng = always_lose();
        let outcome = play(&mut rng, params(0.0, 10, 80, Bankroll::Bounded(100)));
        assert_eq!(
            outcome.trajectory.as_slice(),
            &[0, -1, -3, -7, -15, -31, -63, -100, -100, -100, -100]
        );
        assert_eq!(outcome.terminal, Terminal::Ruined { spin: 7 });
    }

    #[test]
    fn test_unlimited_certain_loss_never_ruins() {
        let mut rng = always_lose();
        let outcome = play(&mut rng, params(0.0, 100, 80, Bankroll::Unlimited));
        let values = outcome.trajectory.as_slice();
        assert_eq!(values.len(), 101);
        assert_eq!(values[10], -1023);
        assert_eq!(values[62], -(2i64.pow(62) - 1));
        assert!(values.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(values[100], i64::MIN);
        assert_eq!(outcome.terminal, Terminal::SpinBudgetExhausted);
    }

    #[test]
    fn test_budget_exhausted_without_fill() {
        let mut rng = always_lose();
        let outcome = play(&mut rng, params(0.0, 3, 80, Bankroll::Unlimited));
        assert_eq!(outcome.trajectory.as_slice(), &[0, -1, -3, -7]);
        assert_eq!(outcome.terminal, Terminal::SpinBudgetExhausted);
        assert_eq!(outcome.terminal.spins(3), 3);
    }

    #[test]
    fn test_target_takes_precedence_on_last_spin() {
        let mut rng = always_win();
        let outcome = play(&mut rng, params(1.0, 2, 2, Bankroll::Unlimited));
        assert_eq!(outcome.trajectory.as_slice(), &[0, 1, 2]);
        assert_eq!(outcome.terminal, Terminal::TargetReached { spin: 2 });
    }

    #[test]
    fn test_step_exposes_bet_sizing() {
        let mut episode = Episode::new(params(0.0, 10, 80, Bankroll::Unlimited)).unwrap();
        let mut rng = always_lose();
        assert_eq!(episode.current_bet(), 1);
        assert_eq!(episode.step(&mut rng), None);
        assert_eq!(episode.current_bet(), 2);
        assert_eq!(episode.step(&mut rng), None);
        assert_eq!(episode.current_bet(), 4);
        assert_eq!(episode.winnings(), -3);
        assert_eq!(episode.spins(), 2);

        let mut rng = always_win();
        episode.step(&mut rng);
        assert_eq!(episode.winnings(), 1);
        assert_eq!(episode.current_bet(), 1);
    }

    #[test]
    fn test_finished_episode_draws_nothing() {
        let mut episode = Episode::new(params(1.0, 10, 1, Bankroll::Unlimited)).unwrap();
        let mut rng = CountingRng::new(always_win());
        assert_eq!(episode.step(&mut rng), Some(Terminal::TargetReached { spin: 1 }));
        assert_eq!(episode.step(&mut rng), Some(Terminal::TargetReached { spin: 1 }));
        assert_eq!(rng.draws, 1);
        assert!(episode.into_outcome().is_some());
    }

    #[test]
    fn test_one_draw_per_spin() {
        let mut rng = CountingRng::new(always_lose());
        let outcome = play(&mut rng, params(0.0, 50, 80, Bankroll::Bounded(256)));
        assert_eq!(rng.draws, outcome.terminal.spins(50));
    }

    #[test]
    fn test_seeded_episode_is_reproducible() {
        let p = params(AMERICAN_ROULETTE_WIN_PROBABILITY, 1_000, 80, Bankroll::Unlimited);
        let a = run_episode(&mut seeded_rng(693), &p).unwrap();
        let b = run_episode(&mut seeded_rng(693), &p).unwrap();
        assert_eq!(a, b);
    }

    fn arb_params() -> impl Strategy<Value = EpisodeParams> {
        arb_params_up_to(300)
    }

    /// Spin budgets under 62 keep unlimited-bankroll losses clear of saturation.
    fn arb_params_up_to(max_spins: usize) -> impl Strategy<Value = EpisodeParams> {
        (
            0.0f64..=1.0,
            1usize..max_spins,
            1i64..120,
            prop::option::of(0u64..600),
        )
            .prop_map(|(p, max_spins, target, bankroll)| {
                params(p, max_spins, target, Bankroll::from(bankroll))
            })
    }

    proptest! {
        #[test]
        fn trajectory_shape_holds(p in arb_params(), seed in any::<u64>()) {
            let outcome = run_episode_with_outcome(&mut seeded_rng(seed), &p).unwrap();
            let values = outcome.trajectory.as_slice();
            prop_assert_eq!(values.len(), p.max_spins + 1);
            prop_assert_eq!(values[0], 0);
        }

        #[test]
        fn target_is_forward_filled(p in arb_params(), seed in any::<u64>()) {
            let outcome = run_episode_with_outcome(&mut seeded_rng(seed), &p).unwrap();
            let values = outcome.trajectory.as_slice();
            if let Some(first) = values.iter().position(|&v| v >= p.target_winnings) {
                prop_assert_eq!(outcome.terminal, Terminal::TargetReached { spin: first });
                prop_assert!(values[first..].iter().all(|&v| v == values[first]));
            }
        }

        #[test]
        fn bankroll_floor_holds(p in arb_params(), seed in any::<u64>()) {
            let outcome = run_episode_with_outcome(&mut seeded_rng(seed), &p).unwrap();
            if let Some(floor) = p.bankroll.floor() {
                prop_assert!(outcome.trajectory.as_slice().iter().all(|&v| v >= floor));
                if let Terminal::Ruined { spin } = outcome.terminal {
                    prop_assert!(outcome.trajectory.as_slice()[spin..].iter().all(|&v| v == floor));
                }
            }
        }

        #[test]
        fn bet_doubles_on_loss_and_resets_on_win(p in arb_params_up_to(60), seed in any::<u64>()) {
            let mut rng = seeded_rng(seed);
            let mut episode = Episode::new(p).unwrap();
            loop {
                let before = episode.winnings();
                let staked = match p.bankroll.remaining(before) {
                    Some(remaining) => episode.current_bet().min(remaining),
                    None => episode.current_bet(),
                };
                let spins = episode.spins();
                let terminal = episode.step(&mut rng);
                if episode.spins() == spins {
                    break;
                }
                let delta = episode.winnings() - before;
                if delta > 0 {
                    prop_assert_eq!(delta, staked);
                    prop_assert_eq!(episode.current_bet(), BASE_BET);
                } else {
                    prop_assert_eq!(delta, -staked);
                    prop_assert_eq!(episode.current_bet(), staked * 2);
                }
                if terminal.is_some() {
                    break;
                }
            }
        }
    }
}
