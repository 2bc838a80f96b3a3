//! Fixed-length cumulative winnings series.
//!
//! A trajectory holds `max_spins + 1` entries: index 0 is the pre-simulation
//! balance (always 0) and index `i` is the cumulative winnings after spin `i`.
//! Trajectories are only built through [`TrajectoryWriter`], which
//! forward-fills the terminal value when an episode stops early, so a finished
//! trajectory is always full length.

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct Trajectory(Vec<i64>);

impl Trajectory {
    /// Wrap a complete series, checking the shape invariants.
    pub fn from_values(values: Vec<i64>) -> Result<Self, Error> {
        if values.len() < 2 {
            return Err(Error::TrajectoryTooShort(values.len()));
        }
        if values[0] != 0 {
            return Err(Error::NonZeroStart(values[0]));
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Spin budget this trajectory was built for.
    pub fn max_spins(&self) -> usize {
        self.0.len() - 1
    }

    /// Winnings at the end of the spin budget.
    pub fn final_value(&self) -> i64 {
        self.0[self.0.len() - 1]
    }

    pub fn get(&self, spin: usize) -> Option<i64> {
        self.0.get(spin).copied()
    }

    /// First spin index at which the series stops changing, i.e. the spin
    /// from which every later entry equals the final value.
    pub fn settled_at(&self) -> usize {
        let last = self.final_value();
        self.0
            .iter()
            .rposition(|&value| value != last)
            .map_or(0, |index| index + 1)
    }
}

impl TryFrom<Vec<i64>> for Trajectory {
    type Error = Error;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        Self::from_values(values)
    }
}

impl From<Trajectory> for Vec<i64> {
    fn from(value: Trajectory) -> Self {
        value.0
    }
}

impl AsRef<[i64]> for Trajectory {
    fn as_ref(&self) -> &[i64] {
        &self.0
    }
}

/// Append-only builder that guarantees a full-length [`Trajectory`].
#[derive(Debug)]
pub struct TrajectoryWriter {
    values: Vec<i64>,
    len: usize,
}

impl TrajectoryWriter {
    /// Start a series for `max_spins` spins with index 0 set to 0.
    pub fn new(max_spins: usize) -> Self {
        let len = max_spins + 1;
        let mut values = Vec::with_capacity(len);
        values.push(0);
        Self { values, len }
    }

    /// Number of spins recorded so far.
    pub fn spins(&self) -> usize {
        self.values.len() - 1
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.len
    }

    /// Record the winnings after the next spin. Ignored once full.
    pub fn record(&mut self, winnings: i64) {
        if !self.is_full() {
            self.values.push(winnings);
        }
    }

    /// Fill every remaining slot with `value` and finish.
    pub fn fill(mut self, value: i64) -> Trajectory {
        self.values.resize(self.len, value);
        Trajectory(self.values)
    }

    /// Finish a series, forward-filling the last recorded value if any slots
    /// are still empty.
    pub fn finish(self) -> Trajectory {
        let last = self.values[self.values.len() - 1];
        self.fill(last)
    }
}
