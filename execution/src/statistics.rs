//! Cross-episode statistics.
//!
//! Everything here is a read-only reduction over a [`Batch`]: per-spin series
//! for charting and a [`Summary`] of terminal outcomes for reporting.
//! Standard deviations use the population formula (divisor N).

use std::collections::BTreeMap;

use martingale_types::EpisodeParams;
use serde::Serialize;

use crate::batch::Batch;

/// Arithmetic mean.
pub fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn population_std_dev(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values
        .iter()
        .map(|&v| {
            let diff = v as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Median; the mean of the two middle values for even lengths.
///
/// Sorts `values` in place.
pub fn median(values: &mut [i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid] as f64
    } else {
        (values[mid - 1] as f64 + values[mid] as f64) / 2.0
    }
}

/// Upper and lower envelope around a central series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Band {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Band {
    fn around(center: &[f64], spread: &[f64]) -> Self {
        let (lower, upper): (Vec<f64>, Vec<f64>) = center
            .iter()
            .zip(spread)
            .map(|(c, s)| (c - s, c + s))
            .unzip();
        Self { lower, upper }
    }
}

/// Per-spin mean, median and standard deviation across a batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpinStatistics {
    pub mean: Vec<f64>,
    pub median: Vec<f64>,
    pub std_dev: Vec<f64>,
}

impl SpinStatistics {
    pub fn compute(batch: &Batch) -> Self {
        let len = batch.trajectory_len();
        let mut mean_series = Vec::with_capacity(len);
        let mut median_series = Vec::with_capacity(len);
        let mut std_series = Vec::with_capacity(len);

        let mut column = Vec::with_capacity(batch.num_episodes());
        for spin in 0..len {
            column.clear();
            column.extend(batch.column(spin));
            mean_series.push(mean(&column));
            std_series.push(population_std_dev(&column));
            median_series.push(median(&mut column));
        }

        Self {
            mean: mean_series,
            median: median_series,
            std_dev: std_series,
        }
    }

    /// `mean ± std_dev` at every spin.
    pub fn mean_band(&self) -> Band {
        Band::around(&self.mean, &self.std_dev)
    }

    /// `median ± std_dev` at every spin.
    pub fn median_band(&self) -> Band {
        Band::around(&self.median, &self.std_dev)
    }
}

/// Terminal-outcome scalars for a batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub episodes: usize,
    pub target_winnings: i64,
    /// Share of episodes ending with winnings `>= target`.
    pub success_probability: f64,
    /// Share of episodes ending with winnings exactly `== target`.
    pub exact_target_probability: f64,
    pub expected_winnings: f64,
    pub std_dev_winnings: f64,
    pub median_winnings: f64,
    /// Share of episodes ending at the bankroll floor (bounded bankroll only).
    pub ruin_probability: Option<f64>,
    /// Mean spins played before stopping. Batches assembled from raw rows
    /// fall back to the spin at which each row stops changing.
    pub mean_spins: f64,
}

impl Summary {
    pub fn compute(batch: &Batch, params: &EpisodeParams) -> Self {
        let mut terminal: Vec<i64> = batch.final_column().collect();
        let n = terminal.len() as f64;
        let target = params.target_winnings;
        let share = |count: usize| count as f64 / n;

        let success_probability = share(terminal.iter().filter(|&&v| v >= target).count());
        let exact_target_probability = share(terminal.iter().filter(|&&v| v == target).count());
        let ruin_probability = params
            .bankroll
            .floor()
            .map(|floor| share(terminal.iter().filter(|&&v| v <= floor).count()));
        let max_spins = batch.max_spins();
        let spins_played: f64 = match batch.terminals() {
            Some(terminals) => terminals.iter().map(|t| t.spins(max_spins) as f64).sum(),
            None => batch.rows().iter().map(|row| row.settled_at() as f64).sum(),
        };
        let mean_spins = spins_played / n;

        Self {
            episodes: terminal.len(),
            target_winnings: target,
            success_probability,
            exact_target_probability,
            expected_winnings: mean(&terminal),
            std_dev_winnings: population_std_dev(&terminal),
            median_winnings: median(&mut terminal),
            ruin_probability,
            mean_spins,
        }
    }

    /// Flat name → value mapping for report writers.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert("episodes".to_string(), self.episodes as f64);
        map.insert("target_winnings".to_string(), self.target_winnings as f64);
        map.insert(
            "success_probability".to_string(),
            self.success_probability,
        );
        map.insert(
            "exact_target_probability".to_string(),
            self.exact_target_probability,
        );
        map.insert("expected_winnings".to_string(), self.expected_winnings);
        map.insert("std_dev_winnings".to_string(), self.std_dev_winnings);
        map.insert("median_winnings".to_string(), self.median_winnings);
        if let Some(ruin) = self.ruin_probability {
            map.insert("ruin_probability".to_string(), ruin);
        }
        map.insert("mean_spins".to_string(), self.mean_spins);
        map
    }
}
