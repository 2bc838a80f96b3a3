//! Driver for martingale roulette experiments.
//!
//! Runs [`Experiment`]s through the execution engine and turns each batch
//! into an [`ExperimentReport`] holding the per-spin series and the flat
//! summary mapping.

mod experiments;
pub use experiments::{canonical_experiments, Experiment, Mode, Runner};

mod report;
pub use report::{ExperimentReport, ReportError, Series};
