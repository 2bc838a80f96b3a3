//! JSON reports consumed by plotting and write-up tooling.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use martingale_execution::{Band, Batch, SpinStatistics, Summary};
use martingale_types::{EpisodeParams, Trajectory};
use serde::Serialize;
use thiserror::Error;

/// Error type for report writing.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Per-spin series for one experiment.
#[derive(Clone, Debug, Serialize)]
pub struct Series {
    pub mean: Vec<f64>,
    pub median: Vec<f64>,
    pub std_dev: Vec<f64>,
    pub mean_band: Band,
    pub median_band: Band,
}

impl From<SpinStatistics> for Series {
    fn from(stats: SpinStatistics) -> Self {
        let mean_band = stats.mean_band();
        let median_band = stats.median_band();
        Self {
            mean: stats.mean,
            median: stats.median,
            std_dev: stats.std_dev,
            mean_band,
            median_band,
        }
    }
}

/// Everything produced by one experiment.
#[derive(Clone, Debug, Serialize)]
pub struct ExperimentReport {
    pub name: String,
    pub seed: u64,
    pub num_episodes: usize,
    pub params: EpisodeParams,
    pub summary: BTreeMap<String, f64>,
    pub series: Series,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectories: Option<Vec<Trajectory>>,
}

impl ExperimentReport {
    pub fn build(
        name: &str,
        seed: u64,
        params: &EpisodeParams,
        batch: &Batch,
        keep_trajectories: bool,
    ) -> Self {
        let summary = Summary::compute(batch, params);
        Self {
            name: name.to_string(),
            seed,
            num_episodes: batch.num_episodes(),
            params: *params,
            summary: summary.to_map(),
            series: SpinStatistics::compute(batch).into(),
            trajectories: keep_trajectories.then(|| batch.rows().to_vec()),
        }
    }

    /// Look up a summary scalar by name.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.summary.get(name).copied()
    }

    /// Write `<dir>/<name>.json`, creating `dir` if needed.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(format!("{}.json", self.name));
        let encoded = serde_json::to_vec_pretty(self)?;
        fs::write(&path, encoded).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
