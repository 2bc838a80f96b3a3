//! Common types for the martingale simulator.
//!
//! Holds the episode parameters, the [`Bankroll`] variant, the fixed-length
//! [`Trajectory`] series and the validation [`Error`] shared by the execution
//! engine and the simulator binary.

mod constants;
pub use constants::*;

mod error;
pub use error::Error;

pub mod params;
pub use params::{Bankroll, EpisodeParams, SimulationConfig, MAX_BANKROLL};

pub mod trajectory;
pub use trajectory::{Trajectory, TrajectoryWriter};
