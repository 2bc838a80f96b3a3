//! Single-trial outcome generation.

use rand::Rng;

/// Spin the wheel once.
///
/// Draws exactly one uniform value in `[0, 1)` from `rng` and reports a win
/// when the draw is at most `win_probability`.
pub fn spin<R: Rng + ?Sized>(rng: &mut R, win_probability: f64) -> bool {
    rng.gen::<f64>() <= win_probability
}
