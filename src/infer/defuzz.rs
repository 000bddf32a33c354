//! Centroid defuzzification over a sampled grid.

use crate::universe::Universe;

/// Discrete centre of mass `Σ x·μ / Σ μ` of a curve sampled on `grid`.
///
/// Returns `None` when the curve carries no mass, so an empty aggregate is
/// never confused with a crisp zero.
pub fn centroid(grid: &Universe, curve: &[f64]) -> Option<f64> {
    let (moment, mass) = grid
        .xs()
        .zip(curve)
        .fold((0.0, 0.0), |(moment, mass), (x, &mu)| {
            (moment + x * mu, mass + mu)
        });
    if mass > 0.0 { Some(moment / mass) } else { None }
}
