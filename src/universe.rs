//! Sampled universes of discourse.
//!
//! A [`Universe`] is a uniform grid `min, min + step, ...` up to `max`. Fuzzy
//! sets are sampled over one, and aggregation folds clipped curves over the
//! output variable's grid. Curves sampled on another grid are moved across with
//! [`Universe::resample`].

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;
use crate::membership::Trapezoid;

/// Slack for float comparisons against grid positions.
const GRID_EPSILON: f64 = 1e-9;

/// Largest number of samples a constructed universe may hold.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Uniform sampling grid over `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    min: f64,
    max: f64,
    step: f64,
}

impl Universe {
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self, ShapeError> {
        let valid = min.is_finite() && max.is_finite() && step.is_finite() && step > 0.0;
        if !valid
            || max < min
            || steps(min, max, step).is_none_or(|n| n >= MAX_SAMPLES as f64)
        {
            return Err(ShapeError::InvalidUniverse { min, max, step });
        }
        Ok(Self { min, max, step })
    }

    /// Smallest grid at `step` that spans the trapezoid's support.
    pub fn covering(shape: &Trapezoid, step: f64) -> Result<Self, ShapeError> {
        Self::new(shape.start(), shape.end(), step)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of samples on the grid (always at least one).
    pub fn len(&self) -> usize {
        // Saturates for hulls whose span no longer fits.
        steps(self.min, self.max, self.step)
            .map_or(usize::MAX, |n| n as usize)
            .saturating_add(1)
    }

    /// Always false: a grid holds at least its `min` sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The `i`-th grid coordinate.
    pub fn x(&self, i: usize) -> f64 {
        self.min + i as f64 * self.step
    }

    /// Grid coordinates in increasing order.
    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| self.x(i))
    }

    /// Sample a membership function over the grid.
    pub fn sample(&self, shape: &Trapezoid) -> Vec<f64> {
        self.xs().map(|x| shape.degree(x)).collect()
    }

    /// Whether `[start, end]` lies inside the grid bounds.
    pub fn covers(&self, start: f64, end: f64) -> bool {
        self.min <= start + GRID_EPSILON && end <= self.max + GRID_EPSILON
    }

    /// Grid spanning both universes at the finer of the two steps.
    pub fn hull(&self, other: &Universe) -> Universe {
        Universe {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            step: self.step.min(other.step),
        }
    }

    /// Linear interpolation of a curve sampled on this grid.
    ///
    /// Returns 0.0 outside the sampled range: a fuzzy set carries no
    /// membership beyond its own universe.
    pub fn interpolate(&self, ys: &[f64], x: f64) -> f64 {
        let n = ys.len().min(self.len());
        if n == 0 {
            return 0.0;
        }
        let pos = (x - self.min) / self.step;
        let last = (n - 1) as f64;
        if pos < -GRID_EPSILON || pos > last + GRID_EPSILON {
            return 0.0;
        }
        if n == 1 {
            return ys[0];
        }
        let pos = pos.clamp(0.0, last);
        let i = (pos.floor() as usize).min(n - 2);
        let frac = pos - i as f64;
        ys[i] + (ys[i + 1] - ys[i]) * frac
    }

    /// Move a curve sampled on this grid onto `target` by linear interpolation.
    pub fn resample(&self, ys: &[f64], target: &Universe) -> Vec<f64> {
        if self == target && ys.len() == target.len() {
            return ys.to_vec();
        }
        target.xs().map(|x| self.interpolate(ys, x)).collect()
    }
}

/// Whole steps between `min` and `max`, `None` when the span is not finite.
fn steps(min: f64, max: f64, step: f64) -> Option<f64> {
    let span = max - min;
    span.is_finite()
        .then(|| (span / step + GRID_EPSILON).floor())
        .filter(|n| n.is_finite())
}

impl std::fmt::Display for Universe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}] step {}", self.min, self.max, self.step)
    }
}
