//! Fuzzy sets keyed by `(variable, label)`.
//!
//! A [`FuzzySet`] pairs a trapezoidal membership function with the universe
//! it is sampled over. Sets are immutable once built and are shared read-only
//! by every evaluation.

pub mod catalog;

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;
use crate::membership::Trapezoid;
use crate::universe::Universe;

pub use catalog::{CatalogBuilder, FuzzySetCatalog};

/// Composite identity of a fuzzy set: the variable it describes and its
/// linguistic label. Displayed as `Variable=Label`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SetId {
    pub variable: String,
    pub label: String,
}

impl SetId {
    pub fn new(variable: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            label: label.into(),
        }
    }

    /// Parse the `Variable=Label` form. Both sides must be non-empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (variable, label) = s.split_once('=')?;
        let (variable, label) = (variable.trim(), label.trim());
        if variable.is_empty() || label.is_empty() {
            return None;
        }
        Some(Self::new(variable, label))
    }
}

impl std::fmt::Display for SetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.variable, self.label)
    }
}

/// A linguistic fuzzy set with its sampled curve.
#[derive(Debug, Clone, Serialize)]
pub struct FuzzySet {
    id: SetId,
    shape: Trapezoid,
    universe: Universe,
    samples: Vec<f64>,
}

impl FuzzySet {
    /// Sample `shape` over `universe`. The universe must span `[a, d]`.
    pub fn new(id: SetId, shape: Trapezoid, universe: Universe) -> Result<Self, ShapeError> {
        if !universe.covers(shape.start(), shape.end()) {
            return Err(ShapeError::UniverseTooNarrow {
                set: id.to_string(),
                min: universe.min(),
                max: universe.max(),
                a: shape.start(),
                d: shape.end(),
            });
        }
        let samples = universe.sample(&shape);
        Ok(Self {
            id,
            shape,
            universe,
            samples,
        })
    }

    pub fn id(&self) -> &SetId {
        &self.id
    }

    pub fn variable(&self) -> &str {
        &self.id.variable
    }

    pub fn label(&self) -> &str {
        &self.id.label
    }

    pub fn shape(&self) -> &Trapezoid {
        &self.shape
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Membership values parallel to `universe().xs()`.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Exact membership degree from the closed-form trapezoid.
    pub fn degree(&self, value: f64) -> f64 {
        self.shape.degree(value)
    }

    /// Membership read off the sampled curve. Resolution-dependent; for display.
    pub fn sampled_degree(&self, value: f64) -> f64 {
        self.universe.interpolate(&self.samples, value)
    }
}
