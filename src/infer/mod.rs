//! Mamdani fuzzy inference.
//!
//! [`engine::InferenceEngine`] runs the four stages for one observation;
//! [`batch`] fans a slice of observations out over rayon. Both are pure
//! functions of the observation and the shared, read-only catalogs and rules.

pub mod batch;
pub mod defuzz;
pub mod engine;

use serde::Serialize;

use crate::error::InferError;
use crate::observation::Observation;
use crate::rule::RuleBase;
use crate::set::FuzzySetCatalog;
use crate::universe::Universe;

pub use batch::{BatchOutcome, BatchSummary, evaluate_batch};
pub use engine::InferenceEngine;

/// Result type for inference operations.
pub type InferResult<T> = std::result::Result<T, InferError>;

/// Evaluate one observation against the rule base's single output variable.
pub fn evaluate(
    observation: &Observation,
    input: &FuzzySetCatalog,
    output: &FuzzySetCatalog,
    rules: &RuleBase,
) -> InferResult<f64> {
    InferenceEngine::new(input, output, rules).evaluate(observation)
}

/// Strength one rule reached for one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFiring {
    pub rule: String,
    pub strength: f64,
}

/// Trace of a single evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub observation: String,
    pub variable: String,
    /// Centroid of the aggregate, `None` when no rule fired.
    pub value: Option<f64>,
    /// One entry per fired rule, in rule-base order.
    pub firings: Vec<RuleFiring>,
    pub grid: Universe,
    /// Aggregated output curve, parallel to `grid`.
    pub aggregate: Vec<f64>,
}

impl Evaluation {
    /// The crisp value, or [`InferError::EmptyAggregate`].
    pub fn crisp(&self) -> InferResult<f64> {
        self.value.ok_or_else(|| InferError::EmptyAggregate {
            observation: self.observation.clone(),
        })
    }
}
