//! Batch evaluation of many observations.
//!
//! Observations are independent: each gets its own result, in input order,
//! and one failing observation never affects the others.

use rayon::prelude::*;
use serde::Serialize;

use crate::observation::Observation;

use super::{InferResult, InferenceEngine};

/// Outcome of one observation in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub id: String,
    pub result: InferResult<f64>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Counts over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub evaluated: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(outcomes: &[BatchOutcome]) -> Self {
        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        Self {
            evaluated: outcomes.len() - failed,
            failed,
        }
    }
}

/// Evaluate every observation, optionally in parallel.
///
/// `variable` selects the output variable; `None` uses the rule base's only
/// one. Results keep the order of `observations`.
pub fn evaluate_batch(
    engine: &InferenceEngine<'_>,
    observations: &[Observation],
    variable: Option<&str>,
    parallel: bool,
) -> Vec<BatchOutcome> {
    tracing::info!(
        observations = observations.len(),
        rules = engine.rules().len(),
        parallel,
        "evaluating batch"
    );

    let run = |obs: &Observation| {
        let result = match variable {
            Some(v) => engine.evaluate_variable(obs, v),
            None => engine.evaluate(obs),
        };
        if let Err(e) = &result {
            tracing::warn!(observation = %obs.id, error = %e, "observation aborted");
        }
        BatchOutcome {
            id: obs.id.clone(),
            result,
        }
    };

    let outcomes: Vec<BatchOutcome> = if parallel {
        observations.par_iter().map(run).collect()
    } else {
        observations.iter().map(run).collect()
    };

    let summary = BatchSummary::of(&outcomes);
    tracing::info!(
        evaluated = summary.evaluated,
        failed = summary.failed,
        "batch finished"
    );
    outcomes
}
