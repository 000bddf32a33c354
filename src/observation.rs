//! Crisp observations fed to the engine and the results it returns.

use serde::{Deserialize, Serialize};

/// One set of named crisp inputs, evaluated once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: String,
    /// `(variable, value)` pairs in the order they were supplied.
    pub inputs: Vec<(String, f64)>,
}

impl Observation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            inputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, variable: impl Into<String>, value: f64) -> Self {
        self.inputs.push((variable.into(), value));
        self
    }

    /// Value supplied for `variable`, if any.
    pub fn value_of(&self, variable: &str) -> Option<f64> {
        self.inputs
            .iter()
            .find(|(v, _)| v == variable)
            .map(|&(_, value)| value)
    }
}

/// Crisp output for one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub id: String,
    pub value: f64,
}

impl std::fmt::Display for InferenceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.id, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_input_order() {
        let obs = Observation::new("0001")
            .with_input("Age", 35.0)
            .with_input("IncomeLevel", 4.0);
        assert_eq!(obs.inputs[0].0, "Age");
        assert_eq!(obs.inputs[1].0, "IncomeLevel");
        assert_eq!(obs.value_of("IncomeLevel"), Some(4.0));
        assert_eq!(obs.value_of("Assets"), None);
    }

    #[test]
    fn result_displays_like_results_file_line() {
        let r = InferenceResult {
            id: "0042".into(),
            value: 37.5,
        };
        assert_eq!(r.to_string(), "0042 37.5");
    }
}
