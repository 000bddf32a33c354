//! Mamdani inference: fuzzify, fire, clip, aggregate, defuzzify.
//!
//! The engine only borrows the catalogs and the rule base. Everything an
//! evaluation computes (membership degrees, rule strengths, clipped curves,
//! the aggregate) lives in an [`EvalContext`] created per call, so concurrent
//! and repeated evaluations never observe each other's state.

use std::collections::{HashMap, HashSet};

use crate::error::{InferError, LookupSite};
use crate::observation::{InferenceResult, Observation};
use crate::rule::{Rule, RuleBase};
use crate::set::{FuzzySet, FuzzySetCatalog, SetId};
use crate::universe::Universe;

use super::defuzz::centroid;
use super::{Evaluation, InferResult, RuleFiring};

/// Stateless inference engine. Per-evaluation state lives in [`EvalContext`].
#[derive(Debug, Clone, Copy)]
pub struct InferenceEngine<'a> {
    input: &'a FuzzySetCatalog,
    output: &'a FuzzySetCatalog,
    rules: &'a RuleBase,
}

/// Scratch state for a single evaluation.
struct EvalContext<'o> {
    observation: &'o str,
    /// Membership degree of the crisp input in every set of each supplied variable.
    degrees: HashMap<SetId, f64>,
    firings: Vec<RuleFiring>,
    aggregate: Vec<f64>,
}

impl<'o> EvalContext<'o> {
    fn new(observation: &'o str, samples: usize) -> Self {
        Self {
            observation,
            degrees: HashMap::new(),
            firings: Vec::new(),
            aggregate: vec![0.0; samples],
        }
    }

    fn undefined(&self, set: impl ToString, site: LookupSite) -> InferError {
        InferError::UndefinedFuzzySet {
            observation: self.observation.to_string(),
            set: set.to_string(),
            site,
        }
    }
}

impl<'a> InferenceEngine<'a> {
    pub fn new(input: &'a FuzzySetCatalog, output: &'a FuzzySetCatalog, rules: &'a RuleBase) -> Self {
        Self {
            input,
            output,
            rules,
        }
    }

    pub fn input(&self) -> &'a FuzzySetCatalog {
        self.input
    }

    pub fn output(&self) -> &'a FuzzySetCatalog {
        self.output
    }

    pub fn rules(&self) -> &'a RuleBase {
        self.rules
    }

    /// Crisp output for the rule base's single output variable.
    pub fn evaluate(&self, observation: &Observation) -> InferResult<f64> {
        if self.rules.is_empty() && self.output.variables().nth(1).is_some() {
            // No rule can fire for any output variable.
            let mut ctx = EvalContext::new(&observation.id, 0);
            self.fuzzify(&mut ctx, observation)?;
            return Err(InferError::EmptyAggregate {
                observation: observation.id.clone(),
            });
        }
        self.explain(observation)?.crisp()
    }

    /// Crisp output for one named output variable.
    pub fn evaluate_variable(&self, observation: &Observation, variable: &str) -> InferResult<f64> {
        self.explain_variable(observation, variable)?.crisp()
    }

    /// Like [`evaluate`](Self::evaluate), tagged with the observation id.
    pub fn infer(&self, observation: &Observation) -> InferResult<InferenceResult> {
        Ok(InferenceResult {
            id: observation.id.clone(),
            value: self.evaluate(observation)?,
        })
    }

    /// Full evaluation trace for the rule base's single output variable.
    pub fn explain(&self, observation: &Observation) -> InferResult<Evaluation> {
        let variable = self.output_variable()?;
        self.explain_variable(observation, &variable)
    }

    /// Full evaluation trace for one output variable.
    ///
    /// Only rules concluding on `variable` are fired; a defined variable no
    /// rule concludes on keeps an all-zero aggregate. An empty aggregate is
    /// reported through [`Evaluation::value`] being `None`.
    pub fn explain_variable(
        &self,
        observation: &Observation,
        variable: &str,
    ) -> InferResult<Evaluation> {
        let rules: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|r| r.consequent().variable == variable)
            .collect();
        let grid = match (self.output.grid(variable), rules.first()) {
            (Ok(grid), _) => *grid,
            (Err(_), Some(first)) => {
                return Err(InferError::UndefinedFuzzySet {
                    observation: observation.id.clone(),
                    set: first.consequent().to_string(),
                    site: LookupSite::Consequent {
                        rule: first.name().to_string(),
                    },
                });
            }
            (Err(_), None) => {
                return Err(InferError::UndefinedOutputVariable {
                    variable: variable.to_string(),
                });
            }
        };

        let mut ctx = EvalContext::new(&observation.id, grid.len());

        // --- Stage 1: fuzzification ---
        self.fuzzify(&mut ctx, observation)?;

        for rule in rules {
            // --- Stage 2: antecedent strength (min) ---
            let strength = self.strength(&ctx, rule)?;
            tracing::trace!(
                observation = %observation.id,
                rule = rule.name(),
                strength,
                "rule fired"
            );

            // --- Stage 3: consequent clipping (min) ---
            let (set, clipped) = self.clip(&ctx, rule, strength)?;

            // --- Stage 4a: aggregation (max) on the output grid ---
            compose(&mut ctx.aggregate, set.universe(), &clipped, &grid);

            ctx.firings.push(RuleFiring {
                rule: rule.name().to_string(),
                strength,
            });
        }

        // --- Stage 4b: centroid defuzzification ---
        let value = centroid(&grid, &ctx.aggregate);
        tracing::debug!(
            observation = %observation.id,
            variable,
            value = ?value,
            "observation evaluated"
        );

        Ok(Evaluation {
            observation: observation.id.clone(),
            variable: variable.to_string(),
            value,
            firings: ctx.firings,
            grid,
            aggregate: ctx.aggregate,
        })
    }

    /// The one variable the rule base concludes on.
    ///
    /// With no rules at all, falls back to the output catalog's only variable.
    pub fn output_variable(&self) -> InferResult<String> {
        let mut variables = self.rules.output_variables();
        if variables.is_empty() {
            variables = self.output.variables().collect();
        }
        match variables.as_slice() {
            [only] => Ok(only.to_string()),
            [] => Err(InferError::NoOutputVariable),
            many => Err(InferError::AmbiguousOutput {
                variables: many.join(", "),
            }),
        }
    }

    /// Degree of every input set of each supplied variable.
    fn fuzzify(&self, ctx: &mut EvalContext<'_>, observation: &Observation) -> InferResult<()> {
        let mut seen = HashSet::new();
        for (variable, value) in &observation.inputs {
            if !seen.insert(variable.as_str()) {
                return Err(InferError::DuplicateInput {
                    observation: observation.id.clone(),
                    variable: variable.clone(),
                });
            }
            if !value.is_finite() {
                return Err(InferError::NonFiniteInput {
                    observation: observation.id.clone(),
                    variable: variable.clone(),
                });
            }
            if !self.input.has_variable(variable) {
                return Err(ctx.undefined(variable, LookupSite::Fuzzification));
            }
            for set in self.input.sets_for_variable(variable) {
                ctx.degrees.insert(set.id().clone(), set.degree(*value));
            }
        }
        Ok(())
    }

    /// Minimum membership degree over the rule's antecedent.
    fn strength(&self, ctx: &EvalContext<'_>, rule: &Rule) -> InferResult<f64> {
        rule.antecedent().iter().try_fold(1.0_f64, |strength, id| -> InferResult<f64> {
            let degree = ctx.degrees.get(id).ok_or_else(|| {
                ctx.undefined(
                    id,
                    LookupSite::Antecedent {
                        rule: rule.name().to_string(),
                    },
                )
            })?;
            Ok(strength.min(*degree))
        })
    }

    /// Consequent curve cut at `strength`, on the consequent's own universe.
    fn clip(
        &self,
        ctx: &EvalContext<'_>,
        rule: &Rule,
        strength: f64,
    ) -> InferResult<(&'a FuzzySet, Vec<f64>)> {
        let set = self.output.get(rule.consequent()).ok_or_else(|| {
            ctx.undefined(
                rule.consequent(),
                LookupSite::Consequent {
                    rule: rule.name().to_string(),
                },
            )
        })?;
        let clipped = set.samples().iter().map(|y| y.min(strength)).collect();
        Ok((set, clipped))
    }
}

/// Fold a clipped curve into the aggregate with pointwise max, resampling it
/// onto `grid` first when it was sampled elsewhere.
fn compose(aggregate: &mut [f64], universe: &Universe, clipped: &[f64], grid: &Universe) {
    let curve = universe.resample(clipped, grid);
    for (acc, y) in aggregate.iter_mut().zip(curve) {
        *acc = acc.max(y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::CatalogBuilder;

    fn inputs() -> FuzzySetCatalog {
        let mut b = CatalogBuilder::new();
        b.trapezoid_in("Temp", "Low", [0.0, 0.0, 20.0, 40.0], (0.0, 100.0))
            .unwrap()
            .trapezoid_in("Temp", "High", [30.0, 50.0, 100.0, 100.0], (0.0, 100.0))
            .unwrap()
            .trapezoid_in("Humidity", "Dry", [0.0, 0.0, 30.0, 60.0], (0.0, 100.0))
            .unwrap()
            .trapezoid_in("Humidity", "Wet", [40.0, 70.0, 100.0, 100.0], (0.0, 100.0))
            .unwrap();
        b.build()
    }

    fn outputs() -> FuzzySetCatalog {
        let mut b = CatalogBuilder::new();
        b.trapezoid_in("Risk", "Low", [0.0, 0.0, 30.0, 50.0], (0.0, 100.0))
            .unwrap()
            .trapezoid_in("Risk", "High", [40.0, 60.0, 100.0, 100.0], (0.0, 100.0))
            .unwrap();
        b.build()
    }

    fn rule(name: &str, ante: &[&str], cons: &str) -> Rule {
        Rule::new(
            name,
            ante.iter().map(|s| SetId::parse(s).unwrap()).collect(),
            SetId::parse(cons).unwrap(),
        )
        .unwrap()
    }

    fn rules(list: Vec<Rule>) -> RuleBase {
        RuleBase::new(list).unwrap()
    }

    #[test]
    fn strength_is_min_of_antecedent_degrees() {
        let (input, output) = (inputs(), outputs());
        let base = rules(vec![rule("R1", &["Temp=High", "Humidity=Wet"], "Risk=High")]);
        let engine = InferenceEngine::new(&input, &output, &base);

        // Temp=40 -> High 0.5; Humidity=50 -> Wet 1/3.
        let obs = Observation::new("a").with_input("Temp", 40.0).with_input("Humidity", 50.0);
        let eval = engine.explain(&obs).unwrap();
        assert_eq!(eval.firings.len(), 1);
        assert!((eval.firings[0].strength - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn strength_of_three_conjuncts() {
        let mut b = CatalogBuilder::new();
        // Degrees at x = 3: 0.3, 0.7, 0.5.
        b.trapezoid_in("A", "a", [0.0, 10.0, 20.0, 30.0], (0.0, 30.0))
            .unwrap()
            .trapezoid_in("B", "b", [-4.0, 6.0, 40.0, 50.0], (-10.0, 50.0))
            .unwrap()
            .trapezoid_in("C", "c", [-3.0, 9.0, 20.0, 30.0], (-10.0, 30.0))
            .unwrap();
        let input = b.build();
        let output = outputs();
        let r = rule("R", &["A=a", "B=b", "C=c"], "Risk=High");
        let obs = Observation::new("x")
            .with_input("A", 3.0)
            .with_input("B", 3.0)
            .with_input("C", 3.0);

        let base = rules(vec![r]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let eval = engine.explain(&obs).unwrap();
        assert!((eval.firings[0].strength - 0.3).abs() < 1e-9);
    }

    #[test]
    fn clipped_curve_bounded_by_curve_and_strength() {
        let (input, output) = (inputs(), outputs());
        let base = rules(vec![rule("R1", &["Temp=High"], "Risk=High")]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let obs = Observation::new("a").with_input("Temp", 35.0); // High = 0.25
        let eval = engine.explain(&obs).unwrap();

        let original = output.get(&SetId::new("Risk", "High")).unwrap().samples();
        for (clip, orig) in eval.aggregate.iter().zip(original) {
            assert!(*clip <= *orig + 1e-12);
            assert!(*clip <= 0.25 + 1e-12);
        }
        assert!(eval.aggregate.iter().any(|&y| (y - 0.25).abs() < 1e-12));
    }

    #[test]
    fn repeating_a_rule_is_idempotent() {
        let (input, output) = (inputs(), outputs());
        let once = rules(vec![rule("R1", &["Temp=High"], "Risk=High")]);
        let twice = rules(vec![
            rule("R1", &["Temp=High"], "Risk=High"),
            rule("R1b", &["Temp=High"], "Risk=High"),
        ]);
        let obs = Observation::new("a").with_input("Temp", 42.0);

        let a = InferenceEngine::new(&input, &output, &once).explain(&obs).unwrap();
        let b = InferenceEngine::new(&input, &output, &twice).explain(&obs).unwrap();
        assert_eq!(a.aggregate, b.aggregate);
        assert_eq!(a.value, b.value);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let (input, output) = (inputs(), outputs());
        let r1 = rule("R1", &["Temp=High"], "Risk=High");
        let r2 = rule("R2", &["Temp=Low"], "Risk=Low");
        let obs = Observation::new("a").with_input("Temp", 35.0);

        let ab = rules(vec![r1.clone(), r2.clone()]);
        let ba = rules(vec![r2, r1]);
        let x = InferenceEngine::new(&input, &output, &ab).explain(&obs).unwrap();
        let y = InferenceEngine::new(&input, &output, &ba).explain(&obs).unwrap();
        assert_eq!(x.aggregate, y.aggregate);
        // Firings are reported in rule-base order.
        assert_eq!(x.firings[0].rule, "R1");
        assert_eq!(y.firings[0].rule, "R2");
    }

    #[test]
    fn no_firing_reports_empty_aggregate() {
        let (input, output) = (inputs(), outputs());
        let base = rules(vec![rule("R1", &["Temp=High"], "Risk=High")]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let obs = Observation::new("cold").with_input("Temp", 10.0);

        let eval = engine.explain(&obs).unwrap();
        assert_eq!(eval.value, None);
        assert_eq!(eval.firings[0].strength, 0.0);
        assert!(matches!(
            engine.evaluate(&obs),
            Err(InferError::EmptyAggregate { ref observation }) if observation == "cold"
        ));
    }

    #[test]
    fn observation_variable_missing_from_catalog() {
        let (input, output) = (inputs(), outputs());
        let base = rules(vec![rule("R1", &["Temp=High"], "Risk=High")]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let obs = Observation::new("a").with_input("Pressure", 1.0);
        assert!(matches!(
            engine.evaluate(&obs),
            Err(InferError::UndefinedFuzzySet {
                site: LookupSite::Fuzzification,
                ..
            })
        ));
    }

    #[test]
    fn antecedent_variable_not_supplied() {
        let (input, output) = (inputs(), outputs());
        let base = rules(vec![rule("R1", &["Temp=High", "Humidity=Wet"], "Risk=High")]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let obs = Observation::new("a").with_input("Temp", 80.0);
        match engine.evaluate(&obs) {
            Err(InferError::UndefinedFuzzySet { set, site, .. }) => {
                assert_eq!(set, "Humidity=Wet");
                assert_eq!(site, LookupSite::Antecedent { rule: "R1".into() });
            }
            other => panic!("expected undefined antecedent, got {other:?}"),
        }
    }

    #[test]
    fn antecedent_label_not_defined() {
        let (input, output) = (inputs(), outputs());
        let base = rules(vec![rule("R1", &["Temp=Scorching"], "Risk=High")]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let obs = Observation::new("a").with_input("Temp", 80.0);
        assert!(matches!(
            engine.evaluate(&obs),
            Err(InferError::UndefinedFuzzySet { ref set, .. }) if set == "Temp=Scorching"
        ));
    }

    #[test]
    fn consequent_label_not_defined() {
        let (input, output) = (inputs(), outputs());
        let base = rules(vec![rule("R1", &["Temp=High"], "Risk=Extreme")]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let obs = Observation::new("a").with_input("Temp", 80.0);
        match engine.evaluate(&obs) {
            Err(InferError::UndefinedFuzzySet { set, site, .. }) => {
                assert_eq!(set, "Risk=Extreme");
                assert_eq!(site, LookupSite::Consequent { rule: "R1".into() });
            }
            other => panic!("expected undefined consequent, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_and_non_finite_inputs_rejected() {
        let (input, output) = (inputs(), outputs());
        let base = rules(vec![rule("R1", &["Temp=High"], "Risk=High")]);
        let engine = InferenceEngine::new(&input, &output, &base);

        let dup = Observation::new("d").with_input("Temp", 1.0).with_input("Temp", 2.0);
        assert!(matches!(engine.evaluate(&dup), Err(InferError::DuplicateInput { .. })));

        let nan = Observation::new("n").with_input("Temp", f64::NAN);
        assert!(matches!(engine.evaluate(&nan), Err(InferError::NonFiniteInput { .. })));
    }

    #[test]
    fn several_output_variables_need_a_choice() {
        let input = inputs();
        let mut b = CatalogBuilder::new();
        b.trapezoid_in("Risk", "High", [40.0, 60.0, 100.0, 100.0], (0.0, 100.0))
            .unwrap()
            .trapezoid_in("Alarm", "On", [50.0, 80.0, 100.0, 100.0], (0.0, 100.0))
            .unwrap();
        let output = b.build();
        let base = rules(vec![
            rule("R1", &["Temp=High"], "Risk=High"),
            rule("R2", &["Temp=High"], "Alarm=On"),
        ]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let obs = Observation::new("a").with_input("Temp", 90.0);

        assert!(matches!(engine.evaluate(&obs), Err(InferError::AmbiguousOutput { .. })));

        let alarm = engine.explain_variable(&obs, "Alarm").unwrap();
        assert_eq!(alarm.firings.len(), 1);
        assert_eq!(alarm.firings[0].rule, "R2");
        assert!(matches!(
            engine.evaluate_variable(&obs, "Speed"),
            Err(InferError::UndefinedOutputVariable { .. })
        ));
    }

    #[test]
    fn empty_rule_base_reports_empty_aggregate() {
        let (input, output) = (inputs(), outputs());
        let base = rules(vec![]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let obs = Observation::new("a").with_input("Temp", 90.0);

        assert!(matches!(
            engine.evaluate(&obs),
            Err(InferError::EmptyAggregate { ref observation }) if observation == "a"
        ));
        let eval = engine.explain_variable(&obs, "Risk").unwrap();
        assert!(eval.firings.is_empty());
        assert!(eval.aggregate.iter().all(|&y| y == 0.0));
        assert_eq!(eval.value, None);
    }

    #[test]
    fn empty_rule_base_over_several_outputs_is_still_empty() {
        let input = inputs();
        let mut b = CatalogBuilder::new();
        b.trapezoid_in("Risk", "High", [40.0, 60.0, 100.0, 100.0], (0.0, 100.0))
            .unwrap()
            .trapezoid_in("Alarm", "On", [50.0, 80.0, 100.0, 100.0], (0.0, 100.0))
            .unwrap();
        let output = b.build();
        let base = rules(vec![]);
        let engine = InferenceEngine::new(&input, &output, &base);

        let obs = Observation::new("a").with_input("Temp", 90.0);
        assert!(matches!(engine.evaluate(&obs), Err(InferError::EmptyAggregate { .. })));
        // Input validation still applies.
        let bad = Observation::new("b").with_input("Pressure", 1.0);
        assert!(matches!(
            engine.evaluate(&bad),
            Err(InferError::UndefinedFuzzySet { .. })
        ));
    }

    #[test]
    fn defined_output_without_rules_is_empty_aggregate() {
        let input = inputs();
        let mut b = CatalogBuilder::new();
        b.trapezoid_in("Risk", "High", [40.0, 60.0, 100.0, 100.0], (0.0, 100.0))
            .unwrap()
            .trapezoid_in("Alarm", "On", [50.0, 80.0, 100.0, 100.0], (0.0, 100.0))
            .unwrap();
        let output = b.build();
        let base = rules(vec![rule("R1", &["Temp=High"], "Risk=High")]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let obs = Observation::new("a").with_input("Temp", 90.0);

        assert!(matches!(
            engine.evaluate_variable(&obs, "Alarm"),
            Err(InferError::EmptyAggregate { .. })
        ));
    }

    #[test]
    fn no_output_variable_anywhere() {
        let input = inputs();
        let output = FuzzySetCatalog::default();
        let base = rules(vec![]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let obs = Observation::new("a").with_input("Temp", 90.0);
        assert!(matches!(engine.evaluate(&obs), Err(InferError::NoOutputVariable)));
    }

    #[test]
    fn mixed_resolution_consequents_are_resampled() {
        let input = inputs();
        let mut coarse = CatalogBuilder::with_resolution(2.0);
        coarse
            .trapezoid_in("Risk", "Low", [0.0, 0.0, 30.0, 50.0], (0.0, 100.0))
            .unwrap();
        let mut fine = CatalogBuilder::with_resolution(0.5);
        fine.trapezoid_in("Risk", "High", [40.0, 60.0, 100.0, 100.0], (0.0, 100.0))
            .unwrap();
        let output = FuzzySetCatalog::from_sets(
            coarse.build().iter().cloned().chain(fine.build().iter().cloned()),
        )
        .unwrap();
        assert_eq!(output.grid("Risk").unwrap().step(), 0.5);

        let base = rules(vec![
            rule("R1", &["Temp=Low"], "Risk=Low"),
            rule("R2", &["Temp=High"], "Risk=High"),
        ]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let eval = engine.explain(&Observation::new("a").with_input("Temp", 35.0)).unwrap();
        assert_eq!(eval.aggregate.len(), eval.grid.len());
        assert_eq!(eval.grid.len(), 201);
        // Risk=Low clipped at Temp=Low(35) = 0.25 shows up between coarse samples.
        let at = |x: f64| eval.aggregate[(x / 0.5) as usize];
        assert!((at(11.0) - 0.25).abs() < 1e-12);
        assert!(eval.value.is_some());
    }

    #[test]
    fn evaluations_do_not_share_state() {
        let (input, output) = (inputs(), outputs());
        let base = rules(vec![
            rule("R1", &["Temp=High"], "Risk=High"),
            rule("R2", &["Temp=Low"], "Risk=Low"),
        ]);
        let engine = InferenceEngine::new(&input, &output, &base);
        let hot = Observation::new("hot").with_input("Temp", 90.0);
        let cold = Observation::new("cold").with_input("Temp", 5.0);

        let first = engine.evaluate(&hot).unwrap();
        let _ = engine.evaluate(&cold).unwrap();
        let again = engine.evaluate(&hot).unwrap();
        assert_eq!(first, again);
    }
}
