//! Mamdani rules and the ordered rule base.
//!
//! A rule reads `IF in1=L1 AND in2=L2 ... THEN out=L`. The antecedent is an
//! implicit conjunction of [`SetId`] references; the consequent is one output
//! set. Rules hold no per-evaluation state.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::RuleError;
use crate::set::SetId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    name: String,
    antecedent: Vec<SetId>,
    consequent: SetId,
}

impl Rule {
    /// Build a rule. The antecedent must name at least one set.
    pub fn new(
        name: impl Into<String>,
        antecedent: Vec<SetId>,
        consequent: SetId,
    ) -> Result<Self, RuleError> {
        let name = name.into();
        if antecedent.is_empty() {
            return Err(RuleError::EmptyAntecedent { rule: name });
        }
        Ok(Self {
            name,
            antecedent,
            consequent,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn antecedent(&self) -> &[SetId] {
        &self.antecedent
    }

    pub fn consequent(&self) -> &SetId {
        &self.consequent
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: IF ", self.name)?;
        for (i, cond) in self.antecedent.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{cond}")?;
        }
        write!(f, " THEN {}", self.consequent)
    }
}

/// Rules in load order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleBase {
    rules: Vec<Rule>,
}

impl RuleBase {
    /// Collect rules, rejecting duplicate names.
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Result<Self, RuleError> {
        let rules: Vec<Rule> = rules.into_iter().collect();
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name()) {
                return Err(RuleError::DuplicateRule {
                    rule: rule.name().to_string(),
                });
            }
        }
        Ok(Self { rules })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distinct consequent variables, in first-seen order.
    pub fn output_variables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .map(|r| r.consequent().variable.as_str())
            .filter(|v| seen.insert(*v))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RuleBase {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
