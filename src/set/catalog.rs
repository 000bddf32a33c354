//! Immutable catalog of fuzzy sets.
//!
//! Built once through [`CatalogBuilder`], then shared read-only. Sets are
//! looked up by explicit [`SetId`] and enumerated per variable in load order.
//! Each variable also gets a canonical output grid: the hull of its sets'
//! universes, which is their common grid when they all share one.

use std::collections::HashMap;

use crate::error::{CatalogError, ShapeError};
use crate::membership::Trapezoid;
use crate::universe::Universe;

use super::{FuzzySet, SetId};

/// Sampling step used when a set is declared without an explicit universe.
pub const DEFAULT_RESOLUTION: f64 = 1.0;

/// Read-only mapping from `(variable, label)` to [`FuzzySet`].
#[derive(Debug, Clone, Default)]
pub struct FuzzySetCatalog {
    sets: Vec<FuzzySet>,
    index: HashMap<SetId, usize>,
    /// Variable name -> indices into `sets`, in load order.
    by_variable: HashMap<String, Vec<usize>>,
    /// Variable names in first-seen order.
    variables: Vec<String>,
    grids: HashMap<String, Universe>,
}

impl FuzzySetCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Collect prebuilt sets into a catalog.
    pub fn from_sets(sets: impl IntoIterator<Item = FuzzySet>) -> Result<Self, ShapeError> {
        let mut builder = CatalogBuilder::new();
        for set in sets {
            builder.insert(set)?;
        }
        Ok(builder.build())
    }

    pub fn get(&self, id: &SetId) -> Option<&FuzzySet> {
        self.index.get(id).map(|&i| &self.sets[i])
    }

    /// Look up a set, failing when the pair is absent.
    pub fn lookup(&self, id: &SetId) -> Result<&FuzzySet, CatalogError> {
        self.get(id).ok_or_else(|| CatalogError::UndefinedFuzzySet {
            set: id.to_string(),
        })
    }

    /// All sets of one variable, in load order. Empty when the variable is unknown.
    pub fn sets_for_variable<'a>(
        &'a self,
        variable: &str,
    ) -> impl Iterator<Item = &'a FuzzySet> + use<'a> {
        self.by_variable
            .get(variable)
            .into_iter()
            .flatten()
            .map(|&i| &self.sets[i])
    }

    pub fn has_variable(&self, variable: &str) -> bool {
        self.by_variable.contains_key(variable)
    }

    /// Variable names in first-seen order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    /// The grid aggregation runs on for `variable`.
    pub fn grid(&self, variable: &str) -> Result<&Universe, CatalogError> {
        self.grids
            .get(variable)
            .ok_or_else(|| CatalogError::UndefinedVariable {
                variable: variable.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FuzzySet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Accumulates fuzzy sets, rejecting duplicates and malformed shapes.
#[derive(Debug)]
pub struct CatalogBuilder {
    resolution: f64,
    sets: Vec<FuzzySet>,
    index: HashMap<SetId, usize>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::with_resolution(DEFAULT_RESOLUTION)
    }

    /// Builder whose implicit universes are sampled at `resolution`.
    pub fn with_resolution(resolution: f64) -> Self {
        Self {
            resolution,
            sets: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn insert(&mut self, set: FuzzySet) -> Result<&mut Self, ShapeError> {
        if self.index.contains_key(set.id()) {
            return Err(ShapeError::DuplicateSet {
                set: set.id().to_string(),
            });
        }
        self.index.insert(set.id().clone(), self.sets.len());
        self.sets.push(set);
        Ok(self)
    }

    /// Add a trapezoid sampled over exactly its support.
    pub fn trapezoid(
        &mut self,
        variable: &str,
        label: &str,
        [a, b, c, d]: [f64; 4],
    ) -> Result<&mut Self, ShapeError> {
        let id = SetId::new(variable, label);
        let shape = Trapezoid::new(&id.to_string(), a, b, c, d)?;
        let universe = Universe::covering(&shape, self.resolution)?;
        self.insert(FuzzySet::new(id, shape, universe)?)
    }

    /// Add a trapezoid sampled over `[min, max]`.
    pub fn trapezoid_in(
        &mut self,
        variable: &str,
        label: &str,
        [a, b, c, d]: [f64; 4],
        (min, max): (f64, f64),
    ) -> Result<&mut Self, ShapeError> {
        let id = SetId::new(variable, label);
        let shape = Trapezoid::new(&id.to_string(), a, b, c, d)?;
        let universe = Universe::new(min, max, self.resolution)?;
        self.insert(FuzzySet::new(id, shape, universe)?)
    }

    pub fn build(self) -> FuzzySetCatalog {
        let mut by_variable: HashMap<String, Vec<usize>> = HashMap::new();
        let mut variables = Vec::new();
        let mut grids: HashMap<String, Universe> = HashMap::new();

        for (i, set) in self.sets.iter().enumerate() {
            let variable = set.variable();
            match by_variable.get_mut(variable) {
                Some(members) => members.push(i),
                None => {
                    variables.push(variable.to_string());
                    by_variable.insert(variable.to_string(), vec![i]);
                }
            }
            grids
                .entry(variable.to_string())
                .and_modify(|g| *g = g.hull(set.universe()))
                .or_insert(*set.universe());
        }

        tracing::debug!(
            sets = self.sets.len(),
            variables = variables.len(),
            "built fuzzy set catalog"
        );

        FuzzySetCatalog {
            sets: self.sets,
            index: self.index,
            by_variable,
            variables,
            grids,
        }
    }
}
