// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # mamdani-fis
//!
//! A Mamdani fuzzy inference engine: crisp observations are fuzzified against
//! trapezoidal input sets, rules fire with min as t-norm and implication,
//! clipped consequents are aggregated with max, and the aggregate is
//! defuzzified to a crisp value by its centroid.
//!
//! ## Architecture
//!
//! - **Membership** (`membership`): closed-form trapezoids
//! - **Universes** (`universe`): uniform sampling grids, interpolation, resampling
//! - **Catalogs** (`set`): fuzzy sets keyed by `(variable, label)`
//! - **Rules** (`rule`): ordered conjunctive rule base
//! - **Inference** (`infer`): stateless engine, centroid defuzzification, rayon batches
//! - **I/O** (`loader`, `report`): description files in, result files out
//!
//! ## Library usage
//!
//! ```
//! use mamdani_fis::infer::InferenceEngine;
//! use mamdani_fis::observation::Observation;
//! use mamdani_fis::rule::{Rule, RuleBase};
//! use mamdani_fis::set::{CatalogBuilder, SetId};
//!
//! let mut inputs = CatalogBuilder::new();
//! inputs.trapezoid_in("Temp", "High", [30.0, 50.0, 100.0, 100.0], (0.0, 100.0)).unwrap();
//! let inputs = inputs.build();
//!
//! let mut outputs = CatalogBuilder::new();
//! outputs.trapezoid_in("Risk", "High", [40.0, 60.0, 100.0, 100.0], (0.0, 100.0)).unwrap();
//! let outputs = outputs.build();
//!
//! let rules = RuleBase::new(vec![
//!     Rule::new("R1", vec![SetId::new("Temp", "High")], SetId::new("Risk", "High")).unwrap(),
//! ])
//! .unwrap();
//!
//! let engine = InferenceEngine::new(&inputs, &outputs, &rules);
//! let risk = engine
//!     .evaluate(&Observation::new("a").with_input("Temp", 90.0))
//!     .unwrap();
//! assert!(risk > 60.0);
//! ```

pub mod config;
pub mod error;
pub mod infer;
pub mod loader;
pub mod membership;
pub mod observation;
pub mod report;
pub mod rule;
pub mod set;
pub mod universe;
