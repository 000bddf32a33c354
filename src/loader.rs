//! Loaders for the comma-separated description files.
//!
//! Three record formats, one record per line, fields separated by commas:
//!
//! - fuzzy sets: `Var=Label, xmin, xmax, a, b, c, d`
//! - rules: `Name, OutVar=OutLabel, InVar=Label, InVar=Label, ...`
//! - applications: `Id, Var, value, Var, value, ...`
//!
//! The files are written with `", "` between fields; any whitespace around a
//! comma is trimmed, so a bare `,` reads the same. Blank lines and lines
//! starting with `#` are skipped.

use std::path::Path;

use crate::error::{FisResult, LoadError};
use crate::membership::Trapezoid;
use crate::observation::Observation;
use crate::rule::{Rule, RuleBase};
use crate::set::{CatalogBuilder, FuzzySet, FuzzySetCatalog, SetId};
use crate::universe::Universe;

/// One non-blank line, split into trimmed fields.
struct Record<'t> {
    path: &'t str,
    line: usize,
    fields: Vec<&'t str>,
}

impl<'t> Record<'t> {
    fn error(&self, message: impl Into<String>) -> LoadError {
        LoadError::Parse {
            path: self.path.to_string(),
            line: self.line,
            message: message.into(),
        }
    }

    fn number(&self, idx: usize, what: &str) -> Result<f64, LoadError> {
        let raw = self.fields[idx];
        raw.parse::<f64>()
            .map_err(|_| self.error(format!("{what} is not a number: \"{raw}\"")))
    }

    fn set_id(&self, idx: usize) -> Result<SetId, LoadError> {
        let raw = self.fields[idx];
        SetId::parse(raw).ok_or_else(|| self.error(format!("expected Var=Label, got \"{raw}\"")))
    }
}

fn records<'t>(path: &'t str, text: &'t str) -> impl Iterator<Item = Record<'t>> {
    text.lines().enumerate().filter_map(move |(i, line)| {
        let line_trim = line.trim();
        if line_trim.is_empty() || line_trim.starts_with('#') {
            return None;
        }
        Some(Record {
            path,
            line: i + 1,
            fields: line_trim.split(',').map(str::trim).collect(),
        })
    })
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parse fuzzy-set records into a catalog sampled at `resolution`.
pub fn parse_fuzzy_sets(path: &str, text: &str, resolution: f64) -> FisResult<FuzzySetCatalog> {
    let mut builder = CatalogBuilder::with_resolution(resolution);
    for rec in records(path, text) {
        if rec.fields.len() != 7 {
            return Err(rec
                .error(format!(
                    "fuzzy set needs 7 fields (Var=Label, xmin, xmax, a, b, c, d), found {}",
                    rec.fields.len()
                ))
                .into());
        }
        let id = rec.set_id(0)?;
        let (xmin, xmax) = (rec.number(1, "xmin")?, rec.number(2, "xmax")?);
        let [a, b, c, d] = [
            rec.number(3, "a")?,
            rec.number(4, "b")?,
            rec.number(5, "c")?,
            rec.number(6, "d")?,
        ];

        let shape_error = |source| LoadError::Shape {
            path: path.to_string(),
            line: rec.line,
            source,
        };
        let name = id.to_string();
        let set = Trapezoid::new(&name, a, b, c, d)
            .and_then(|shape| Ok((shape, Universe::new(xmin, xmax, resolution)?)))
            .and_then(|(shape, universe)| FuzzySet::new(id, shape, universe))
            .map_err(shape_error)?;
        builder.insert(set).map_err(shape_error)?;
    }
    let catalog = builder.build();
    tracing::info!(path, sets = catalog.len(), "loaded fuzzy sets");
    Ok(catalog)
}

pub fn load_fuzzy_sets(path: &Path, resolution: f64) -> FisResult<FuzzySetCatalog> {
    parse_fuzzy_sets(&path.display().to_string(), &read(path)?, resolution)
}

/// Parse rule records. The consequent comes first, then the conjuncts.
pub fn parse_rules(path: &str, text: &str) -> FisResult<RuleBase> {
    let mut rules = Vec::new();
    for rec in records(path, text) {
        if rec.fields.len() < 2 || rec.fields[0].is_empty() {
            return Err(rec.error("rule needs a name and a consequent").into());
        }
        let consequent = rec.set_id(1)?;
        let antecedent = (2..rec.fields.len())
            .map(|i| rec.set_id(i))
            .collect::<Result<Vec<_>, _>>()?;
        let rule = Rule::new(rec.fields[0], antecedent, consequent).map_err(|source| {
            LoadError::Rule {
                path: path.to_string(),
                line: rec.line,
                source,
            }
        })?;
        rules.push(rule);
    }
    let base = RuleBase::new(rules)?;
    tracing::info!(path, rules = base.len(), "loaded rules");
    Ok(base)
}

pub fn load_rules(path: &Path) -> FisResult<RuleBase> {
    parse_rules(&path.display().to_string(), &read(path)?)
}

/// Parse application records into observations.
pub fn parse_applications(path: &str, text: &str) -> FisResult<Vec<Observation>> {
    let mut apps = Vec::new();
    for rec in records(path, text) {
        if rec.fields[0].is_empty() {
            return Err(rec.error("application needs an id").into());
        }
        if rec.fields.len() % 2 == 0 {
            return Err(rec
                .error("application needs an id followed by Var, value pairs")
                .into());
        }
        let mut obs = Observation::new(rec.fields[0]);
        for i in (1..rec.fields.len()).step_by(2) {
            let value = rec.number(i + 1, rec.fields[i])?;
            obs = obs.with_input(rec.fields[i], value);
        }
        apps.push(obs);
    }
    tracing::info!(path, applications = apps.len(), "loaded applications");
    Ok(apps)
}

pub fn load_applications(path: &Path) -> FisResult<Vec<Observation>> {
    parse_applications(&path.display().to_string(), &read(path)?)
}
