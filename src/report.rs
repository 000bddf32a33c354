//! Result writers and human-readable summaries.

use std::io::Write;
use std::path::Path;

use miette::Diagnostic;
use serde::Serialize;

use crate::error::LoadError;
use crate::infer::{BatchOutcome, Evaluation};
use crate::set::FuzzySetCatalog;

/// Output format for batch results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `<id> <value>` per line.
    #[default]
    Text,
    Json,
}

/// One row of the JSON export.
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

fn error_code(e: &dyn Diagnostic) -> String {
    e.code().map(|c| c.to_string()).unwrap_or_else(|| "error".into())
}

/// Write one `<id> <value>` line per outcome.
///
/// Failed observations are skipped unless `keep_errors`, in which case they
/// are written as `<id> ERROR <code>`.
pub fn write_text(
    out: &mut impl Write,
    outcomes: &[BatchOutcome],
    keep_errors: bool,
) -> std::io::Result<()> {
    for outcome in outcomes {
        match &outcome.result {
            Ok(value) => writeln!(out, "{} {}", outcome.id, value)?,
            Err(e) if keep_errors => writeln!(out, "{} ERROR {}", outcome.id, error_code(e))?,
            Err(_) => {}
        }
    }
    Ok(())
}

/// Pretty JSON array of results. Failed observations carry `error` and `code`.
pub fn to_json(outcomes: &[BatchOutcome], keep_errors: bool) -> Result<String, LoadError> {
    let rows: Vec<ResultRow<'_>> = outcomes
        .iter()
        .filter(|o| keep_errors || o.is_ok())
        .map(|o| match &o.result {
            Ok(value) => ResultRow {
                id: &o.id,
                value: Some(*value),
                error: None,
                code: None,
            },
            Err(e) => ResultRow {
                id: &o.id,
                value: None,
                error: Some(e.to_string()),
                code: Some(error_code(e)),
            },
        })
        .collect();
    serde_json::to_string_pretty(&rows).map_err(|e| LoadError::Serialization {
        message: e.to_string(),
    })
}

/// Render outcomes in `format` and write them to `path`.
pub fn save(
    path: &Path,
    outcomes: &[BatchOutcome],
    format: Format,
    keep_errors: bool,
) -> Result<(), LoadError> {
    let write_err = |source| LoadError::Write {
        path: path.display().to_string(),
        source,
    };
    let mut file = std::io::BufWriter::new(std::fs::File::create(path).map_err(write_err)?);
    match format {
        Format::Text => write_text(&mut file, outcomes, keep_errors).map_err(write_err)?,
        Format::Json => {
            let json = to_json(outcomes, keep_errors)?;
            writeln!(file, "{json}").map_err(write_err)?;
        }
    }
    file.flush().map_err(write_err)
}

/// Listing of a catalog's variables and sets.
pub struct CatalogSummary<'a>(pub &'a FuzzySetCatalog);

impl std::fmt::Display for CatalogSummary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let catalog = self.0;
        writeln!(f, "{} fuzzy sets", catalog.len())?;
        for variable in catalog.variables() {
            match catalog.grid(variable) {
                Ok(grid) => writeln!(f, "{variable}  {grid}")?,
                Err(_) => writeln!(f, "{variable}")?,
            }
            for set in catalog.sets_for_variable(variable) {
                writeln!(
                    f,
                    "  {:<16} {}  over {}",
                    set.label(),
                    set.shape(),
                    set.universe()
                )?;
            }
        }
        Ok(())
    }
}

/// Rule strengths and result of one evaluation.
pub struct Explanation<'a>(pub &'a Evaluation);

impl std::fmt::Display for Explanation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let eval = self.0;
        writeln!(f, "observation {} -> {}", eval.observation, eval.variable)?;
        for firing in &eval.firings {
            writeln!(f, "  {:<16} strength {:.4}", firing.rule, firing.strength)?;
        }
        match eval.value {
            Some(value) => writeln!(f, "  centroid {value:.4}"),
            None => writeln!(f, "  no rule fired"),
        }
    }
}
