//! Rich diagnostic error types for the fuzzy inference engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum FisError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Infer(#[from] InferError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Shape errors (construction time)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ShapeError {
    #[error("breakpoints of {set} are out of order: a={a}, b={b}, c={c}, d={d}")]
    #[diagnostic(
        code(fis::shape::unordered),
        help(
            "A trapezoid needs a <= b <= c <= d. Use b == c for a triangle, \
             and a == b or c == d for a vertical edge."
        )
    )]
    Unordered {
        set: String,
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    },

    #[error("breakpoint of {set} is not a finite number")]
    #[diagnostic(
        code(fis::shape::non_finite),
        help("Breakpoints must be finite. NaN and infinities cannot be sampled.")
    )]
    NonFinite { set: String },

    #[error("invalid universe [{min}, {max}] with step {step}")]
    #[diagnostic(
        code(fis::shape::invalid_universe),
        help(
            "A universe needs finite bounds with min <= max, a finite step > 0, \
             and at most 10 million samples. Raise the step or narrow the bounds."
        )
    )]
    InvalidUniverse { min: f64, max: f64, step: f64 },

    #[error("universe [{min}, {max}] of {set} does not cover its support [{a}, {d}]")]
    #[diagnostic(
        code(fis::shape::universe_too_narrow),
        help(
            "The sampled grid must span at least [a, d], otherwise part of the \
             membership function is never sampled. Widen xmin/xmax."
        )
    )]
    UniverseTooNarrow {
        set: String,
        min: f64,
        max: f64,
        a: f64,
        d: f64,
    },

    #[error("fuzzy set {set} is defined more than once")]
    #[diagnostic(
        code(fis::shape::duplicate_set),
        help("Each (variable, label) pair may appear only once in a catalog.")
    )]
    DuplicateSet { set: String },
}

// ---------------------------------------------------------------------------
// Catalog errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("undefined fuzzy set {set}")]
    #[diagnostic(
        code(fis::catalog::undefined_set),
        help("No fuzzy set with this variable and label exists in the catalog.")
    )]
    UndefinedFuzzySet { set: String },

    #[error("variable \"{variable}\" has no fuzzy sets")]
    #[diagnostic(
        code(fis::catalog::undefined_variable),
        help("Define at least one fuzzy set for this variable in the catalog.")
    )]
    UndefinedVariable { variable: String },
}

// ---------------------------------------------------------------------------
// Rule errors (construction time)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("rule \"{rule}\" has an empty antecedent")]
    #[diagnostic(
        code(fis::rule::empty_antecedent),
        help("Every rule needs at least one `Var=Label` condition after its consequent.")
    )]
    EmptyAntecedent { rule: String },

    #[error("rule \"{rule}\" is defined more than once")]
    #[diagnostic(
        code(fis::rule::duplicate),
        help("Rule names identify rules in reports. Rename one of the duplicates.")
    )]
    DuplicateRule { rule: String },
}

// ---------------------------------------------------------------------------
// Inference errors (per observation)
// ---------------------------------------------------------------------------

/// Where an undefined fuzzy-set reference was encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupSite {
    Fuzzification,
    Antecedent { rule: String },
    Consequent { rule: String },
}

impl std::fmt::Display for LookupSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupSite::Fuzzification => write!(f, "fuzzification"),
            LookupSite::Antecedent { rule } => write!(f, "antecedent of rule \"{rule}\""),
            LookupSite::Consequent { rule } => write!(f, "consequent of rule \"{rule}\""),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum InferError {
    #[error("observation \"{observation}\": undefined fuzzy set {set} in {site}")]
    #[diagnostic(
        code(fis::infer::undefined_set),
        help(
            "Every referenced variable must be fuzzified. Check that the observation \
             supplies the variable and that the catalog defines the label."
        )
    )]
    UndefinedFuzzySet {
        observation: String,
        set: String,
        site: LookupSite,
    },

    #[error("observation \"{observation}\": no rule fired, aggregate output is empty")]
    #[diagnostic(
        code(fis::infer::empty_aggregate),
        help(
            "The crisp inputs lie outside the support of every antecedent. \
             This is not a zero result; add rules covering this region if an \
             answer is expected."
        )
    )]
    EmptyAggregate { observation: String },

    #[error("observation \"{observation}\": value of \"{variable}\" is not finite")]
    #[diagnostic(
        code(fis::infer::non_finite_input),
        help("Crisp inputs must be finite numbers.")
    )]
    NonFiniteInput {
        observation: String,
        variable: String,
    },

    #[error("observation \"{observation}\": variable \"{variable}\" is given twice")]
    #[diagnostic(
        code(fis::infer::duplicate_input),
        help("Supply each input variable once per observation.")
    )]
    DuplicateInput {
        observation: String,
        variable: String,
    },

    #[error("output variable \"{variable}\" is not defined by the output catalog")]
    #[diagnostic(
        code(fis::infer::undefined_output),
        help("Select an output variable that has fuzzy sets in the output catalog.")
    )]
    UndefinedOutputVariable { variable: String },

    #[error("neither the rule base nor the output catalog names an output variable")]
    #[diagnostic(
        code(fis::infer::no_output),
        help("Load at least one output fuzzy set.")
    )]
    NoOutputVariable,

    #[error("rule base concludes on several output variables: {variables}")]
    #[diagnostic(
        code(fis::infer::ambiguous_output),
        help(
            "Inference runs once per output variable. Choose one with \
             `evaluate_variable` (or `--variable` on the command line)."
        )
    )]
    AmbiguousOutput { variables: String },
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("failed to read {path}")]
    #[diagnostic(
        code(fis::load::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    #[diagnostic(
        code(fis::load::parse),
        help(
            "Records are comma-separated with \", \". Fuzzy sets: `Var=Label, xmin, xmax, a, b, c, d`. \
             Rules: `Name, Out=Label, In=Label, ...`. Applications: `Id, Var, value, ...`."
        )
    )]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("{path}:{line}: invalid fuzzy set")]
    #[diagnostic(code(fis::load::shape))]
    Shape {
        path: String,
        line: usize,
        #[source]
        #[diagnostic_source]
        source: ShapeError,
    },

    #[error("{path}:{line}: invalid rule")]
    #[diagnostic(code(fis::load::rule))]
    Rule {
        path: String,
        line: usize,
        #[source]
        #[diagnostic_source]
        source: RuleError,
    },

    #[error("failed to write {path}")]
    #[diagnostic(
        code(fis::load::write),
        help("Ensure you have write permissions to the output location.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {message}")]
    #[diagnostic(code(fis::load::serde), help("Failed to serialize results as JSON."))]
    Serialization { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read engine config: {path}")]
    #[diagnostic(
        code(fis::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write engine config: {path}")]
    #[diagnostic(
        code(fis::config::write),
        help("Ensure you have write permissions to the config location.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse engine config: {path}: {message}")]
    #[diagnostic(
        code(fis::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(fis::config::invalid), help("Check the EngineConfig fields. {message}"))]
    Invalid { message: String },
}

/// Convenience alias for functions returning engine results.
pub type FisResult<T> = std::result::Result<T, FisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_error_converts_to_fis_error() {
        let err = ShapeError::NonFinite {
            set: "Temp=Low".into(),
        };
        let fis: FisError = err.into();
        assert!(matches!(fis, FisError::Shape(ShapeError::NonFinite { .. })));
    }

    #[test]
    fn infer_error_converts_to_fis_error() {
        let err = InferError::EmptyAggregate {
            observation: "app-1".into(),
        };
        let fis: FisError = err.into();
        assert!(matches!(fis, FisError::Infer(InferError::EmptyAggregate { .. })));
    }

    #[test]
    fn undefined_set_message_names_observation_and_rule() {
        let err = InferError::UndefinedFuzzySet {
            observation: "app-7".into(),
            set: "Age=Old".into(),
            site: LookupSite::Antecedent { rule: "R3".into() },
        };
        let msg = format!("{err}");
        assert!(msg.contains("app-7"));
        assert!(msg.contains("Age=Old"));
        assert!(msg.contains("R3"));
    }

    #[test]
    fn parse_error_reports_line() {
        let err = LoadError::Parse {
            path: "Rules.txt".into(),
            line: 4,
            message: "missing consequent".into(),
        };
        assert_eq!(format!("{err}"), "Rules.txt:4: missing consequent");
    }
}
