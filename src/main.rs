//! fis CLI: Mamdani fuzzy inference over description files.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use mamdani_fis::config::EngineConfig;
use mamdani_fis::infer::{BatchSummary, InferenceEngine, evaluate_batch};
use mamdani_fis::loader;
use mamdani_fis::report::{self, CatalogSummary, Explanation, Format};

#[derive(Parser)]
#[command(name = "fis", version, about = "Mamdani fuzzy inference engine")]
struct Cli {
    /// Engine configuration (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sampling step for fuzzy-set universes (overrides the config file).
    #[arg(long, global = true)]
    resolution: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SystemFiles {
    /// Input fuzzy sets (`Var=Label, xmin, xmax, a, b, c, d`).
    #[arg(long)]
    inputs: PathBuf,

    /// Output fuzzy sets, same format as inputs.
    #[arg(long)]
    outputs: PathBuf,

    /// Rules (`Name, Out=Label, In=Label, ...`).
    #[arg(long)]
    rules: PathBuf,

    /// Applications (`Id, Var, value, ...`).
    #[arg(long)]
    applications: PathBuf,

    /// Output variable to evaluate when rules conclude on several.
    #[arg(long)]
    variable: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every application and write the crisp results.
    Run {
        #[command(flatten)]
        files: SystemFiles,

        /// Results file. Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write results as JSON instead of `<id> <value>` lines.
        #[arg(long)]
        json: bool,

        /// Also write failed applications, tagged with their error code.
        #[arg(long)]
        keep_errors: bool,
    },

    /// Print rule strengths and the centroid for one application.
    Explain {
        #[command(flatten)]
        files: SystemFiles,

        /// Application id.
        #[arg(long)]
        application: String,
    },

    /// List the fuzzy sets in a description file.
    Sets {
        /// Fuzzy set file.
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(resolution) = cli.resolution {
        config.resolution = resolution;
    }
    config.validate()?;

    match cli.command {
        Commands::Run {
            files,
            out,
            json,
            keep_errors,
        } => {
            let input = loader::load_fuzzy_sets(&files.inputs, config.resolution)?;
            let output = loader::load_fuzzy_sets(&files.outputs, config.resolution)?;
            let rules = loader::load_rules(&files.rules)?;
            let apps = loader::load_applications(&files.applications)?;

            let engine = InferenceEngine::new(&input, &output, &rules);
            let variable = files.variable.or(config.output_variable.clone());
            let outcomes = evaluate_batch(&engine, &apps, variable.as_deref(), config.parallel);

            let format = if json { Format::Json } else { Format::Text };
            match out {
                Some(path) => {
                    report::save(&path, &outcomes, format, keep_errors)?;
                    let summary = BatchSummary::of(&outcomes);
                    println!(
                        "Wrote {} result(s) to {} ({} failed)",
                        summary.evaluated,
                        path.display(),
                        summary.failed
                    );
                }
                None => match format {
                    Format::Json => println!("{}", report::to_json(&outcomes, keep_errors)?),
                    Format::Text => {
                        let stdout = std::io::stdout();
                        report::write_text(&mut stdout.lock(), &outcomes, keep_errors)
                            .into_diagnostic()?;
                    }
                },
            }
        }

        Commands::Explain { files, application } => {
            let input = loader::load_fuzzy_sets(&files.inputs, config.resolution)?;
            let output = loader::load_fuzzy_sets(&files.outputs, config.resolution)?;
            let rules = loader::load_rules(&files.rules)?;
            let apps = loader::load_applications(&files.applications)?;

            let Some(app) = apps.iter().find(|a| a.id == application) else {
                miette::bail!("no application with id \"{}\"", application);
            };

            let engine = InferenceEngine::new(&input, &output, &rules);
            let evaluation = match files.variable.or(config.output_variable.clone()) {
                Some(v) => engine.explain_variable(app, &v)?,
                None => engine.explain(app)?,
            };
            print!("{}", Explanation(&evaluation));
        }

        Commands::Sets { file } => {
            let catalog = loader::load_fuzzy_sets(&file, config.resolution)?;
            print!("{}", CatalogSummary(&catalog));
        }
    }

    Ok(())
}
