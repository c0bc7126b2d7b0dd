use anyhow::Context;
use churnx_core::RawAnswers;
use churnx_model::{ClassifierArtifact, Predictor, PredictorConfig, ScalerArtifact, TrainedPipeline};
use churnx_schema::{CategoryPolicy, FeatureSchema};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Score customer churn risk from survey answers
#[derive(Parser, Debug)]
#[command(name = "churnx")]
#[command(about = "Score customer churn risk from survey answers", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ModelArgs {
    /// Path to the fitted scaler artifact (.json or bincode)
    #[arg(long, default_value = "models/churn_scaler.json")]
    scaler: PathBuf,

    /// Path to the fitted classifier artifact (.json or bincode)
    #[arg(long, default_value = "models/churn_model.json")]
    model: PathBuf,

    /// Reject unrecognized category labels instead of encoding them as the baseline
    #[arg(long)]
    strict_categories: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict churn for one customer
    Predict {
        #[command(flatten)]
        model: ModelArgs,

        /// JSON object of answers; "-" reads stdin
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Single answer, overriding the JSON input
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Also print the decoded feature vector
        #[arg(long)]
        explain: bool,
    },

    /// Predict churn for every JSON line of a file
    Batch {
        #[command(flatten)]
        model: ModelArgs,

        /// JSON-lines file, one answer object per line
        #[arg(long)]
        input: PathBuf,
    },

    /// Print the feature column layout
    Schema,

    /// Rewrite an artifact in another format (by output extension)
    Convert {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        #[arg(long, value_enum)]
        artifact: ArtifactKind,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ArtifactKind {
    Scaler,
    Classifier,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Predict {
            model,
            answers,
            set,
            explain,
        } => {
            let predictor = load_predictor(&model)?;
            let answers = read_answers(answers.as_deref(), &set)?;

            let result = predictor.predict(&answers)?;
            info!("{}", result.summary());

            let output = if explain {
                serde_json::json!({
                    "prediction": result.to_response(),
                    "explanation": predictor.explain(&answers)?,
                })
            } else {
                serde_json::to_value(result.to_response())?
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Batch { model, input } => {
            let predictor = load_predictor(&model)?;
            run_batch(&predictor, &input)?;
        }
        Command::Schema => {
            let schema = FeatureSchema::churn();
            println!("{}", serde_json::to_string_pretty(&schema.describe())?);
        }
        Command::Convert {
            input,
            output,
            artifact,
        } => {
            match artifact {
                ArtifactKind::Scaler => ScalerArtifact::load(&input)?.save(&output)?,
                ArtifactKind::Classifier => ClassifierArtifact::load(&input)?.save(&output)?,
            }
            info!("Converted {:?} -> {:?}", input, output);
        }
    }

    Ok(())
}

fn load_predictor(args: &ModelArgs) -> anyhow::Result<Predictor> {
    info!("Starting ChurnX v{}", env!("CARGO_PKG_VERSION"));
    info!("Scaler artifact: {:?}", args.scaler);
    info!("Classifier artifact: {:?}", args.model);

    let schema = FeatureSchema::churn();
    let pipeline = TrainedPipeline::load(&args.scaler, &args.model, &schema)
        .context("failed to load trained pipeline")?;

    let config = PredictorConfig {
        category_policy: if args.strict_categories {
            CategoryPolicy::Strict
        } else {
            CategoryPolicy::Baseline
        },
    };
    info!("Category policy: {:?}", config.category_policy);

    Ok(Predictor::new(Arc::new(pipeline), config)?)
}

fn read_answers(path: Option<&Path>, overrides: &[String]) -> anyhow::Result<RawAnswers> {
    let mut answers = match path {
        Some(p) if p == Path::new("-") => {
            let mut json = String::new();
            std::io::stdin().read_to_string(&mut json)?;
            RawAnswers::from_json(&json)?
        }
        Some(p) => {
            let json = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read answers from {:?}", p))?;
            RawAnswers::from_json(&json)?
        }
        None => RawAnswers::new(),
    };

    for (name, value) in RawAnswers::from_pairs(overrides)?.iter() {
        answers.insert(name.clone(), value.clone());
    }
    Ok(answers)
}

fn run_batch(predictor: &Predictor, input: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read batch input {:?}", input))?;

    let mut parsed = Vec::new();
    let mut rows = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match RawAnswers::from_json(line) {
            Ok(answers) => {
                parsed.push((i + 1, Ok(rows.len())));
                rows.push(answers);
            }
            Err(e) => parsed.push((i + 1, Err(e.to_string()))),
        }
    }

    let results = predictor.predict_batch(&rows);
    let total = parsed.len();
    let mut failures = 0;
    for (line, row) in parsed {
        let output = match row.map(|idx| &results[idx]) {
            Ok(Ok(result)) => serde_json::json!({ "line": line, "prediction": result.to_response() }),
            Ok(Err(e)) => {
                failures += 1;
                serde_json::json!({ "line": line, "error": e.to_string() })
            }
            Err(e) => {
                failures += 1;
                serde_json::json!({ "line": line, "error": e })
            }
        };
        println!("{}", output);
    }

    if failures > 0 {
        warn!("{} of {} lines failed", failures, total);
    }
    info!("Scored {} lines from {:?}", total - failures, input);
    Ok(())
}
