//! Taskweave CLI.
//!
//! Validates and executes wire-shape plan files against the standard
//! analytics capability set over a JSON dataset. Replanning is disabled
//! here (checkpoint tasks keep the current plan): the CLI is a driver,
//! not a reasoning backend.

use clap::{Parser, Subcommand};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use taskweave::{
    AnalyticsDataset, DatasetError, EngineError, InMemoryTraceSink, NullOracle, Plan,
    PlanParseError, RunRequest, Scheduler, TraceSink, Value, standard_registry, validate_plan,
};
use taskweave::CapabilityRegistry;

#[derive(Parser, Debug)]
#[command(name = "taskweave", version)]
#[command(about = "Adaptive plan execution for analytical assistants")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate and execute a plan against a dataset
    Run {
        /// Path to the wire-shape plan JSON (a list of task objects)
        #[arg(long)]
        plan: PathBuf,
        /// Path to the analytics dataset JSON
        #[arg(long)]
        dataset: PathBuf,
        /// The user question driving the run
        #[arg(long, default_value = "ad-hoc analysis")]
        question: String,
        /// Print the recorded audit trace after the run
        #[arg(long)]
        trace: bool,
    },
    /// Validate a plan without executing it
    Validate {
        /// Path to the wire-shape plan JSON
        #[arg(long)]
        plan: PathBuf,
        /// Path to the analytics dataset JSON
        #[arg(long)]
        dataset: PathBuf,
    },
}

#[derive(Debug)]
enum CliError {
    Io(PathBuf, std::io::Error),
    Json(PathBuf, serde_json::Error),
    Dataset(DatasetError),
    InvalidPlan { errors: Vec<String> },
    Parse(PlanParseError),
    Engine(EngineError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(path, err) => write!(f, "cannot read {}: {}", path.display(), err),
            CliError::Json(path, err) => {
                write!(f, "{} is not valid JSON: {}", path.display(), err)
            }
            CliError::Dataset(err) => write!(f, "{}", err),
            CliError::InvalidPlan { errors } => {
                writeln!(f, "plan failed validation:")?;
                for error in errors {
                    writeln!(f, "  - {}", error)?;
                }
                Ok(())
            }
            CliError::Parse(err) => write!(f, "{}", err),
            CliError::Engine(err) => write!(f, "{}", err),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Run {
            plan,
            dataset,
            question,
            trace,
        } => run(&plan, &dataset, &question, trace),
        Commands::Validate { plan, dataset } => validate(&plan, &dataset),
    }
}

fn load_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|err| CliError::Io(path.to_path_buf(), err))
}

fn load_plan(path: &Path) -> Result<Value, CliError> {
    let text = load_text(path)?;
    serde_json::from_str(&text).map_err(|err| CliError::Json(path.to_path_buf(), err))
}

fn load_dataset(path: &Path) -> Result<Arc<AnalyticsDataset>, CliError> {
    let text = load_text(path)?;
    AnalyticsDataset::from_json_str(&text)
        .map(Arc::new)
        .map_err(CliError::Dataset)
}

fn validate(plan_path: &Path, dataset_path: &Path) -> Result<(), CliError> {
    let plan = load_plan(plan_path)?;
    let registry = standard_registry(load_dataset(dataset_path)?);

    let validation = validate_plan(&plan, &registry.known_names());
    if !validation.ok {
        return Err(CliError::InvalidPlan {
            errors: validation.errors,
        });
    }

    let parsed = Plan::from_wire(&plan).map_err(CliError::Parse)?;
    println!("plan is valid ({} tasks)", parsed.len());
    Ok(())
}

fn run(plan_path: &Path, dataset_path: &Path, question: &str, show_trace: bool) -> Result<(), CliError> {
    let plan = load_plan(plan_path)?;
    let registry = Arc::new(standard_registry(load_dataset(dataset_path)?));

    let validation = validate_plan(&plan, &registry.known_names());
    if !validation.ok {
        return Err(CliError::InvalidPlan {
            errors: validation.errors,
        });
    }
    let plan = Plan::from_wire(&plan).map_err(CliError::Parse)?;

    let sink = Arc::new(InMemoryTraceSink::new());
    let scheduler = Scheduler::new(registry, Arc::new(NullOracle), Arc::clone(&sink) as Arc<dyn TraceSink>);
    let outcome = scheduler
        .run(RunRequest::new(question, plan))
        .map_err(CliError::Engine)?;
    tracing::info!(
        outputs = outcome.outputs.len(),
        versions = outcome.versions.len(),
        "run complete"
    );

    let rendered = serde_json::to_string_pretty(&outcome.outputs.to_value())
        .unwrap_or_else(|_| "{}".to_string());
    println!("{}", rendered);
    println!(
        "completed: {} outputs across {} plan version(s)",
        outcome.outputs.len(),
        outcome.versions.len()
    );

    if show_trace {
        print_trace(&sink);
    }
    Ok(())
}


fn print_trace(sink: &InMemoryTraceSink) {
    for run in sink.runs() {
        println!("[run]  {}  {}  {:?}", run.id, run.status, run.question);
    }
    for step in sink.steps() {
        println!("[step] {}  {}  {}", step.id, step.name, step.status);
        for call in sink.tool_calls_for(step.id) {
            match &call.error {
                Some(error) => {
                    println!("  [call] {}  {}  error: {}", call.capability, call.status, error)
                }
                None => println!("  [call] {}  {}", call.capability, call.status),
            }
        }
    }
}
