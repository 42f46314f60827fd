use clap::{Args, Parser, Subcommand};
use reimbursement::config::AppConfig;
use reimbursement::corpus::RegressionCorpus;
use reimbursement::error::AppError;
use reimbursement::{telemetry, ReimbursementEngine, TripRecord};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "calculate-reimbursement",
    about = "Estimate travel reimbursements the way the legacy approval process does",
    version,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true,
    allow_negative_numbers = true
)]
pub(crate) struct Cli {
    #[command(flatten)]
    trip: TripArgs,
    /// Load estimation constants from a JSON policy file instead of the standard policy
    #[arg(long, global = true, value_name = "PATH")]
    policy: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct TripArgs {
    /// Trip length in days
    #[arg(required = true)]
    trip_duration_days: Option<u32>,
    /// Total miles driven
    #[arg(required = true)]
    miles_traveled: Option<f64>,
    /// Total submitted receipts in dollars
    #[arg(required = true)]
    total_receipts_amount: Option<f64>,
    /// Print the full estimate with its adjustment trail as JSON
    #[arg(long)]
    explain: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the engine against a corpus of historical approvals (.json or .csv)
    Evaluate(EvaluateArgs),
    /// Print the active policy as JSON, a starting point for a custom policy file
    Policy,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Path to the regression corpus
    corpus: PathBuf,
    /// Number of worst cases to list
    #[arg(long, default_value_t = 5)]
    top: usize,
    /// Emit the report as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(path) = cli.policy {
        config.estimation.policy_path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let policy = config.estimation.policy()?;
    let engine = ReimbursementEngine::new(policy);

    match cli.command {
        Some(Command::Evaluate(args)) => evaluate(&engine, args),
        Some(Command::Policy) => {
            println!("{}", engine.policy().to_json()?);
            Ok(())
        }
        None => estimate(&engine, cli.trip),
    }
}

fn estimate(engine: &ReimbursementEngine, args: TripArgs) -> Result<(), AppError> {
    let trip = TripRecord::new(
        args.trip_duration_days.unwrap_or_default(),
        args.miles_traveled.unwrap_or_default(),
        args.total_receipts_amount.unwrap_or_default(),
    )?;

    if args.explain {
        let estimate = engine.estimate(&trip);
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        println!("{:.2}", engine.reimburse(&trip));
    }
    Ok(())
}

fn evaluate(engine: &ReimbursementEngine, args: EvaluateArgs) -> Result<(), AppError> {
    let corpus = RegressionCorpus::from_path(&args.corpus)?;
    info!(path = %args.corpus.display(), cases = corpus.len(), "loaded regression corpus");

    let report = corpus.evaluate(engine);
    if args.json {
        let payload = json!({
            "summary": report,
            "worst_cases": report.worst(args.top),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", report.render(args.top));
    }
    Ok(())
}
