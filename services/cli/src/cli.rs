use crate::report::{
    run_analyze, run_categories, run_indicators, run_score, run_seed, AnalyzeArgs,
    IndicatorArgs, ScoreArgs, SeedArgs,
};
use case_triage::config::AppConfig;
use case_triage::error::AppError;
use case_triage::telemetry;
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "case-triage",
    about = "Score and rank flagged wrongful-conviction cases from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate synthetic cases and print the ranked review queue (default command)
    Seed(SeedArgs),
    /// Score an indicator worksheet exported as CSV
    Score(ScoreArgs),
    /// Scan case documents for indicators and score the resulting case
    Analyze(AnalyzeArgs),
    /// List the innocence indicator catalog
    Indicators(IndicatorArgs),
    /// List indicator categories and their weights
    Categories,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    let command = cli
        .command
        .unwrap_or_else(|| Command::Seed(SeedArgs::default()));

    match command {
        Command::Seed(args) => run_seed(args, &config),
        Command::Score(args) => run_score(args, &config),
        Command::Analyze(args) => run_analyze(args, &config),
        Command::Indicators(args) => run_indicators(args),
        Command::Categories => run_categories(),
    }
}
