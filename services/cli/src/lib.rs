mod cli;
mod infra;
mod report;

use case_triage::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
