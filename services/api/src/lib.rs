mod assign;
mod cli;
mod infra;
mod routes;
mod server;

use crew_roster::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
