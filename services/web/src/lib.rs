mod cli;
mod commands;
mod infra;
mod routes;
mod server;
mod views;

use topsis_form::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
