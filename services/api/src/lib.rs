mod cli;
mod demo;
mod infra;
mod quote;
mod routes;
mod server;

use shiprate::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
