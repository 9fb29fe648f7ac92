use anyhow::Result;
use edugenius::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
