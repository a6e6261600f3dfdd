use anyhow::Result;
use nook::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
