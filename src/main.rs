use anyhow::Result;
use keka_clicker::commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    Cli::menu().await
}
