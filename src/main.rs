use anyhow::Result;
use clap::Parser;
use terminal_lightning::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    terminal_lightning::run(cli).await
}
