use anyhow::Result;
use campus_route::cli::{self, Cli};
use campus_route::logging::init_tracing;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    init_tracing(&config.logging);

    cli::run(cli.command, config).await
}
