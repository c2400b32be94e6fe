use anyhow::Result;
use clap::Parser;

use sdrchat::app::{run_repl_mode, setup_from_cli};
use sdrchat::cli::Cli;
use sdrchat::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = setup_from_cli(&cli)?;

    // If a subcommand was provided, execute it and exit
    if let Some(ref command) = cli.command {
        let result = command.execute(&config).await?;
        println!("{}", result);
        return Ok(());
    }

    run_repl_mode(config).await
}
