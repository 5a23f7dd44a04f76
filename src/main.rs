mod cli;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Generate(args) => match command::generate(args).await {
            Ok(dir) => println!("Files saved to `{}`", dir),
            Err(e) => eprintln!("Error: {}", e),
        },
        Commands::Query(args) => {
            if let Err(e) = command::query(args) {
                eprintln!("Error: {}", e);
            }
        }
        Commands::Availability(args) => {
            if let Err(e) = command::availability(args) {
                eprintln!("Error: {}", e);
            }
        }
        Commands::Distribution(args) => match command::distribution(args) {
            Ok(filename) => println!("File saved to `{}`", filename),
            Err(e) => eprintln!("Error: {}", e),
        },
    }

    Ok(())
}
