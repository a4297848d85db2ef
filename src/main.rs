mod burndown;
mod cli;
mod client;
mod commands;
mod config;
mod csv_source;
mod error;
mod logger;
mod output;
mod report;
mod responses;
mod sprint_file;
mod types;

use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{Cli, Commands};
use client::LinearClient;
use config::Config;
use error::Result;
use std::error::Error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = std::error::Error::source(cause);
            }
        }

        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    logger::initialize(cli.verbose)?;

    // Set global output format
    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    match cli.command {
        // Commands that don't require config
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "burndown", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run()?;
        }
        // File-based commands
        Commands::Report(args) => {
            let config = Config::load()?;
            commands::report::run(&config, args)?;
        }
        Commands::Batch(args) => {
            let config = Config::load()?;
            commands::batch::run(&config, args)?;
        }
        // Commands that require a Linear client
        command => {
            let config = Config::load()?;
            let client = LinearClient::new(config.api_key()?);

            match command {
                Commands::Cycles { team } => {
                    commands::cycles::list(&client, &config, team).await?;
                }
                Commands::Cycle(args) => {
                    commands::cycles::burndown(&client, &config, args).await?;
                }
                Commands::Completions { .. }
                | Commands::Init
                | Commands::Report(_)
                | Commands::Batch(_) => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
