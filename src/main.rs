use clap::Parser;
use tracing_subscriber::EnvFilter;

mod checking;
mod cli;
mod core;
mod parsing;
mod race;
mod readout;
mod splits;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("orient_results=debug,info")
    } else {
        EnvFilter::new("orient_results=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Check(args) => {
            cli::check::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Splits(args) => {
            cli::splits::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Penalty(args) => {
            cli::penalty::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
