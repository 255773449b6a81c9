
mod cli;
mod commands;
mod io;

use cli::{Cli, Commands};
use commands::{density, idw, sample};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match &cli.command {
        Commands::Density(args) => density::run(&cli, args),
        Commands::Idw(args) => idw::run(&cli, args),
        Commands::Sample(args) => sample::run(&cli, args),
    }
}

fn setup_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> anyhow::Result<()> { run() }
