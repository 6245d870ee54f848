//! `graphloom` command-line entry point.

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::{exit_with_error, CliResult};

fn init_tracing(cli: &Cli) {
    let filter = if cli.quiet {
        EnvFilter::new("off")
    } else if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"))
    };
    let ansi = !cli.no_color && std::env::var_os("NO_COLOR").is_none();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Map {
            ref mapping,
            ref data,
            ref base,
            ref out,
        } => commands::map::run(mapping, data, base.as_deref(), out.as_deref(), cli.quiet),
        Commands::Inspect {
            ref mapping,
            ref base,
        } => commands::inspect::run(mapping, base.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }
    init_tracing(&cli);
    if let Err(err) = run(cli) {
        exit_with_error(err);
    }
}
