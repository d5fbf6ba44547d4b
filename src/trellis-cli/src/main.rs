//! Trellis CLI - main entry point.
//!
//! Parses arguments, initializes logging, dispatches the command and turns
//! any error into a concise message plus a non-zero exit.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod styled_output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = dispatch(cli).await {
        styled_output::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login(args) => commands::login::run(args).await,
        Commands::Logout => commands::logout::run().await,
        Commands::Whoami => commands::whoami::run().await,
        Commands::List => commands::list::run().await,
        Commands::Link(args) => commands::link::run(args).await,
        Commands::Unlink => commands::unlink::run().await,
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("TRELLIS_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
