// sharpdoc: C# documentation generator with a terminal browser

mod cli;

use clap::Parser;
use cli::{Cli, Commands, Session};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The TUI owns the screen, so only warnings get through by default
    let default_level = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Browse(_), false) => "warn",
        (_, false) => "info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut session = Session::load(cli.config)?;
    match cli.command {
        Commands::Outline(args) => cli::outline_command(&mut session, args)?,
        Commands::Export(args) => cli::export_command(&mut session, args)?,
        Commands::Browse(args) => cli::browse_command(&mut session, args)?,
    }

    Ok(())
}
