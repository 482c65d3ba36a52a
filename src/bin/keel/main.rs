//! Keel CLI - C++ project scaffolding and CMake build orchestration

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use keel::core::platform::PlatformFamily;

fn main() {
    // Usage errors exit with 1 like every other failure
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("keel=debug")
    } else {
        EnvFilter::new("keel=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Running on {}", PlatformFamily::host());

    // Execute command
    match cli.command {
        Commands::New(args) => commands::new::execute(args),
        Commands::Init(args) => commands::init::execute(args),
        Commands::Build(args) => commands::build::execute(args),
        Commands::Install(args) => commands::install::execute(args),
        Commands::Uninstall(args) => commands::uninstall::execute(args),
        Commands::Get(args) => commands::get::execute(args),
        Commands::Clean(args) => commands::clean::execute(args),
    }
}
