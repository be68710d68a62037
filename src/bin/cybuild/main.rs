//! Cybuild CLI - build orchestration for Cython extension packages

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cybuild::util::{GlobalContext, ProcessError};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

/// A failing child's exit code, else 1.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|e| e.downcast_ref::<ProcessError>())
        .and_then(ProcessError::exit_code)
        .filter(|&code| code != 0)
        .unwrap_or(1)
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("cybuild=debug")
    } else {
        EnvFilter::new("cybuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_timeout(cli.timeout.map(Duration::from_secs));

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(&ctx, args),
        Commands::BuildExt(args) => commands::build_ext::execute(&ctx, args),
        Commands::BuildPy => commands::build_py::execute(&ctx),
        Commands::Configure => commands::configure::execute(&ctx),
        Commands::InitPxd(args) => commands::init_pxd::execute(&ctx, args),
        Commands::DataFiles(args) => commands::data_files::execute(&ctx, args),
        Commands::Clean(args) => commands::clean::execute(&ctx, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
