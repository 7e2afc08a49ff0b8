//! # acct — Account Editor CLI
//!
//! Entry point for the `acct` binary. Parses arguments, installs the
//! tracing subscriber, and dispatches to the subcommand modules in the
//! library crate.
//!
//! Verbosity: none = `warn`, `-v` = `info`, `-vv` = `debug`, `-vvv` =
//! `trace`. `RUST_LOG` takes precedence when set.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use acct_cli::edit::{
    run_add, run_list, run_remove, run_save_valid, run_types, AddArgs, ListArgs, RemoveArgs,
    SaveValidArgs,
};
use acct_cli::validate::{run_validate, ValidateArgs};

/// Validate and edit account files.
#[derive(Parser, Debug)]
#[command(name = "acct", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate an account file and report invalid cells.
    Validate(ValidateArgs),

    /// Append an account row.
    Add(AddArgs),

    /// Remove an account row by index.
    Remove(RemoveArgs),

    /// Print the rows of an account file.
    List(ListArgs),

    /// Save only the rows that pass validation.
    SaveValid(SaveValidArgs),

    /// List the selectable account types.
    Types,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "acct starting");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Add(args) => run_add(&args),
        Commands::Remove(args) => run_remove(&args),
        Commands::List(args) => run_list(&args),
        Commands::SaveValid(args) => run_save_valid(&args),
        Commands::Types => run_types(),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
