//! # Squeeze Main Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! This file serves as the main entry point for the Squeeze CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the pack or info handler
//! - Turning the outcome into a message and an exit code
//!
//! ## Architecture
//!
//! Squeeze is a single command: the pack flags are flattened into `Cli`, and
//! `--info` short-circuits before anything touches the filesystem. All errors
//! are propagated to this level and reported exactly once.
//!
//! Exit codes:
//! - `0`: archive created (or `--info`)
//! - `1`: configuration, discovery or archiving error; no archive is left behind
//! - `130`: stopped by Ctrl+C / SIGTERM; the temporary archive was deleted
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! squeeze --help
//!
//! # Pack ./src into ./out as tar.gz, logging each entry
//! squeeze -vv -m tar.gz -i ./src -o ./out
//! ```
//!
use clap::Parser;
use commands::pack::{PackArgs, PipelineOutcome, INTERRUPTED_MESSAGE};
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // `pack` and `info` handlers
mod common; // Archive engine, filesystem discovery, terminal output
mod core; // Errors and configuration

const EXIT_FAILURE: i32 = 1;
const EXIT_INTERRUPTED: i32 = 130;

/// Defines the command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "squeeze",
    about = "Squeeze: pack a directory into one zip or tar.gz archive, grouped by file extension",
    long_about = "Walks a directory, groups files by extension and writes them into a single\n\
                  zip or tar.gz archive named after the current time (YYYYMMDD_HHMMSS).\n\
                  The archive appears only once it is complete; Ctrl+C removes it.",
    version
)]
struct Cli {
    #[command(flatten)]
    pack: PackArgs,

    /// Print application info and exit.
    #[arg(long)]
    info: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if cli.info {
        commands::info::handle_info();
        return;
    }

    match commands::pack::handle_pack(cli.pack).await {
        Ok(PipelineOutcome::Saved(_)) => {}
        Ok(PipelineOutcome::Interrupted) => {
            common::ui::info(INTERRUPTED_MESSAGE);
            std::process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => {
            // `ui::error` is the one user-facing report; the log keeps the debug form.
            tracing::debug!("Command execution failed: {:?}", e);
            common::ui::error(&format!("{:#}", e));
            std::process::exit(EXIT_FAILURE);
        }
    }
}
