//! `cert-bridge` — command-line entry point.
//!
//! Startup sequence:
//! 1. Parse the subcommand (`enc`, `dec`, `dec-simple`).
//! 2. Load key material from environment variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Run the command and print its result to stdout.
//!
//! Any failure exits non-zero with the error on stderr.

mod command;
mod config;
mod telemetry;

use anyhow::Result;
use clap::Parser;

/// Encode and decode identity-verification tokens.
#[derive(Parser, Debug)]
#[command(name = "cert-bridge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: command::Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::Config::from_env().map_err(|e| {
        eprintln!("ERROR: cert-bridge configuration invalid: {e:#}");
        e
    })?;
    telemetry::init(&cfg.log_level)?;

    let cipher = cfg.build_cipher()?;
    let output = cli.command.run(&cipher)?;
    print!("{output}");
    Ok(())
}
