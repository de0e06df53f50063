//! Skirmish CLI - Command-line interface for running and checking games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Skirmish - A deterministic turn-based grid combat engine
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log order resolution to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single game
    Run {
        /// Game configuration file (TOML, default: standard game)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Map or saved state file
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Round limit, overriding config and map
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Player kinds, comma separated: idle or random (default: all random)
        #[arg(short, long, value_delimiter = ',')]
        players: Option<Vec<String>>,

        /// Output format: text, json, or snapshot
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Check a configuration and map without playing
    Validate {
        /// Game configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Map or saved state file
        #[arg(short, long)]
        map: Option<PathBuf>,
    },
}

/// Log filter: `RUST_LOG` when set, `warn` otherwise; `-v` overrides both.
fn log_filter(verbose: u8, env: Option<&str>) -> EnvFilter {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let builder = EnvFilter::builder().with_default_directive(level.into());
    match env {
        Some(directives) if verbose == 0 => builder.parse_lossy(directives),
        _ => builder.parse_lossy(""),
    }
}

fn init_tracing(verbose: u8) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, env.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Commands::Run {
            config,
            map,
            seed,
            rounds,
            players,
            format,
        } => cli::run::execute(cli::run::RunOptions {
            config,
            map,
            seed,
            rounds,
            players,
            format,
        }),

        Commands::Validate { config, map } => cli::validate::execute(config, map),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
