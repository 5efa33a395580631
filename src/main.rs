//! lsbhide - hide encrypted text in images, video and audio
//!
//! A CLI tool for password-protected LSB steganography.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use commands::{CapacityCommand, CommandExecutor, DecodeCommand, EncodeCommand};
use lsbhide::{ErrorKind, StegoConfig, StegoError};

/// lsbhide - hide encrypted text in images, video and audio
///
/// Messages are encrypted with ChaCha20-Poly1305 under a PBKDF2-stretched
/// password and written into the least significant bits of the carrier.
#[derive(Parser)]
#[command(name = "lsbhide")]
#[command(version)]
#[command(about = "Password-protected LSB steganography for images, video and audio")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.lsbhide/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a message in a carrier file
    Encode(EncodeCommand),

    /// Reveal a hidden message
    Decode(DecodeCommand),

    /// Show how much a carrier can hold
    Capacity(CapacityCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;

    match &cli.command {
        Commands::Encode(cmd) => cmd.execute(&config),
        Commands::Decode(cmd) => cmd.execute(&config),
        Commands::Capacity(cmd) => cmd.execute(&config),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<StegoConfig> {
    match path {
        Some(path) => StegoConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => StegoConfig::load().context("Failed to load config"),
    }
}

/// Maps the error category to a process exit code. Clap uses 2 for usage
/// errors.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<StegoError>().map(StegoError::kind) {
        Some(ErrorKind::CapacityExceeded) => 3,
        Some(ErrorKind::DelimiterNotFound) => 4,
        Some(ErrorKind::Authentication) => 5,
        Some(ErrorKind::InsufficientData) => 6,
        Some(ErrorKind::UnsupportedFormat) => 7,
        Some(ErrorKind::Other) | None => 1,
    }
}
