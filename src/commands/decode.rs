//! Decode command - reveal a message hidden with `encode`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lsbhide::{StegoConfig, Steganographer};

use super::CommandExecutor;

/// Reveal the message hidden in a carrier file.
///
/// Fails if the file holds no message or the password is wrong.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Carrier file produced by `encode`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Password the message was encrypted with
    #[arg(short, long)]
    pub password: String,

    /// Write the message to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self, config: &StegoConfig) -> Result<()> {
        let stego = Steganographer::new(config.clone());
        let message = stego
            .decode_file(&self.input, &self.password)
            .with_context(|| format!("Failed to reveal message from {}", self.input.display()))?;

        match &self.output {
            Some(path) => {
                fs::write(path, &message)
                    .with_context(|| format!("Failed to write message to {}", path.display()))?;
                eprintln!("Message written to {}", path.display());
            }
            None => println!("{}", message),
        }
        Ok(())
    }
}
