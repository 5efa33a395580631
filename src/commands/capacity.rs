//! Capacity command - report how much a carrier can hold.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lsbhide::{StegoConfig, Steganographer};

use super::CommandExecutor;

/// Show how many message bytes fit into a carrier file.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Carrier file to inspect
    pub input: PathBuf,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self, config: &StegoConfig) -> Result<()> {
        let stego = Steganographer::new(config.clone());
        let (kind, capacity) = stego
            .probe_file(&self.input)
            .with_context(|| format!("Failed to inspect {}", self.input.display()))?;

        println!("Carrier:        {} ({})", self.input.display(), kind);
        println!("Capacity:       {} bits", capacity.total_bits);
        println!("Overhead:       {} bits", capacity.overhead_bits);
        match capacity.max_plaintext_bytes {
            Some(max) => println!("Max message:    {} bytes", max),
            None => println!("Max message:    carrier too small for any message"),
        }
        Ok(())
    }
}
