//! Command module - one struct per subcommand.
//!
//! Each command holds its parsed arguments and implements
//! [`CommandExecutor`]. Shared settings arrive as a [`StegoConfig`].

mod capacity;
mod decode;
mod encode;

pub use capacity::CapacityCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;

use std::io::{self, Read};

use anyhow::{Context, Result};
use lsbhide::StegoConfig;

/// Trait for command execution.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self, config: &StegoConfig) -> Result<()>;
}

/// Returns `value`, or all of stdin with one trailing newline removed.
fn arg_or_stdin(value: Option<&str>, what: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value.to_string());
    }

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .with_context(|| format!("Failed to read {} from stdin", what))?;
    if input.ends_with('\n') {
        input.pop();
        if input.ends_with('\r') {
            input.pop();
        }
    }
    Ok(input)
}
