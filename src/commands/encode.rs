//! Encode command - hide an encrypted message in a carrier file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use lsbhide::{MediaKind, StegoConfig, Steganographer};

use super::{arg_or_stdin, CommandExecutor};

/// Hide a message in an image, video or audio file.
///
/// The carrier type is taken from the input extension. The result is
/// written losslessly: PNG for images, FFV1 Matroska for video and 16-bit
/// PCM WAV for audio.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Carrier file to hide the message in
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (default: <input>_stego.<png|mkv|wav> next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Message to hide (read from stdin if omitted)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Password the message is encrypted with
    #[arg(short, long)]
    pub password: String,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self, config: &StegoConfig) -> Result<()> {
        let kind = MediaKind::from_path(&self.input)
            .with_context(|| format!("Cannot use {} as a carrier", self.input.display()))?;
        let output = match &self.output {
            Some(output) => output.clone(),
            None => default_output(&self.input, kind),
        };
        let message = arg_or_stdin(self.message.as_deref(), "message")?;

        let stego = Steganographer::new(config.clone());
        stego
            .encode_file(&self.input, &output, &message, &self.password)
            .with_context(|| format!("Failed to hide message in {}", self.input.display()))?;

        eprintln!("Message hidden in {} carrier", kind);
        println!("{}", output.display());
        Ok(())
    }
}

/// `dir/name.ext` becomes `dir/name_stego.<lossless ext>`.
fn default_output(input: &Path, kind: MediaKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "carrier".to_string());
    input.with_file_name(format!("{}_stego.{}", stem, kind.output_extension()))
}
