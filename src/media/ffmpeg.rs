//! Bridge to the `ffmpeg` and `ffprobe` executables.
//!
//! Video frames travel as raw `rgb24` over pipes: the reader decodes any
//! container ffmpeg understands, the writer encodes with a lossless codec
//! (FFV1 in Matroska by default). Audio is transcoded to 16-bit PCM WAV
//! through a temporary file.

use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::carrier::{Transcoder, VideoInfo, VideoSink, VideoSource};
use crate::error::StegoError;

/// Where to find ffmpeg and how to encode video output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// Path or name of the `ffmpeg` executable.
    pub ffmpeg: PathBuf,
    /// Path or name of the `ffprobe` executable.
    pub ffprobe: PathBuf,
    /// Lossless video codec for encoded output.
    pub video_codec: String,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            video_codec: "ffv1".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: u32,
    height: u32,
    r_frame_rate: String,
    nb_read_frames: Option<String>,
    nb_frames: Option<String>,
}

/// Reads width, height, frame rate and frame count of the first video stream.
pub fn probe(config: &FfmpegConfig, path: &Path) -> Result<VideoInfo, StegoError> {
    let output = Command::new(&config.ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-count_frames",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_read_frames,nb_frames",
            "-of",
            "json",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(&config.ffprobe, e))?;

    if !output.status.success() {
        return Err(StegoError::UnsupportedFormat(format!(
            "cannot open video {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_probe(&output.stdout)
}

fn parse_probe(json: &[u8]) -> Result<VideoInfo, StegoError> {
    let probe: ProbeOutput = serde_json::from_slice(json)
        .map_err(|e| StegoError::Media(format!("unreadable ffprobe output: {}", e)))?;

    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| StegoError::UnsupportedFormat("no video stream".into()))?;

    let frame_count = stream
        .nb_read_frames
        .as_deref()
        .or(stream.nb_frames.as_deref())
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or_else(|| StegoError::Media("frame count unavailable".into()))?;

    Ok(VideoInfo {
        width: stream.width,
        height: stream.height,
        fps: parse_rate(&stream.r_frame_rate)?,
        frame_count,
    })
}

/// Parses an ffprobe rational such as `30000/1001`.
fn parse_rate(rate: &str) -> Result<f64, StegoError> {
    let invalid = || StegoError::Media(format!("invalid frame rate '{}'", rate));
    let (num, den) = match rate.split_once('/') {
        Some((num, den)) => (num, den),
        None => (rate, "1"),
    };
    let num: f64 = num.trim().parse().map_err(|_| invalid())?;
    let den: f64 = den.trim().parse().map_err(|_| invalid())?;
    if den == 0.0 || num <= 0.0 {
        return Err(invalid());
    }
    Ok(num / den)
}

fn spawn_error(program: &Path, err: std::io::Error) -> StegoError {
    StegoError::Media(format!("failed to run {}: {}", program.display(), err))
}

fn stop(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Decodes a video file into RGB24 frames.
pub struct FfmpegVideoReader {
    child: Child,
    stdout: ChildStdout,
    info: VideoInfo,
}

impl FfmpegVideoReader {
    pub fn open(config: &FfmpegConfig, path: &Path) -> Result<Self, StegoError> {
        let info = probe(config, path)?;
        debug!("probed {}: {:?}", path.display(), info);

        let mut child = Command::new(&config.ffmpeg)
            .args(["-v", "error", "-i"])
            .arg(path)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(&config.ffmpeg, e))?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                stop(&mut child);
                return Err(StegoError::Media("ffmpeg stdout unavailable".into()));
            }
        };

        Ok(Self { child, stdout, info })
    }
}

impl VideoSource for FfmpegVideoReader {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, StegoError> {
        let mut frame = vec![0u8; self.info.frame_len()];
        let mut filled = 0;
        while filled < frame.len() {
            match self.stdout.read(&mut frame[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        match filled {
            0 => {
                // End of stream: only a clean decoder exit means every frame
                // was delivered.
                let status = self.child.wait()?;
                if !status.success() {
                    return Err(StegoError::Media(format!(
                        "ffmpeg decoder exited with {}",
                        status
                    )));
                }
                Ok(None)
            }
            n if n == frame.len() => Ok(Some(frame)),
            n => Err(StegoError::Media(format!(
                "truncated frame: {} of {} bytes",
                n,
                frame.len()
            ))),
        }
    }
}

impl Drop for FfmpegVideoReader {
    fn drop(&mut self) {
        stop(&mut self.child);
    }
}

/// Encodes RGB24 frames into a lossless Matroska file.
pub struct FfmpegVideoWriter {
    child: Child,
    stdin: Option<ChildStdin>,
    finished: bool,
}

impl FfmpegVideoWriter {
    pub fn create(config: &FfmpegConfig, path: &Path, info: &VideoInfo) -> Result<Self, StegoError> {
        let size = format!("{}x{}", info.width, info.height);
        let rate = format!("{}", info.fps);

        let mut child = Command::new(&config.ffmpeg)
            .args(["-v", "error", "-y", "-f", "rawvideo", "-pix_fmt", "rgb24", "-s"])
            .arg(&size)
            .arg("-r")
            .arg(&rate)
            .args(["-i", "-", "-c:v"])
            .arg(&config.video_codec)
            .args(["-f", "matroska"])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(&config.ffmpeg, e))?;

        let stdin = child.stdin.take();
        if stdin.is_none() {
            stop(&mut child);
            return Err(StegoError::Media("ffmpeg stdin unavailable".into()));
        }

        Ok(Self {
            child,
            stdin,
            finished: false,
        })
    }
}

impl VideoSink for FfmpegVideoWriter {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), StegoError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| StegoError::Media("video writer already finished".into()))?;
        stdin.write_all(frame)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StegoError> {
        // Closing stdin tells ffmpeg the stream is over.
        drop(self.stdin.take());
        let status = self.child.wait()?;
        self.finished = true;
        if !status.success() {
            return Err(StegoError::Media(format!("ffmpeg encoder exited with {}", status)));
        }
        Ok(())
    }
}

impl Drop for FfmpegVideoWriter {
    fn drop(&mut self) {
        if !self.finished {
            drop(self.stdin.take());
            stop(&mut self.child);
        }
    }
}

/// Transcodes any audio file to canonical 16-bit PCM WAV with ffmpeg.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder {
    config: FfmpegConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }
}

impl Transcoder for FfmpegTranscoder {
    fn to_canonical_wav(&self, input: &Path) -> Result<Vec<u8>, StegoError> {
        let output = tempfile::Builder::new().suffix(".wav").tempfile()?;

        let result = Command::new(&self.config.ffmpeg)
            .args(["-v", "error", "-y", "-i"])
            .arg(input)
            .args(["-vn", "-acodec", "pcm_s16le", "-f", "wav"])
            .arg(output.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(&self.config.ffmpeg, e))?;

        if !result.status.success() {
            return Err(StegoError::UnsupportedFormat(format!(
                "cannot transcode {}: {}",
                input.display(),
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        debug!("transcoded {} to canonical WAV", input.display());
        Ok(std::fs::read(output.path())?)
    }
}
