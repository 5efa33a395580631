//! Tests for the ffmpeg-backed file paths
//!
//! Most tests run against stand-in `ffmpeg`/`ffprobe` shell scripts that
//! treat a "video" as raw 16x16 rgb24 frames and a transcode as a copy,
//! so the process plumbing is exercised without ffmpeg installed. The
//! last test needs the real tools and is ignored by default.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tempfile::tempdir;

use lsbhide::carrier::VideoSource;
use lsbhide::media::{FfmpegConfig, FfmpegVideoReader};
use lsbhide::report::Silent;
use lsbhide::{ErrorKind, MediaKind, StegoConfig, StegoError, Steganographer};

const FRAME_LEN: usize = 16 * 16 * 3;

const FAKE_FFPROBE: &str = r#"#!/bin/sh
for a; do last=$a; done
[ -f "$last" ] || { echo "no such file: $last" >&2; exit 1; }
n=$(( $(wc -c < "$last") / 768 ))
printf '{"streams":[{"width":16,"height":16,"r_frame_rate":"25/1","nb_read_frames":"%s"}]}' "$n"
"#;

const FAKE_FFMPEG: &str = r#"#!/bin/sh
prev=
pcm=
for a; do
  [ "$prev" = "-i" ] && input=$a
  [ "$a" = "pcm_s16le" ] && pcm=1
  prev=$a
  last=$a
done
if [ "$input" = "-" ]; then
  cat > "$last"
elif [ -n "$pcm" ]; then
  cp "$input" "$last"
else
  cat "$input"
fi
"#;

/// Decodes one frame, then dies.
const FAILING_FFMPEG: &str = r#"#!/bin/sh
prev=
for a; do
  [ "$prev" = "-i" ] && input=$a
  prev=$a
  last=$a
done
if [ "$input" = "-" ]; then
  cat > "$last"
  exit 0
fi
head -c 768 "$input"
exit 1
"#;

struct FakeTools {
    ffmpeg: PathBuf,
    failing_ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

/// Writes the scripts once per test run. Every test spawns them only after
/// this returns, so no script is executed while it is still open for writing.
fn fake_tools() -> &'static FakeTools {
    static TOOLS: OnceLock<FakeTools> = OnceLock::new();
    TOOLS.get_or_init(|| {
        let dir = Path::new(env!("CARGO_TARGET_TMPDIR"))
            .join(format!("lsbhide-fake-ffmpeg-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let write_script = |name: &str, body: &str| {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        };

        FakeTools {
            ffmpeg: write_script("ffmpeg", FAKE_FFMPEG),
            failing_ffmpeg: write_script("ffmpeg-failing", FAILING_FFMPEG),
            ffprobe: write_script("ffprobe", FAKE_FFPROBE),
        }
    })
}

fn stego_with(ffmpeg: &Path) -> Steganographer<Silent> {
    let config = StegoConfig {
        ffmpeg: FfmpegConfig {
            ffmpeg: ffmpeg.to_path_buf(),
            ffprobe: fake_tools().ffprobe.clone(),
            ..Default::default()
        },
        ..Default::default()
    };
    Steganographer::with_reporter(config, Silent)
}

fn stego() -> Steganographer<Silent> {
    stego_with(&fake_tools().ffmpeg)
}

fn raw_frames(count: usize) -> Vec<u8> {
    (0..count * FRAME_LEN).map(|i| ((i * 7 + i / FRAME_LEN * 31) % 256) as u8).collect()
}

fn staging_leftovers(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".lsbhide-"))
        .collect()
}

#[test]
fn test_video_file_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("clip.avi");
    let output = dir.path().join("clip_stego.mkv");
    let original = raw_frames(4);
    fs::write(&input, &original).unwrap();

    let message = "a message long enough to span two frames";
    let stego = stego();
    stego.encode_file(&input, &output, message, "pw").unwrap();

    let encoded = fs::read(&output).unwrap();
    assert_eq!(encoded.len(), original.len());
    assert_eq!(&encoded[2 * FRAME_LEN..], &original[2 * FRAME_LEN..]);
    assert_ne!(&encoded[..FRAME_LEN], &original[..FRAME_LEN]);
    assert!(staging_leftovers(dir.path()).is_empty());

    assert_eq!(stego.decode_file(&output, "pw").unwrap(), message);
}

#[test]
fn test_video_capacity_from_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("clip.mp4");
    fs::write(&input, raw_frames(3)).unwrap();

    let (kind, capacity) = stego().probe_file(&input).unwrap();
    assert_eq!(kind, MediaKind::Video);
    assert_eq!(capacity.total_bits, 3 * FRAME_LEN);
}

#[test]
fn test_video_too_large_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("short.mov");
    let output = dir.path().join("short_stego.mkv");
    fs::write(&input, raw_frames(1)).unwrap();

    let message = "x".repeat(100);
    let err = stego().encode_file(&input, &output, &message, "pw").unwrap_err();

    assert!(matches!(err, StegoError::CapacityExceeded { capacity: 768, .. }));
    assert!(!output.exists());
    assert!(staging_leftovers(dir.path()).is_empty());
}

#[test]
fn test_failed_decoder_fails_encode() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.avi");
    let output = dir.path().join("broken_stego.mkv");
    fs::write(&input, raw_frames(3)).unwrap();

    let stego = stego_with(&fake_tools().failing_ffmpeg);
    let err = stego.encode_file(&input, &output, "hi", "pw").unwrap_err();

    assert!(matches!(err, StegoError::Media(_)));
    assert_eq!(err.kind(), ErrorKind::Other);
    assert!(!output.exists());
    assert!(staging_leftovers(dir.path()).is_empty());
}

#[test]
fn test_reader_reports_decoder_exit_status() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.avi");
    fs::write(&input, raw_frames(3)).unwrap();

    let config = FfmpegConfig {
        ffmpeg: fake_tools().failing_ffmpeg.clone(),
        ffprobe: fake_tools().ffprobe.clone(),
        ..Default::default()
    };
    let mut reader = FfmpegVideoReader::open(&config, &input).unwrap();
    assert_eq!(reader.info().frame_count, 3);

    let first = reader.next_frame().unwrap().unwrap();
    assert_eq!(first.len(), FRAME_LEN);
    assert!(matches!(reader.next_frame(), Err(StegoError::Media(_))));
}

#[test]
fn test_reader_clean_exit_ends_stream() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("clip.avi");
    fs::write(&input, raw_frames(2)).unwrap();

    let config = FfmpegConfig {
        ffmpeg: fake_tools().ffmpeg.clone(),
        ffprobe: fake_tools().ffprobe.clone(),
        ..Default::default()
    };
    let mut reader = FfmpegVideoReader::open(&config, &input).unwrap();
    assert!(reader.next_frame().unwrap().is_some());
    assert!(reader.next_frame().unwrap().is_some());
    assert!(reader.next_frame().unwrap().is_none());
}

/// Non-WAV audio goes through the transcoder on both encode and decode.
#[test]
fn test_transcoded_audio_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("voice.mp3");
    let output = dir.path().join("voice_stego.wav");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22_050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&input, spec).unwrap();
    for i in 0..4000i32 {
        writer.write_sample((i % 300 - 150) as i16).unwrap();
    }
    writer.finalize().unwrap();

    let stego = stego();
    stego.encode_file(&input, &output, "through ffmpeg", "pw").unwrap();
    assert_eq!(stego.decode_file(&output, "pw").unwrap(), "through ffmpeg");

    let disguised = dir.path().join("again.flac");
    fs::copy(&output, &disguised).unwrap();
    assert_eq!(stego.decode_file(&disguised, "pw").unwrap(), "through ffmpeg");
}

#[test]
#[ignore = "needs ffmpeg and ffprobe on PATH"]
fn test_real_ffmpeg_video_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("testsrc.mkv");
    let output = dir.path().join("testsrc_stego.mkv");

    let status = Command::new("ffmpeg")
        .args(["-v", "error", "-y", "-f", "lavfi", "-i", "testsrc=size=32x32:rate=5"])
        .args(["-frames:v", "4", "-c:v", "ffv1"])
        .arg(&input)
        .status()
        .unwrap();
    assert!(status.success());

    let stego = Steganographer::with_reporter(StegoConfig::default(), Silent);
    let (_, capacity) = stego.probe_file(&input).unwrap();
    assert_eq!(capacity.total_bits, 32 * 32 * 3 * 4);

    stego.encode_file(&input, &output, "lossless frames", "pw").unwrap();
    assert_eq!(stego.decode_file(&output, "pw").unwrap(), "lossless frames");
}
