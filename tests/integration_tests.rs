//! Integration tests for lsbhide
//!
//! These go through the public API only: file helpers for images and WAV
//! audio, and in-memory frames for video (no ffmpeg needed).

use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::path::Path;
use tempfile::tempdir;

use lsbhide::bits::{from_bits, to_bits};
use lsbhide::carrier::{AudioCarrier, ImageCarrier, MemoryVideo, VideoCarrier};
use lsbhide::report::Silent;
use lsbhide::{Carrier, ErrorKind, StegoConfig, StegoError, Steganographer};

fn stego() -> Steganographer<Silent> {
    Steganographer::with_reporter(StegoConfig::default(), Silent)
}

fn gradient(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 3) as u8])
    })
}

fn write_wav(path: &Path, channels: u16, samples: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..samples {
        writer.write_sample(((i * 97) % 4000) as i16 - 2000).unwrap();
    }
    writer.finalize().unwrap();
}

/// The 64x64 "hello" scenario through real files.
#[test]
fn test_png_file_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cover.png");
    let output = dir.path().join("stego.png");
    gradient(64, 64).save(&input).unwrap();

    let stego = stego();
    stego.encode_file(&input, &output, "hello", "pw123").unwrap();

    assert_eq!(stego.decode_file(&output, "pw123").unwrap(), "hello");

    // Only the first 512 units may differ, and only in their LSB.
    let before = image::open(&input).unwrap().into_rgb8().into_raw();
    let after = image::open(&output).unwrap().into_rgb8().into_raw();
    assert_eq!(before.len(), after.len());
    for (i, (a, b)) in before.iter().zip(&after).enumerate() {
        assert_eq!(a & !1, b & !1, "unit {}", i);
        if i >= 512 {
            assert_eq!(a, b, "unit {}", i);
        }
    }
}

/// Any decodable image works as input; the output is always PNG.
#[test]
fn test_bmp_input_png_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cover.bmp");
    let output = dir.path().join("cover_stego.png");
    DynamicImage::ImageRgb8(gradient(40, 30)).save(&input).unwrap();

    let stego = stego();
    stego.encode_file(&input, &output, "bitmap", "secret").unwrap();
    assert_eq!(stego.decode_file(&output, "secret").unwrap(), "bitmap");
}

#[test]
fn test_wrong_password_is_authentication_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cover.png");
    let output = dir.path().join("stego.png");
    gradient(32, 32).save(&input).unwrap();

    let stego = stego();
    stego.encode_file(&input, &output, "hello", "pw123").unwrap();

    let err = stego.decode_file(&output, "PW123").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_clean_image_has_no_message() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("plain.png");
    RgbImage::new(20, 20).save(&input).unwrap();

    let err = stego().decode_file(&input, "pw").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DelimiterNotFound);
}

#[test]
fn test_too_large_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tiny.png");
    let output = dir.path().join("tiny_stego.png");
    gradient(8, 8).save(&input).unwrap();

    let err = stego()
        .encode_file(&input, &output, "far too long for 192 bits", "pw")
        .unwrap_err();

    assert!(matches!(err, StegoError::CapacityExceeded { capacity: 192, .. }));
    assert!(!output.exists());
}

#[test]
fn test_wav_file_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("voice.wav");
    let output = dir.path().join("voice_stego.wav");
    write_wav(&input, 2, 8000);

    let stego = stego();
    stego
        .encode_file(&input, &output, "meet at the usual place", "hunter2")
        .unwrap();

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 16_000);
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.len(), 8000);

    assert_eq!(
        stego.decode_file(&output, "hunter2").unwrap(),
        "meet at the usual place"
    );
}

#[test]
fn test_probe_file() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("cover.png");
    let audio = dir.path().join("voice.wav");
    gradient(64, 64).save(&image).unwrap();
    write_wav(&audio, 1, 1000);

    let stego = stego();
    let (kind, capacity) = stego.probe_file(&image).unwrap();
    assert_eq!(kind, lsbhide::MediaKind::Image);
    assert_eq!(capacity.total_bits, 12_288);
    assert_eq!(capacity.max_plaintext_bytes, Some(1109));

    let (kind, capacity) = stego.probe_file(&audio).unwrap();
    assert_eq!(kind, lsbhide::MediaKind::Audio);
    assert_eq!(capacity.total_bits, 2000);
}

#[test]
fn test_unsupported_extensions() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "not media").unwrap();

    let stego = stego();
    let err = stego.decode_file(&input, "pw").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);

    let err = stego
        .decode_file(&dir.path().join("clip.webm"), "pw")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
}

#[test]
fn test_lossy_output_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cover.png");
    let output = dir.path().join("cover.jpg");
    gradient(32, 32).save(&input).unwrap();

    let err = stego().encode_file(&input, &output, "hi", "pw").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    assert!(!output.exists());
}

/// Every carrier reads LSBs of its byte units in order.
#[test]
fn test_unit_order_shared_across_carriers() {
    let stego = stego();
    let mut image = ImageCarrier::from_image(DynamicImage::ImageRgb8(gradient(32, 32)));
    stego.hide(&mut image, "image only", "pw").unwrap();

    // Same LSBs, read as 16-bit PCM, still decode: the unit order is shared.
    let raw = image.pixels().as_raw().clone();
    let samples: Vec<i16> = raw
        .chunks_exact(2)
        .map(|p| i16::from_le_bytes([p[0], p[1]]))
        .collect();
    let mut audio = AudioCarrier::from_samples(1, 8000, &samples);
    assert_eq!(stego.reveal(&mut audio, "pw").unwrap(), "image only");

    // An untouched audio carrier does not.
    let mut clean = AudioCarrier::from_samples(1, 8000, &[0i16; 1536]);
    assert_eq!(
        stego.reveal(&mut clean, "pw").unwrap_err().kind(),
        ErrorKind::DelimiterNotFound
    );
}

#[test]
fn test_video_roundtrip_with_seeded_rng() {
    let frames: Vec<Vec<u8>> = (0..6)
        .map(|f| (0..20 * 10 * 3).map(|i| ((i + f * 11) % 251) as u8).collect())
        .collect();
    let source = MemoryVideo::from_frames(20, 10, 24.0, frames.clone()).unwrap();

    let stego = stego();
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let mut carrier = VideoCarrier::new(source, MemoryVideo::new(20, 10, 24.0));
    assert_eq!(carrier.capacity_bits(), 3600);

    stego
        .hide_with_rng(&mut carrier, "video payload", "pw", &mut rng)
        .unwrap();
    let encoded = carrier.into_sink();

    assert_eq!(encoded.frames().len(), 6);
    assert_eq!(&encoded.frames()[2..], &frames[2..]);

    let mut reader = VideoCarrier::reader(encoded);
    assert_eq!(stego.reveal(&mut reader, "pw").unwrap(), "video payload");
}

/// The embedded bits are exactly the sealed stream, and the salt prefix is
/// recoverable from the carrier.
#[test]
fn test_embedded_stream_layout() {
    let stego = stego();
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let stream = stego.seal_with_rng("layout", "pw", &mut rng).unwrap();

    let mut carrier = ImageCarrier::from_image(DynamicImage::ImageRgb8(gradient(32, 32)));
    stego.embed_stream(&mut carrier, &stream).unwrap();

    let extracted = carrier.extract_bits(stego.delimiter(), None).unwrap();
    assert_eq!(extracted.len() + stego.delimiter().len(), stream.len());

    let payload = from_bits(&extracted);
    assert_eq!(payload.len(), lsbhide::crypto::payload_len(6));
    assert_eq!(to_bits(&payload), extracted);
    assert_eq!(lsbhide::crypto::open(&payload, "pw").unwrap(), b"layout");
}
