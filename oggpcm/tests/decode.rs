mod common;

use oggpcm::{
    decode_to_pcm, decode_to_pcm_async, decode_to_pcm_with, DecodeOptions, OggPcmError,
    VorbisSource,
};

#[test]
fn decode_writes_all_decoded_samples() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = common::write_vorbis_fixture(dir.path(), "stereo.ogg", 44_100, 2, 1.0);
    let output = dir.path().join("stereo.pcm");

    let summary = decode_to_pcm(&input, &output)?;
    let pcm = std::fs::read(&output)?;
    let reference = common::reference_pcm(&input);

    assert!(!pcm.is_empty());
    assert_eq!(pcm, reference);
    assert_eq!(summary.bytes_written, pcm.len() as u64);
    assert_eq!(pcm.len() as u64, summary.frames * 2 * 2);
    assert_eq!(summary.info.channels, 2);
    Ok(())
}

#[test]
fn decode_mono_length_matches_frames() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = common::write_vorbis_fixture(dir.path(), "mono.ogg", 22_050, 1, 2.0);
    let output = dir.path().join("mono.pcm");

    let summary = decode_to_pcm(&input, &output)?;
    let len = std::fs::metadata(&output)?.len();
    assert_eq!(len, summary.frames * 2);
    // libvorbis pads the final block, so allow a little slack around 2 s.
    assert!(summary.frames >= 40_000 && summary.frames <= 48_000, "frames = {}", summary.frames);
    Ok(())
}

#[test]
fn decode_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = common::write_vorbis_fixture(dir.path(), "tone.ogg", 32_000, 2, 1.0);
    let first = dir.path().join("first.pcm");
    let second = dir.path().join("second.pcm");

    decode_to_pcm(&input, &first)?;
    decode_to_pcm(&input, &second)?;
    assert_eq!(std::fs::read(first)?, std::fs::read(second)?);
    Ok(())
}

#[test]
fn decode_truncates_existing_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = common::write_vorbis_fixture(dir.path(), "tone.ogg", 22_050, 1, 0.5);
    let output = dir.path().join("out.pcm");
    std::fs::write(&output, vec![0x55u8; 4 * 1024 * 1024])?;

    let summary = decode_to_pcm(&input, &output)?;
    assert_eq!(std::fs::metadata(&output)?.len(), summary.bytes_written);
    Ok(())
}

#[test]
fn tiny_buffer_produces_identical_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = common::write_vorbis_fixture(dir.path(), "tone.ogg", 44_100, 2, 0.5);
    let default_out = dir.path().join("default.pcm");
    let tiny_out = dir.path().join("tiny.pcm");

    decode_to_pcm(&input, &default_out)?;
    let options = DecodeOptions {
        buffer_size: 3,
        output_buffer_size: 5,
    };
    decode_to_pcm_with(&input, &tiny_out, &options)?;
    assert_eq!(std::fs::read(default_out)?, std::fs::read(tiny_out)?);
    Ok(())
}

#[test]
fn zero_buffer_is_rejected_before_touching_files() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.pcm");
    let options = DecodeOptions {
        buffer_size: 0,
        ..DecodeOptions::default()
    };

    let err = decode_to_pcm_with(dir.path().join("missing.ogg"), &output, &options).unwrap_err();
    assert!(matches!(err, OggPcmError::Unsupported(_)), "got {err:?}");
    assert!(!output.exists());
}

#[test]
fn missing_input_fails_to_open_without_creating_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.pcm");

    let err = decode_to_pcm(dir.path().join("missing.ogg"), &output).unwrap_err();
    assert!(matches!(err, OggPcmError::Open { .. }), "got {err:?}");
    assert!(!output.exists());
}

#[test]
fn open_error_takes_precedence_over_create_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("no_such_dir").join("out.pcm");

    let err = decode_to_pcm(dir.path().join("missing.ogg"), &output).unwrap_err();
    assert!(matches!(err, OggPcmError::Open { .. }), "got {err:?}");
}

#[test]
fn unwritable_output_is_create_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = common::write_vorbis_fixture(dir.path(), "tone.ogg", 22_050, 1, 0.5);
    let output = dir.path().join("no_such_dir").join("out.pcm");

    let err = decode_to_pcm(&input, &output).unwrap_err();
    assert!(matches!(err, OggPcmError::Create { .. }), "got {err:?}");
    assert!(!output.exists());
    Ok(())
}

#[test]
fn truncated_input_fails_and_keeps_partial_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bytes = common::vorbis_bytes(44_100, 2, 3.0);
    let pages = common::page_starts(&bytes);
    // Identification, comment/setup and at least two audio pages.
    assert!(pages.len() >= 4, "pages = {pages:?}");
    let last_page = pages[pages.len() - 1];
    let input = dir.path().join("truncated.ogg");
    std::fs::write(&input, &bytes[..last_page + 16])?;
    let output = dir.path().join("truncated.pcm");

    let err = decode_to_pcm(&input, &output).unwrap_err();
    assert!(matches!(err, OggPcmError::StreamRead(_)), "got {err:?}");
    let written = std::fs::metadata(&output)?.len();
    assert!(written > 0);
    assert_eq!(written % 4, 0);
    Ok(())
}

#[test]
fn cut_on_page_boundary_decodes_complete_pages() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bytes = common::vorbis_bytes(44_100, 2, 3.0);
    let pages = common::page_starts(&bytes);
    let full = dir.path().join("full.ogg");
    std::fs::write(&full, &bytes)?;
    let cut = dir.path().join("cut.ogg");
    std::fs::write(&cut, &bytes[..pages[pages.len() - 1]])?;

    let whole = decode_to_pcm(&full, dir.path().join("full.pcm"))?;
    let partial = decode_to_pcm(&cut, dir.path().join("cut.pcm"))?;
    assert!(partial.frames < whole.frames);
    assert_eq!(partial.bytes_written, partial.frames * 4);
    Ok(())
}

#[test]
fn source_serves_pcm_in_caller_sized_chunks() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = common::write_vorbis_fixture(dir.path(), "tone.ogg", 16_000, 2, 0.5);

    let mut source = VorbisSource::open(&input)?;
    assert_eq!(source.path(), input.as_path());
    assert_eq!(source.info().channels, 2);

    let mut pcm = Vec::new();
    let mut chunk = [0u8; 7];
    loop {
        let n = source.read_pcm(&mut chunk)?;
        if n == 0 {
            break;
        }
        pcm.extend_from_slice(&chunk[..n]);
    }
    assert_eq!(source.read_pcm(&mut chunk)?, 0);
    assert_eq!(source.read_pcm(&mut [])?, 0);
    assert_eq!(pcm, common::reference_pcm(&input));
    Ok(())
}

#[test]
fn corrupted_page_fails_mid_stream() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut bytes = common::vorbis_bytes(44_100, 2, 3.0);
    let pos = bytes.len() * 3 / 4;
    bytes[pos] ^= 0xFF;
    let input = dir.path().join("corrupted.ogg");
    std::fs::write(&input, &bytes)?;

    let err = decode_to_pcm(&input, dir.path().join("corrupted.pcm")).unwrap_err();
    assert!(matches!(err, OggPcmError::StreamRead(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn decode_async_matches_blocking_decode() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = common::write_vorbis_fixture(dir.path(), "tone.ogg", 24_000, 1, 0.5);
    let blocking_out = dir.path().join("blocking.pcm");
    let async_out = dir.path().join("async.pcm");

    let blocking = decode_to_pcm(&input, &blocking_out)?;
    let summary = decode_to_pcm_async(input, async_out.clone(), DecodeOptions::default()).await?;
    assert_eq!(summary, blocking);
    assert_eq!(std::fs::read(blocking_out)?, std::fs::read(async_out)?);
    Ok(())
}
