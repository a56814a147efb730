//! # Ogg/Vorbis to raw PCM
//!
//! Decodes the first logical bitstream of an Ogg/Vorbis file into a headerless
//! PCM file: 16-bit signed little-endian samples, interleaved by channel.
//!
//! The decoder acquires the input handle, then the output file, and runs a
//! fixed-buffer read/write loop until the stream ends or an error occurs.
//! Both handles are released on every exit path, output first. A failed decode
//! leaves whatever was already written on disk; the output is not removed.
//!
//! ```no_run
//! use oggpcm::decode_to_pcm;
//!
//! fn main() -> Result<(), oggpcm::OggPcmError> {
//!     let summary = decode_to_pcm("voice.ogg", "voice.pcm")?;
//!     println!(
//!         "{} frames at {} Hz, {} channel(s)",
//!         summary.frames, summary.info.sample_rate, summary.info.channels
//!     );
//!     Ok(())
//! }
//! ```

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::{error, info};

use crate::{
    error::OggPcmError,
    pcm::DecodeSummary,
    source::VorbisSource,
};

/// Default size of the decode buffer and of the output write buffer (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Tuning knobs for [`decode_to_pcm_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Number of bytes requested from the decoder per iteration.
    pub buffer_size: usize,
    /// Capacity of the buffered writer wrapped around the output file.
    pub output_buffer_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            output_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl DecodeOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.buffer_size == 0 {
            return Err("decode buffer size must be greater than 0".into());
        }
        if self.output_buffer_size == 0 {
            return Err("output buffer size must be greater than 0".into());
        }
        Ok(())
    }
}

/// Decodes `input` into a raw PCM file at `output` with default options.
pub fn decode_to_pcm(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<DecodeSummary, OggPcmError> {
    decode_to_pcm_with(input, output, &DecodeOptions::default())
}

/// Decodes `input` into a raw PCM file at `output`.
///
/// `output` is created or truncated. The error variant tells which phase
/// failed: [`OggPcmError::Open`] for the input, [`OggPcmError::Create`] for the
/// output, [`OggPcmError::StreamRead`] and [`OggPcmError::Write`] for the loop.
pub fn decode_to_pcm_with(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &DecodeOptions,
) -> Result<DecodeSummary, OggPcmError> {
    let input = input.as_ref();
    let output = output.as_ref();
    options.validate().map_err(OggPcmError::Unsupported)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        "Starting OGG decoding"
    );

    let result = run(input, output, options);
    match &result {
        Ok(summary) => info!(
            input = %input.display(),
            bytes = summary.bytes_written,
            frames = summary.frames,
            "OGG to PCM decoding successful"
        ),
        Err(err) => error!(input = %input.display(), error = %err, "OGG to PCM decoding failed"),
    }
    result
}

fn run(input: &Path, output: &Path, options: &DecodeOptions) -> Result<DecodeSummary, OggPcmError> {
    // Declaration order matters: `sink` is dropped before `source`.
    let mut source = VorbisSource::open(input)?;
    let file = File::create(output).map_err(|source| OggPcmError::Create {
        path: output.to_path_buf(),
        source,
    })?;
    let mut sink = BufWriter::with_capacity(options.output_buffer_size, file);

    let info = source.info();
    info!(
        channels = info.channels,
        rate = info.sample_rate,
        "Vorbis info"
    );

    let mut buffer = vec![0u8; options.buffer_size];
    let mut bytes_written: u64 = 0;
    loop {
        let n = source.read_pcm(&mut buffer)?;
        if n == 0 {
            break;
        }
        sink.write_all(&buffer[..n]).map_err(OggPcmError::Write)?;
        bytes_written += n as u64;
    }
    sink.flush().map_err(OggPcmError::Write)?;

    Ok(DecodeSummary {
        info,
        bytes_written,
        frames: bytes_written / info.bytes_per_frame() as u64,
    })
}
