//! # Raw PCM to AAC/ADTS
//!
//! Encodes the headerless PCM written by [`crate::decode_to_pcm`] into an
//! AAC-LC elementary stream. The encoder runs in raw transport mode and every
//! frame is written behind an ADTS header built by [`crate::adts`].

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use fdk_aac::enc::{AudioObjectType, BitRate, ChannelMode, Encoder, EncoderParams, Transport};
use tracing::{debug, info};

use crate::{adts::adts_header, decode::DEFAULT_BUFFER_SIZE, error::OggPcmError, pcm::StreamInfo};

/// Default AAC bitrate (192 kbps).
pub const DEFAULT_BITRATE: u32 = 192_000;

/// Samples per channel in one AAC-LC frame.
const AAC_FRAME_SAMPLES: usize = 1024;

/// Upper bound of one encoded frame for up to two channels.
const MAX_OUTPUT_FRAME: usize = 8192;

/// Silent frames pushed at end of input to drain the encoder delay.
const FLUSH_FRAMES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AacOptions {
    /// Constant bitrate in bits per second.
    pub bitrate: u32,
}

impl Default for AacOptions {
    fn default() -> Self {
        Self {
            bitrate: DEFAULT_BITRATE,
        }
    }
}

/// Encodes the PCM file at `pcm_path` into an ADTS file at `aac_path`.
///
/// Returns the number of AAC frames written.
pub fn encode_pcm_to_aac(
    pcm_path: impl AsRef<Path>,
    aac_path: impl AsRef<Path>,
    info: StreamInfo,
    options: &AacOptions,
) -> Result<u64, OggPcmError> {
    let pcm_path = pcm_path.as_ref();
    let aac_path = aac_path.as_ref();

    let channels = match info.channels {
        1 => ChannelMode::Mono,
        2 => ChannelMode::Stereo,
        n => {
            return Err(OggPcmError::Unsupported(format!(
                "AAC encoding supports mono or stereo, got {n} channels"
            )));
        }
    };
    // Validates the sample rate before any output is produced.
    adts_header(0, info.sample_rate, info.channels)?;

    let encoder = Encoder::new(EncoderParams {
        bit_rate: BitRate::Cbr(options.bitrate),
        sample_rate: info.sample_rate,
        transport: Transport::Raw,
        channels,
        audio_object_type: AudioObjectType::Mpeg4LowComplexity,
    })
    .map_err(|err| OggPcmError::Encode(format!("{err:?}")))?;

    let input = File::open(pcm_path).map_err(|err| OggPcmError::open(pcm_path, err))?;
    let mut input = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, input);
    let output = File::create(aac_path).map_err(|source| OggPcmError::Create {
        path: aac_path.to_path_buf(),
        source,
    })?;
    let mut writer = FrameWriter {
        encoder,
        info,
        sink: BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, output),
        out: vec![0u8; MAX_OUTPUT_FRAME],
        frames: 0,
    };

    info!(
        input = %pcm_path.display(),
        output = %aac_path.display(),
        bitrate = options.bitrate,
        "Encoding PCM to AAC"
    );

    let frame_bytes = AAC_FRAME_SAMPLES * info.bytes_per_frame();
    let mut bytes = Vec::with_capacity(frame_bytes);
    let mut samples = Vec::with_capacity(frame_bytes / 2);
    loop {
        bytes.clear();
        let n = (&mut input)
            .take(frame_bytes as u64)
            .read_to_end(&mut bytes)
            .map_err(|err| OggPcmError::StreamRead(err.to_string()))?;
        // Only whole frames are handed to the encoder.
        let usable = n - n % info.bytes_per_frame();
        if usable == 0 {
            break;
        }
        samples.clear();
        samples.extend(
            bytes[..usable]
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
        );
        writer.encode(&samples)?;
        if n < frame_bytes {
            break;
        }
    }

    let silence = vec![0i16; AAC_FRAME_SAMPLES * info.channels as usize];
    for _ in 0..FLUSH_FRAMES {
        writer.encode(&silence)?;
    }
    writer.sink.flush().map_err(OggPcmError::Write)?;

    debug!(frames = writer.frames, "AAC encoding completed");
    Ok(writer.frames)
}

struct FrameWriter<W: Write> {
    encoder: Encoder,
    info: StreamInfo,
    sink: W,
    out: Vec<u8>,
    frames: u64,
}

impl<W: Write> FrameWriter<W> {
    fn encode(&mut self, samples: &[i16]) -> Result<(), OggPcmError> {
        let mut offset = 0;
        while offset < samples.len() {
            let step = self
                .encoder
                .encode(&samples[offset..], &mut self.out)
                .map_err(|err| OggPcmError::Encode(format!("{err:?}")))?;
            if step.output_size > 0 {
                let header = adts_header(step.output_size, self.info.sample_rate, self.info.channels)?;
                self.sink.write_all(&header).map_err(OggPcmError::Write)?;
                self.sink
                    .write_all(&self.out[..step.output_size])
                    .map_err(OggPcmError::Write)?;
                self.frames += 1;
            }
            if step.input_consumed == 0 && step.output_size == 0 {
                return Err(OggPcmError::Encode("encoder made no progress".into()));
            }
            offset += step.input_consumed;
        }
        Ok(())
    }
}
