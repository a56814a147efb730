#![allow(dead_code)]

use std::{
    num::{NonZeroU32, NonZeroU8},
    path::{Path, PathBuf},
};

use lewton::inside_ogg::OggStreamReader;
use oggpcm::tone::{sine_wave, DEFAULT_FREQUENCY};
use vorbis_rs::VorbisEncoderBuilder;

/// Encodes a sine tone to Ogg/Vorbis with libvorbis.
pub fn vorbis_bytes(sample_rate: u32, channels: u8, seconds: f64) -> Vec<u8> {
    let interleaved = sine_wave(sample_rate, channels, seconds, DEFAULT_FREQUENCY);
    let planar: Vec<Vec<f32>> = (0..channels as usize)
        .map(|ch| {
            interleaved
                .iter()
                .skip(ch)
                .step_by(channels as usize)
                .map(|&s| s as f32 / 32768.0)
                .collect()
        })
        .collect();

    let mut ogg = Vec::new();
    let mut encoder = VorbisEncoderBuilder::new(
        NonZeroU32::new(sample_rate).expect("non-zero sample rate"),
        NonZeroU8::new(channels).expect("non-zero channels"),
        &mut ogg,
    )
    .expect("encoder builder")
    .build()
    .expect("vorbis encoder");

    for start in (0..planar[0].len()).step_by(1024) {
        let block: Vec<&[f32]> = planar
            .iter()
            .map(|ch| &ch[start..(start + 1024).min(ch.len())])
            .collect();
        encoder.encode_audio_block(block).expect("encode block");
    }
    encoder.finish().expect("finish vorbis stream");
    ogg
}

/// Writes a sine tone as an `.ogg` file inside `dir`.
pub fn write_vorbis_fixture(
    dir: &Path,
    name: &str,
    sample_rate: u32,
    channels: u8,
    seconds: f64,
) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vorbis_bytes(sample_rate, channels, seconds)).expect("write fixture");
    path
}

/// Decodes `path` straight through lewton, as little-endian bytes.
pub fn reference_pcm(path: &Path) -> Vec<u8> {
    let file = std::fs::File::open(path).expect("open fixture");
    let mut reader = OggStreamReader::new(file).expect("lewton reader");
    let mut pcm = Vec::new();
    while let Some(samples) = reader.read_dec_packet_itl().expect("lewton packet") {
        for sample in samples {
            pcm.extend_from_slice(&sample.to_le_bytes());
        }
    }
    pcm
}

/// Byte offsets of every `OggS` page header in `bytes`.
pub fn page_starts(bytes: &[u8]) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut pos = 0;
    while pos + 27 <= bytes.len() && &bytes[pos..pos + 4] == b"OggS" {
        starts.push(pos);
        let segments = bytes[pos + 26] as usize;
        let table = &bytes[pos + 27..pos + 27 + segments];
        pos += 27 + segments + table.iter().map(|&len| len as usize).sum::<usize>();
    }
    starts
}
