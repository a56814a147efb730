//! ADTS framing for raw AAC-LC frames.
//!
//! Each raw frame coming out of the encoder is prefixed with a 7-byte ADTS
//! header (no CRC) so the resulting `.aac` file is self-describing.

use crate::error::OggPcmError;

/// Length of an ADTS header without CRC.
pub const ADTS_HEADER_LEN: usize = 7;

/// Largest value of the 13-bit `aac_frame_length` field.
const MAX_ADTS_FRAME_LEN: usize = 0x1FFF;

/// MPEG-4 audio object type for AAC Low Complexity.
const AOT_AAC_LC: u8 = 2;

/// Buffer fullness value signalling a variable bitrate stream.
const BUFFER_FULLNESS_VBR: u16 = 0x7FF;

const SAMPLE_RATES: [u32; 13] = [
    96_000, 88_200, 64_000, 48_000, 44_100, 32_000, 24_000, 22_050, 16_000, 12_000, 11_025, 8_000,
    7_350,
];

/// Returns the ADTS sampling frequency index of `sample_rate`.
pub fn sampling_frequency_index(sample_rate: u32) -> Option<u8> {
    SAMPLE_RATES
        .iter()
        .position(|&rate| rate == sample_rate)
        .map(|idx| idx as u8)
}

/// Builds the ADTS header for a raw AAC-LC frame of `frame_len` bytes.
pub fn adts_header(
    frame_len: usize,
    sample_rate: u32,
    channels: u8,
) -> Result<[u8; ADTS_HEADER_LEN], OggPcmError> {
    let freq_idx = sampling_frequency_index(sample_rate).ok_or_else(|| {
        OggPcmError::Unsupported(format!("sample rate {sample_rate} Hz has no ADTS index"))
    })?;
    if !(1..=7).contains(&channels) {
        return Err(OggPcmError::Unsupported(format!(
            "ADTS cannot describe {channels} channels"
        )));
    }
    let full_len = frame_len + ADTS_HEADER_LEN;
    if full_len > MAX_ADTS_FRAME_LEN {
        return Err(OggPcmError::Unsupported(format!(
            "AAC frame of {frame_len} bytes exceeds the ADTS length field"
        )));
    }

    let profile = AOT_AAC_LC - 1;
    let len = full_len as u16;
    Ok([
        0xFF,
        0xF1,
        (profile << 6) | (freq_idx << 2) | ((channels >> 2) & 0x01),
        ((channels & 0x03) << 6) | ((len >> 11) & 0x03) as u8,
        ((len >> 3) & 0xFF) as u8,
        (((len & 0x07) << 5) as u8) | ((BUFFER_FULLNESS_VBR >> 6) & 0x1F) as u8,
        (((BUFFER_FULLNESS_VBR & 0x3F) << 2) as u8),
    ])
}
