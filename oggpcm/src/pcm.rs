/// Sample width of every PCM stream produced by this crate.
pub const BITS_PER_SAMPLE: u8 = 16;

/// Sample rate and channel count of the first logical bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u8,
}

impl StreamInfo {
    pub fn bytes_per_sample(&self) -> usize {
        BITS_PER_SAMPLE as usize / 8
    }

    /// Size in bytes of one interleaved frame (one sample per channel).
    pub fn bytes_per_frame(&self) -> usize {
        self.bytes_per_sample() * self.channels as usize
    }
}

/// Outcome of a successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    pub info: StreamInfo,
    pub bytes_written: u64,
    pub frames: u64,
}

/// Appends interleaved samples to `out` as little-endian bytes.
pub(crate) fn extend_le_bytes(samples: &[i16], out: &mut Vec<u8>) {
    out.reserve(samples.len() * 2);
    for &sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
}
